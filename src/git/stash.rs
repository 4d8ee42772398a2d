//! Stashing local changes

use anyhow::Result;

use super::Git;

impl Git {
    /// Stash tracked changes. Returns false when there was nothing to stash.
    pub fn stash(&self, message: &str) -> Result<bool> {
        let before = self.rev_parse_opt("refs/stash");
        self.checked(&["stash", "push", "-q", "-m", message])?;
        Ok(self.rev_parse_opt("refs/stash") != before)
    }
}
