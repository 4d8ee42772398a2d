//! Commits, tags and resets

use anyhow::Result;

use super::Git;

impl Git {
    /// Commit all changes to tracked files. Returns the new commit, or `None`
    /// when there was nothing to commit.
    pub fn commit_tracked(&self, message: &str) -> Result<Option<String>> {
        self.checked(&["add", "-u"])?;
        if !self.has_staged_changes()? {
            return Ok(None);
        }
        self.checked(&["commit", "-q", "-m", message])?;
        Ok(Some(self.head()?))
    }

    pub fn tag_exists(&self, tag: &str) -> bool {
        let ref_path = format!("refs/tags/{tag}");
        self.succeeds(&["rev-parse", "--verify", "-q", &ref_path])
    }

    /// Create an annotated tag on HEAD.
    pub fn tag(&self, tag: &str, message: &str) -> Result<()> {
        self.checked(&["tag", "-a", tag, "-m", message])?;
        Ok(())
    }

    pub fn reset_hard(&self, rev: &str) -> Result<()> {
        self.checked(&["reset", "-q", "--hard", rev])?;
        Ok(())
    }
}
