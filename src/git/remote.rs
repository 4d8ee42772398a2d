//! Remote synchronization: fetch, push and local/remote comparison

use anyhow::Result;
use tracing::debug;

use super::Git;

/// Relation of a local branch to its remote-tracking counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSync {
    InSync,
    LocalAhead(usize),
    RemoteAhead(usize),
    Diverged { local: usize, remote: usize },
    LocalOnly,
    RemoteOnly,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Normal,
    /// Rewritten history; refuse if the remote moved since the last fetch.
    ForceWithLease,
    /// Also push annotated tags on the pushed commits.
    FollowTags,
}

impl Git {
    pub fn has_remote(&self) -> bool {
        self.succeeds(&["remote", "get-url", self.remote()])
    }

    pub fn fetch(&self) -> Result<()> {
        debug!(remote = self.remote(), "fetching");
        self.checked(&["fetch", "--prune", "--quiet", self.remote()])?;
        Ok(())
    }

    /// Compare a local branch with its remote-tracking branch.
    pub fn compare(&self, branch: &str) -> Result<BranchSync> {
        let local = self.branch_exists(branch);
        let remote = self.remote_branch_exists(branch);

        match (local, remote) {
            (false, false) => Ok(BranchSync::Missing),
            (true, false) => Ok(BranchSync::LocalOnly),
            (false, true) => Ok(BranchSync::RemoteOnly),
            (true, true) => {
                let range = format!("refs/heads/{branch}...refs/remotes/{}/{branch}", self.remote());
                let counts = self.checked(&["rev-list", "--left-right", "--count", &range])?;
                let mut parts = counts.split_whitespace().map(|n| n.parse::<usize>().unwrap_or(0));
                let ahead = parts.next().unwrap_or(0);
                let behind = parts.next().unwrap_or(0);

                Ok(match (ahead, behind) {
                    (0, 0) => BranchSync::InSync,
                    (ahead, 0) => BranchSync::LocalAhead(ahead),
                    (0, behind) => BranchSync::RemoteAhead(behind),
                    (local, remote) => BranchSync::Diverged { local, remote },
                })
            }
        }
    }

    pub fn push(&self, branch: &str, mode: PushMode) -> Result<()> {
        debug!(branch, ?mode, "pushing");
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        match mode {
            PushMode::Normal => self.checked(&["push", "--quiet", self.remote(), &refspec])?,
            PushMode::ForceWithLease => {
                let lease = format!("--force-with-lease=refs/heads/{branch}");
                self.checked(&["push", "--quiet", &lease, self.remote(), &refspec])?
            }
            PushMode::FollowTags => {
                self.checked(&["push", "--quiet", "--follow-tags", self.remote(), &refspec])?
            }
        };
        Ok(())
    }
}
