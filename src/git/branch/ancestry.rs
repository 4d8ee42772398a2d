//! Revision resolution, ancestry and commit range queries

use anyhow::Result;

use crate::git::runner::{stdout_lines, tool_failed};
use crate::git::Git;

impl Git {
    /// Resolve a revision to a full commit SHA.
    pub fn rev_parse(&self, rev: &str) -> Result<String> {
        let spec = format!("{rev}^{{commit}}");
        self.checked(&["rev-parse", "--verify", "-q", &spec])
    }

    /// Resolve a revision, `None` when it does not exist.
    pub fn rev_parse_opt(&self, rev: &str) -> Option<String> {
        let spec = format!("{rev}^{{commit}}");
        self.checked(&["rev-parse", "--verify", "-q", &spec]).ok()
    }

    pub fn head(&self) -> Result<String> {
        self.rev_parse("HEAD")
    }

    /// Whether `ancestor` is reachable from `descendant` (or equal to it).
    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let args = ["merge-base", "--is-ancestor", ancestor, descendant];
        let output = self.run(&args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(tool_failed(&args, &output).into()),
        }
    }

    pub fn merge_base(&self, a: &str, b: &str) -> Result<Option<String>> {
        let output = self.run(&["merge-base", a, b])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    /// Commits reachable from `to` but not from `from`, newest first.
    pub fn commits_between(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let range = format!("{from}..{to}");
        let stdout = self.checked(&["rev-list", &range])?;
        Ok(stdout_lines(&stdout))
    }

    /// Newest commit in `from..to` whose subject equals `subject`.
    pub fn find_commit_by_subject(&self, from: &str, to: &str, subject: &str) -> Result<Option<String>> {
        let range = format!("{from}..{to}");
        let stdout = self.checked(&["log", "--format=%H %s", &range])?;
        Ok(stdout.lines().find_map(|line| {
            let (sha, line_subject) = line.split_once(' ')?;
            (line_subject == subject).then(|| sha.to_string())
        }))
    }

    pub fn commit_subject(&self, rev: &str) -> Result<String> {
        self.checked(&["log", "-1", "--format=%s", rev])
    }
}
