//! Object and ref writes that never touch the working tree or the index
//!
//! Used to maintain branches that are never checked out. Index operations
//! take the path of a private index file.

use anyhow::Result;
use std::path::Path;

use super::runner::tool_failed;
use super::Git;

impl Git {
    /// Store a file as a blob and return its id.
    pub fn hash_object(&self, file: &Path) -> Result<String> {
        let path = file.to_string_lossy();
        self.checked(&["hash-object", "-w", "--", &path])
    }

    /// Load a tree into a private index.
    pub fn read_tree(&self, index: &Path, tree: &str) -> Result<()> {
        let index = index.to_string_lossy();
        self.checked_env(&["read-tree", tree], &[("GIT_INDEX_FILE", &index)])?;
        Ok(())
    }

    pub fn index_add(&self, index: &Path, blob: &str, path: &str) -> Result<()> {
        let index = index.to_string_lossy();
        let cacheinfo = format!("100644,{blob},{path}");
        self.checked_env(
            &["update-index", "--add", "--cacheinfo", &cacheinfo],
            &[("GIT_INDEX_FILE", &index)],
        )?;
        Ok(())
    }

    pub fn index_remove(&self, index: &Path, path: &str) -> Result<()> {
        let index = index.to_string_lossy();
        self.checked_env(
            &["update-index", "--force-remove", "--", path],
            &[("GIT_INDEX_FILE", &index)],
        )?;
        Ok(())
    }

    pub fn write_tree(&self, index: &Path) -> Result<String> {
        let index = index.to_string_lossy();
        self.checked_env(&["write-tree"], &[("GIT_INDEX_FILE", &index)])
    }

    pub fn tree_of(&self, rev: &str) -> Result<String> {
        let spec = format!("{rev}^{{tree}}");
        self.checked(&["rev-parse", &spec])
    }

    /// Create a commit object; without a parent the commit is an orphan.
    pub fn commit_tree(&self, tree: &str, parent: Option<&str>, message: &str) -> Result<String> {
        let mut args = vec!["commit-tree", tree, "-m", message];
        if let Some(parent) = parent {
            args.push("-p");
            args.push(parent);
        }
        self.checked(&args)
    }

    /// Move `refname` to `new`, only if it still points at `old`
    /// (`None`: only if it does not exist yet).
    pub fn update_ref(&self, refname: &str, new: &str, old: Option<&str>) -> Result<()> {
        self.checked(&["update-ref", refname, new, old.unwrap_or("")])?;
        Ok(())
    }

    /// Content of `path` at revision `rev`, `None` if the path is absent.
    pub fn show_file(&self, rev: &str, path: &str) -> Result<Option<String>> {
        let object = format!("{rev}:{path}");
        if !self.succeeds(&["cat-file", "-e", &object]) {
            return Ok(None);
        }
        let args = ["cat-file", "blob", &object];
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(tool_failed(&args, &output).into());
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
    }

    /// File names at the top level of the tree of `rev`.
    pub fn list_files(&self, rev: &str) -> Result<Vec<String>> {
        let stdout = self.checked(&["ls-tree", "--name-only", rev])?;
        Ok(stdout.lines().map(String::from).collect())
    }
}
