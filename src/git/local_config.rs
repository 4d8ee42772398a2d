//! Repository-local git config access

use anyhow::Result;

use super::runner::tool_failed;
use super::Git;

impl Git {
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        let args = ["config", "--local", "--get", key];
        let output = self.run(&args)?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout)
                    .trim_end_matches('\n')
                    .to_string(),
            )),
            Some(1) => Ok(None),
            _ => Err(tool_failed(&args, &output).into()),
        }
    }

    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.checked(&["config", "--local", key, value])?;
        Ok(())
    }

    /// Remove a key; removing an absent key is not an error.
    pub fn config_unset(&self, key: &str) -> Result<()> {
        let args = ["config", "--local", "--unset-all", key];
        let output = self.run(&args)?;
        match output.status.code() {
            Some(0) | Some(5) => Ok(()),
            _ => Err(tool_failed(&args, &output).into()),
        }
    }

    /// All `(key, value)` pairs whose key matches `pattern`.
    pub fn config_get_regexp(&self, pattern: &str) -> Result<Vec<(String, String)>> {
        let args = ["config", "--local", "--get-regexp", pattern];
        let output = self.run(&args)?;
        match output.status.code() {
            Some(0) => {}
            Some(1) => return Ok(Vec::new()),
            _ => return Err(tool_failed(&args, &output).into()),
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(' ') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect())
    }
}
