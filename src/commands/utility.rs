//! Goals outside the branch lifecycle

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::common::{done, note, FlowContext, VersionVariables};
use crate::central::entry::WELL_KNOWN_KEYS;
use crate::central::BranchCentralConfig;
use crate::error::{fail, FailureMessage};
use crate::git::PushMode;
use crate::models::Goal;

fn branch_param(ctx: &mut FlowContext, question: &str) -> Result<String> {
    match ctx.git.current_branch()? {
        Some(current) => ctx.param_default("branchName", question, &current),
        None => ctx.param("branchName", question),
    }
}

/// `branch-config`: show, set or remove one property of a branch entry.
///
/// `-DpropertyValue=` (empty) removes the property; without a value the
/// current one is printed.
pub fn branch_config(ctx: &mut FlowContext) -> Result<()> {
    ctx.check_breakpoint(Goal::BranchConfig)?;
    ctx.fetch()?;
    let branch = branch_param(ctx, "Which branch?")?;
    let property = ctx.param("propertyName", "Which property?")?;
    let value = ctx.properties.get("propertyValue").map(String::from);

    let store = ctx.central();
    let mut entry = store.get(&branch)?;
    match value {
        None => match entry.get(&property) {
            Some(current) => println!("{}={current}", property.bold()),
            None => note(&format!("'{property}' is not set for '{branch}'")),
        },
        Some(value) if value.is_empty() => {
            if entry.remove(&property).is_some() {
                store.set(&branch, &entry)?;
                done(&format!("Removed '{property}' of '{branch}'"));
            } else {
                note(&format!("'{property}' is not set for '{branch}'"));
            }
        }
        Some(value) => {
            entry.set(property.as_str(), value.as_str());
            store.set(&branch, &entry)?;
            done(&format!("Set '{property}' of '{branch}' to '{value}'"));
        }
    }
    Ok(())
}

/// `set-version`: change the project version and commit it.
pub fn set_version(ctx: &mut FlowContext) -> Result<()> {
    ctx.check_breakpoint(Goal::SetVersion)?;
    ctx.require_no_operation()?;
    ctx.require_clean_tree()?;

    let current = ctx.project_version()?;
    let version = ctx.param_default("newVersion", "What is the new version?", &current)?;
    let branch = ctx.git.current_branch()?;
    let variables = VersionVariables::new(&version, &current).with("branchName", branch.as_deref());
    ctx.apply_version(&version, &variables)?;

    let message = ctx.config.messages.set_version.clone();
    if ctx.git.commit_tracked(&message)?.is_some() {
        done(&format!("Project version set to {version}"));
    } else {
        note(&format!("Project version already is {version}"));
    }
    Ok(())
}

/// `build-version`: stamp a build token into the version, uncommitted.
pub fn build_version(ctx: &mut FlowContext) -> Result<()> {
    ctx.check_breakpoint(Goal::BuildVersion)?;
    let current = ctx.project_version()?;
    let token = ctx.param("buildVersion", "What is the build version?")?;
    let version = ctx.versions().build_version(&current, &token)?;

    let branch = ctx.git.current_branch()?;
    let variables = VersionVariables::new(&version, &current)
        .with("buildVersion", Some(token.as_str()))
        .with("branchName", branch.as_deref());
    ctx.apply_version(&version, &variables)?;
    done(&format!("Project version set to {version}"));
    Ok(())
}

/// `integrated`: mark the tip of a branch as its last integrated state.
pub fn integrated(ctx: &mut FlowContext) -> Result<()> {
    ctx.check_breakpoint(Goal::Integrated)?;
    let branch = branch_param(ctx, "Which branch was integrated?")?;
    let Some(tip) = ctx.git.rev_parse_opt(&branch) else {
        return fail(FailureMessage::new(format!("Branch '{branch}' does not exist.")));
    };

    let integration = ctx.config.branches.integration_branch(&branch);
    if ctx.git.current_branch()?.as_deref() == Some(integration.as_str()) {
        return fail(
            FailureMessage::new(format!("'{integration}' is checked out."))
                .solution("Switch to another branch first.")
                .step(format!("git checkout {branch}")),
        );
    }
    ctx.git.force_branch(&integration, &tip)?;
    info!(%integration, %tip, "integration branch moved");
    ctx.push(&integration, PushMode::ForceWithLease)?;
    done(&format!("'{integration}' now points to {tip}"));
    Ok(())
}

/// `upgrade`: move legacy `branch.<name>.<key>` values from the local git
/// config into the central store.
pub fn upgrade(ctx: &mut FlowContext) -> Result<()> {
    ctx.check_breakpoint(Goal::Upgrade)?;
    let mut legacy: BTreeMap<String, Vec<(String, &'static str, String)>> = BTreeMap::new();
    for (key, value) in ctx.git.config_get_regexp(r"^branch\..*\.")? {
        let Some(rest) = key.strip_prefix("branch.") else {
            continue;
        };
        let Some((branch, name)) = rest.rsplit_once('.') else {
            continue;
        };
        // Git lower-cases variable names on write.
        let Some(known) = WELL_KNOWN_KEYS.iter().find(|k| k.eq_ignore_ascii_case(name)) else {
            continue;
        };
        legacy
            .entry(branch.to_string())
            .or_default()
            .push((key.clone(), *known, value));
    }

    if legacy.is_empty() {
        note("Nothing to upgrade");
        return Ok(());
    }

    for (branch, values) in &legacy {
        let store = ctx.central();
        let mut entry: BranchCentralConfig = store.get(branch)?;
        for (_, name, value) in values {
            if entry.get(name).is_none() {
                entry.set(*name, value.as_str());
            }
        }
        store.set(branch, &entry)?;
        for (key, _, _) in values {
            ctx.git.config_unset(key)?;
        }
        debug!(%branch, count = values.len(), "migrated branch config");
    }
    done(&format!("Moved the config of {} branch(es) to the central store", legacy.len()));
    Ok(())
}
