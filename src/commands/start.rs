//! `*-start`: create a lifecycle branch with its version and central entry

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::common::{done, note, FlowContext, VersionVariables};
use crate::central::entry::{
    BASE_BRANCH, BASE_VERSION, BRANCH_TYPE, ISSUE_NUMBER, START_COMMIT_MESSAGE,
    VERSION_CHANGE_COMMIT,
};
use crate::central::BranchCentralConfig;
use crate::config::CommitMessages;
use crate::error::{fail, FailureMessage};
use crate::git::PushMode;
use crate::models::{BranchType, Goal};

/// Where the new branch comes from.
struct Origin {
    base: String,
    start_point: String,
}

pub fn start(ctx: &mut FlowContext, branch_type: BranchType) -> Result<()> {
    if let Some(goal) = Goal::start_for(branch_type) {
        ctx.check_breakpoint(goal)?;
    }
    ctx.require_no_operation()?;
    ctx.require_clean_tree()?;
    ctx.fetch()?;

    let previous = ctx.git.current_branch()?;
    let base = select_base(ctx, branch_type, previous.as_deref());
    ctx.ensure_synced(&base)?;
    let origin = Origin {
        start_point: start_point(ctx, branch_type, &base)?,
        base,
    };

    let identifier = ask_identifier(ctx, branch_type, &origin)?;
    let branch = ctx.config.branches.branch_name(branch_type, &identifier);
    if ctx.git.branch_exists(&branch) || ctx.git.remote_branch_exists(&branch) {
        return fail(
            FailureMessage::new(format!("Branch '{branch}' already exists."))
                .solution("Choose another name or finish the existing branch."),
        );
    }

    ctx.git.create_branch(&branch, &origin.start_point)?;
    ctx.git.checkout(&branch)?;
    info!(%branch, start_point = %origin.start_point, "branch created");

    if let Err(err) = prepare(ctx, branch_type, &branch, &identifier, &origin) {
        let back = previous.as_deref().unwrap_or(&origin.base);
        warn!(%branch, "start failed, removing branch");
        ctx.git.reset_hard("HEAD")?;
        ctx.git.checkout(back)?;
        ctx.git.delete_branch(&branch)?;
        return Err(err);
    }

    ctx.push(&branch, PushMode::Normal)?;
    done(&format!("Started {branch_type} branch '{branch}' from '{}'", origin.base));
    Ok(())
}

/// Current branch when it is a valid base for `branch_type`, otherwise the
/// production branch.
fn select_base(ctx: &FlowContext, branch_type: BranchType, current: Option<&str>) -> String {
    let production = ctx.production().to_string();
    let Some(current) = current else {
        return production;
    };
    if current == production || branch_type == BranchType::Maintenance {
        return production;
    }
    let valid = match ctx.describe(current).map(|d| d.branch_type) {
        Some(BranchType::Maintenance) => true,
        Some(BranchType::Epic) => branch_type == BranchType::Feature,
        _ => false,
    };
    if valid {
        current.to_string()
    } else {
        production
    }
}

/// Start point on `base`: its tip, the integrated state of it when the user
/// accepts, or for maintenance branches any revision.
fn start_point(ctx: &mut FlowContext, branch_type: BranchType, base: &str) -> Result<String> {
    let integration = ctx.config.branches.integration_branch(base);
    let integration_ref = if ctx.git.branch_exists(&integration) {
        Some(integration.clone())
    } else if ctx.git.remote_branch_exists(&integration) {
        Some(ctx.git.remote_ref(&integration))
    } else {
        None
    };

    let mut start_point = base.to_string();
    if let Some(integration_ref) = integration_ref {
        let base_tip = ctx.git.rev_parse(base)?;
        let integrated_tip = ctx.git.rev_parse(&integration_ref)?;
        if base_tip != integrated_tip {
            let question = format!(
                "'{base}' has commits that are not integrated yet. Start from '{integration}'?"
            );
            if ctx.confirm("startFromIntegration", &question, true)? {
                start_point = integration_ref;
            }
        }
    }

    if branch_type == BranchType::Maintenance {
        start_point = ctx.param_default(
            "startPoint",
            "Commit or tag to start the maintenance branch from",
            &start_point,
        )?;
        if ctx.git.rev_parse_opt(&start_point).is_none() {
            return fail(FailureMessage::new(format!(
                "Start point '{start_point}' does not exist."
            )));
        }
    }
    Ok(start_point)
}

fn ask_identifier(ctx: &mut FlowContext, branch_type: BranchType, origin: &Origin) -> Result<String> {
    let versions = ctx.versions();
    let answer = match branch_type {
        BranchType::Feature => ctx.param("featureName", "What is the name of the feature branch?")?,
        BranchType::Epic => ctx.param("epicName", "What is the name of the epic branch?")?,
        BranchType::Release => {
            let current = ctx.project_version()?;
            ctx.param_default(
                "releaseVersion",
                "What is the release version?",
                &versions.release_version(&current),
            )?
        }
        BranchType::Hotfix => {
            let current = ctx.project_version()?;
            let next = versions.next_development_version(&versions.release_version(&current))?;
            ctx.param_default(
                "hotfixVersion",
                "What is the hotfix version?",
                &versions.release_version(&next),
            )?
        }
        BranchType::Maintenance => {
            let current = ctx.project_version()?;
            ctx.param_default(
                "maintenanceVersion",
                &format!("What is the maintenance version (starting at {})?", origin.start_point),
                &versions.release_version(&current),
            )?
        }
        BranchType::Support | BranchType::Integration => {
            return fail(FailureMessage::new(format!(
                "Branches of type '{branch_type}' are not started by gitflow."
            )));
        }
    };

    let identifier = answer.trim().to_string();
    if identifier.is_empty() || identifier.contains(char::is_whitespace) {
        return fail(FailureMessage::new(format!(
            "'{answer}' is not a valid {branch_type} name."
        )));
    }
    Ok(identifier)
}

/// Version change and central entry. Nothing here is pushed.
fn prepare(
    ctx: &mut FlowContext,
    branch_type: BranchType,
    branch: &str,
    identifier: &str,
    origin: &Origin,
) -> Result<()> {
    let base_version = ctx.project_version()?;
    let issue = ctx.describe(branch).and_then(|d| d.issue_key);
    let key = issue.clone().unwrap_or_else(|| "NO-ISSUE".to_string());

    let mut vars = BTreeMap::new();
    vars.insert("key", key);
    vars.insert("branch", branch.to_string());
    let message = CommitMessages::render(ctx.config.messages.start(branch_type), &vars);

    let mut entry = BranchCentralConfig::new();
    entry.set(BRANCH_TYPE, branch_type.as_str());
    entry.set(BASE_BRANCH, origin.base.as_str());
    entry.set(BASE_VERSION, base_version.as_str());
    entry.set_opt(ISSUE_NUMBER, issue.as_deref());
    entry.set(START_COMMIT_MESSAGE, message.as_str());

    if ctx.config.version.skip_version(branch_type) {
        note("Version change skipped");
    } else {
        let version = match &issue {
            Some(issue) => ctx.versions().start_version(branch_type, &base_version, issue),
            None => identifier.to_string(),
        };
        let variables = VersionVariables::new(&version, &base_version)
            .with("baseVersion", Some(base_version.as_str()))
            .with("issueNumber", issue.as_deref())
            .with("branchName", Some(branch));
        ctx.apply_version(&version, &variables)?;
        if let Some(commit) = ctx.git.commit_tracked(&message)? {
            entry.set(VERSION_CHANGE_COMMIT, commit);
        }
        note(&format!("Project version set to {version}"));
    }

    ctx.central().set(branch, &entry)
}
