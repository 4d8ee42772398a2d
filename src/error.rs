//! Failure types shared by every goal
//!
//! Three families of failures exist:
//! - workflow failures: expected, user-actionable conditions rendered as a
//!   [`FailureMessage`] banner (diverged branches, conflicts, nothing to abort)
//! - tooling failures: git or the build tool failed unexpectedly
//! - expression errors: problems in configured version expressions
//!
//! Engines return `anyhow::Result` and attach a [`FlowError`] so callers and
//! tests can downcast to the concrete kind.

use std::fmt;
use thiserror::Error;

const BANNER_HEAD: &str =
    "############################ Gitflow problem ###########################";
const BANNER_TAIL: &str =
    "########################################################################";

/// Three-part, user-actionable failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMessage {
    problem: String,
    solution: Option<String>,
    steps: Vec<String>,
}

impl FailureMessage {
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            solution: None,
            steps: Vec::new(),
        }
    }

    pub fn solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }

    /// Append a concrete remediation command.
    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Append several remediation commands; `None` entries are skipped
    /// when passing an `Option`.
    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn solution_text(&self) -> Option<&str> {
        self.solution.as_deref()
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{BANNER_HEAD}")?;
        writeln!(f, "{}", self.problem)?;
        if let Some(solution) = &self.solution {
            writeln!(f)?;
            writeln!(f, "{solution}")?;
        }
        if !self.steps.is_empty() {
            writeln!(f)?;
            for step in &self.steps {
                writeln!(f, "- '{step}'")?;
            }
        }
        write!(f, "{BANNER_TAIL}")
    }
}

/// Typed failures raised by the engine.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Expected condition the user has to resolve before re-running.
    #[error("{0}")]
    Workflow(FailureMessage),

    /// Repository state the engine cannot reason about.
    #[error("{0}")]
    Corrupted(FailureMessage),

    /// A git or build command failed unexpectedly.
    #[error("{tool} command failed: {command}\n{stderr}")]
    ToolFailed {
        tool: String,
        command: String,
        stderr: String,
    },

    /// A value that would be prompted for is missing in batch mode.
    #[error("{}", missing_parameter_banner(.parameter))]
    MissingParameter { parameter: String },

    /// A version expression refers back to itself.
    #[error("Expression cycle detected while resolving '{parameter}': {chain}")]
    InterpolationCycle { parameter: String, chain: String },

    /// A version expression references a name nothing defines.
    #[error("Unknown variable '{name}' in expression of '{parameter}'")]
    UnknownVariable { parameter: String, name: String },

    /// A version expression cannot be parsed.
    #[error("Invalid expression for '{parameter}': {reason}")]
    InvalidExpression { parameter: String, reason: String },
}

impl FlowError {
    pub fn workflow(message: FailureMessage) -> Self {
        FlowError::Workflow(message)
    }

    /// Corrupted state; the message always ends by asking for an expert.
    pub fn corrupted(problem: impl Into<String>) -> Self {
        FlowError::Corrupted(
            FailureMessage::new(problem)
                .solution("This state should never occur. Please consult an expert."),
        )
    }

    /// The failure banner, if this error carries one.
    pub fn failure_message(&self) -> Option<&FailureMessage> {
        match self {
            FlowError::Workflow(message) | FlowError::Corrupted(message) => Some(message),
            _ => None,
        }
    }
}

fn missing_parameter_banner(parameter: &str) -> String {
    FailureMessage::new(format!(
        "Property '{parameter}' is required in non-interactive mode but was not set."
    ))
    .solution("Either run in interactive mode or specify the property on the command line.")
    .step(format!("gitflow <goal> -B -D {parameter}=<value>"))
    .to_string()
}

/// Shorthand for returning a workflow failure.
pub fn fail<T>(message: FailureMessage) -> anyhow::Result<T> {
    Err(FlowError::Workflow(message).into())
}

/// Find the [`FlowError`] attached anywhere in an error chain.
pub fn flow_error(err: &anyhow::Error) -> Option<&FlowError> {
    err.chain().find_map(|cause| cause.downcast_ref::<FlowError>())
}
