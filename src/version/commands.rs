//! Additional version commands
//!
//! Extra project properties that follow the project version (for example
//! the version of an upstream project). Each value comes from, in order of
//! precedence: an explicit `-D<property>=value`, the answer to its prompt,
//! or its default expression.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use super::interpolate::{Expression, RefKind};
use crate::config::{AdditionalVersionCommand, UserProperties};
use crate::error::FlowError;
use crate::project::ProjectBuild;
use crate::prompt::Prompter;

/// Reject default expressions that refer back to themselves, directly or
/// through other commands, before anything is resolved.
pub fn check_cycles(commands: &[AdditionalVersionCommand]) -> Result<()> {
    let enabled: Vec<&AdditionalVersionCommand> = commands.iter().filter(|c| c.enabled).collect();
    let names: BTreeSet<&str> = enabled.iter().map(|c| c.property.as_str()).collect();

    let mut edges: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for command in &enabled {
        let references = match &command.default_value {
            Some(default) => parse(&command.property, default)?
                .static_references()
                .into_iter()
                .filter(|name| names.contains(name.as_str()))
                .collect(),
            None => Vec::new(),
        };
        edges.insert(command.property.as_str(), references);
    }

    let mut finished = BTreeSet::new();
    for command in &enabled {
        let mut path = Vec::new();
        visit(&command.property, &edges, &mut path, &mut finished)?;
    }
    Ok(())
}

fn visit(
    node: &str,
    edges: &BTreeMap<&str, Vec<String>>,
    path: &mut Vec<String>,
    finished: &mut BTreeSet<String>,
) -> Result<()> {
    if finished.contains(node) {
        return Ok(());
    }
    if let Some(start) = path.iter().position(|p| p == node) {
        return Err(cycle(node, &path[start..]).into());
    }

    path.push(node.to_string());
    for next in edges.get(node).into_iter().flatten() {
        visit(next, edges, path, finished)?;
    }
    path.pop();
    finished.insert(node.to_string());
    Ok(())
}

fn cycle(parameter: &str, path: &[String]) -> FlowError {
    let mut chain: Vec<&str> = path.iter().map(String::as_str).collect();
    chain.push(parameter);
    FlowError::InterpolationCycle {
        parameter: parameter.to_string(),
        chain: chain.join(" -> "),
    }
}

fn parse(parameter: &str, expression: &str) -> Result<Expression> {
    Expression::parse(expression).map_err(|reason| {
        FlowError::InvalidExpression {
            parameter: parameter.to_string(),
            reason,
        }
        .into()
    })
}

/// Resolves the values of all enabled version commands.
pub struct VersionCommandResolver<'a> {
    commands: Vec<&'a AdditionalVersionCommand>,
    variables: &'a BTreeMap<String, String>,
    properties: &'a UserProperties,
    project: &'a dyn ProjectBuild,
    resolved: BTreeMap<String, String>,
    stack: Vec<String>,
}

impl<'a> VersionCommandResolver<'a> {
    /// `variables` are the `@{...}` context variables of the transition.
    pub fn new(
        commands: &'a [AdditionalVersionCommand],
        variables: &'a BTreeMap<String, String>,
        properties: &'a UserProperties,
        project: &'a dyn ProjectBuild,
    ) -> Self {
        Self {
            commands: commands.iter().filter(|c| c.enabled).collect(),
            variables,
            properties,
            project,
            resolved: BTreeMap::new(),
            stack: Vec::new(),
        }
    }

    /// `(property, value)` for every enabled command, in configuration order.
    pub fn resolve_all(mut self, prompter: &mut dyn Prompter) -> Result<Vec<(String, String)>> {
        let owned: Vec<AdditionalVersionCommand> =
            self.commands.iter().map(|c| (*c).clone()).collect();
        check_cycles(&owned)?;

        let mut values = Vec::with_capacity(self.commands.len());
        for command in self.commands.clone() {
            let value = self.value_of(&command.property, prompter)?;
            values.push((command.property.clone(), value));
        }
        Ok(values)
    }

    fn command(&self, property: &str) -> Option<&'a AdditionalVersionCommand> {
        self.commands.iter().copied().find(|c| c.property == property)
    }

    fn value_of(&mut self, property: &str, prompter: &mut dyn Prompter) -> Result<String> {
        if let Some(value) = self.resolved.get(property) {
            return Ok(value.clone());
        }
        if self.stack.iter().any(|p| p == property) {
            let start = self.stack.iter().position(|p| p == property).unwrap_or(0);
            return Err(cycle(property, &self.stack[start..]).into());
        }

        let value = match self.properties.get(property) {
            Some(explicit) => explicit.to_string(),
            None => {
                self.stack.push(property.to_string());
                let computed = self.compute(property, prompter);
                self.stack.pop();
                computed?
            }
        };
        self.resolved.insert(property.to_string(), value.clone());
        Ok(value)
    }

    fn compute(&mut self, property: &str, prompter: &mut dyn Prompter) -> Result<String> {
        let Some(command) = self.command(property) else {
            return Err(FlowError::UnknownVariable {
                parameter: property.to_string(),
                name: property.to_string(),
            }
            .into());
        };

        let default = match &command.default_value {
            Some(expression) => {
                let expression = parse(property, expression)?;
                Some(expression.evaluate(&mut |kind, name| {
                    self.lookup(property, kind, name, prompter)
                })?)
            }
            None => None,
        };

        match (&command.prompt, default) {
            (Some(question), Some(default)) => prompter.prompt_default(property, question, &default),
            (Some(question), None) => prompter.prompt(property, question),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(FlowError::MissingParameter {
                parameter: property.to_string(),
            }
            .into()),
        }
    }

    fn lookup(
        &mut self,
        parameter: &str,
        kind: RefKind,
        name: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<String> {
        match kind {
            RefKind::Context => {
                if let Some(value) = self.variables.get(name) {
                    return Ok(value.clone());
                }
                if self.command(name).is_some() {
                    return self.value_of(name, prompter);
                }
            }
            RefKind::Property => {
                if let Some(value) = self.properties.get(name) {
                    return Ok(value.to_string());
                }
                if self.command(name).is_some() {
                    return self.value_of(name, prompter);
                }
                if let Some(value) = self.project.property(name)? {
                    return Ok(value);
                }
            }
        }
        Err(FlowError::UnknownVariable {
            parameter: parameter.to_string(),
            name: name.to_string(),
        }
        .into())
    }
}
