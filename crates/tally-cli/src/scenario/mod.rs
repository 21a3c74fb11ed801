//! Scenario - what the runner should simulate.
//!
//! A scenario is a list of actions. An action with no `after` starts right
//! away, anything else starts from a job waiting on its `after` list. Each
//! start spawns `count` simulated calls that sleep and then finish one
//! member of the group.

mod graph;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::graph::DependencyGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub name: String,

    #[serde(default = "default_count")]
    pub count: u32,

    #[serde(default)]
    pub after: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("scenario has no actions")]
    Empty,

    #[error("action names must not be empty")]
    EmptyName,

    #[error("action '{0}' is declared more than once")]
    DuplicateAction(String),

    #[error("action '{0}' needs a count of at least 1")]
    ZeroCount(String),

    #[error("action '{action}' starts after undeclared action '{dependency}'")]
    UnknownDependency { action: String, dependency: String },

    #[error("actions depend on each other in a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("min_delay_ms ({min}) is greater than max_delay_ms ({max})")]
    InvalidDelay { min: u64, max: u64 },
}

fn default_min_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    1500
}

fn default_count() -> u32 {
    1
}

impl ActionSpec {
    pub fn new(name: &str, count: u32, after: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            count,
            after: after.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// The fruit-eating walkthrough: pear waits on three groups, apple waits
    /// on pear, oranges wait on strawberries.
    pub fn fruit(min_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_delay_ms,
            actions: vec![
                ActionSpec::new("apple", 1, &["pear"]),
                ActionSpec::new("banana", 1, &[]),
                ActionSpec::new("pear", 1, &["banana", "peaches", "strawberries"]),
                ActionSpec::new("peaches", 2, &[]),
                ActionSpec::new("oranges", 3, &["strawberries"]),
                ActionSpec::new("strawberries", 4, &[]),
            ],
        }
    }

    /// Fail fast on scenarios that could never finish.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.actions.is_empty() {
            return Err(ScenarioError::Empty);
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ScenarioError::InvalidDelay {
                min: self.min_delay_ms,
                max: self.max_delay_ms,
            });
        }

        let mut declared = HashSet::new();
        for action in &self.actions {
            if action.name.is_empty() {
                return Err(ScenarioError::EmptyName);
            }
            if !declared.insert(action.name.as_str()) {
                return Err(ScenarioError::DuplicateAction(action.name.clone()));
            }
            if action.count == 0 {
                return Err(ScenarioError::ZeroCount(action.name.clone()));
            }
        }

        let mut graph = DependencyGraph::new();
        for action in &self.actions {
            for dependency in &action.after {
                if !declared.contains(dependency.as_str()) {
                    return Err(ScenarioError::UnknownDependency {
                        action: action.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
                graph.add_dependency(&action.name, dependency);
            }
        }
        if let Some(cycle) = graph.detect_cycle() {
            return Err(ScenarioError::Cycle(
                cycle.into_iter().map(str::to_string).collect(),
            ));
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn fruit_scenario_is_valid() {
        let scenario = Scenario::fruit(1, 2);
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.names().count(), 6);
    }

    #[test]
    fn bundled_pipeline_scenario_is_valid() {
        let scenario = Scenario::from_json(include_str!("../../scenarios/pipeline.json")).unwrap();
        assert_eq!(scenario.actions.len(), 5);
        assert_eq!(scenario.actions[4].after, vec!["bundle"]);
    }

    #[test]
    fn json_defaults_are_applied() {
        let scenario =
            Scenario::from_json(r#"{ "actions": [ { "name": "fetch" } ] }"#).unwrap();

        assert_eq!(scenario.min_delay_ms, 500);
        assert_eq!(scenario.max_delay_ms, 1500);
        assert_eq!(scenario.actions[0], ActionSpec::new("fetch", 1, &[]));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Scenario::from_json(r#"{ "actions": [], "speed": 3 }"#).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[rstest]
    #[case::empty(r#"{ "actions": [] }"#, "no actions")]
    #[case::empty_name(r#"{ "actions": [ { "name": "" } ] }"#, "must not be empty")]
    #[case::duplicate(
        r#"{ "actions": [ { "name": "a" }, { "name": "a" } ] }"#,
        "more than once"
    )]
    #[case::zero_count(r#"{ "actions": [ { "name": "a", "count": 0 } ] }"#, "at least 1")]
    #[case::unknown_dependency(
        r#"{ "actions": [ { "name": "a", "after": ["b"] } ] }"#,
        "undeclared action 'b'"
    )]
    #[case::cycle(
        r#"{ "actions": [ { "name": "a", "after": ["b"] }, { "name": "b", "after": ["a"] } ] }"#,
        "cycle"
    )]
    #[case::delay(
        r#"{ "min_delay_ms": 10, "max_delay_ms": 1, "actions": [ { "name": "a" } ] }"#,
        "greater than"
    )]
    fn invalid_scenarios_are_rejected(#[case] raw: &str, #[case] message: &str) {
        let err = Scenario::from_json(raw).unwrap_err();
        assert!(
            err.to_string().contains(message),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn cycle_error_names_the_path() {
        let scenario = Scenario {
            min_delay_ms: 0,
            max_delay_ms: 0,
            actions: vec![ActionSpec::new("a", 1, &["a"])],
        };
        let err = scenario.validate().unwrap_err();
        assert_eq!(err.to_string(), "actions depend on each other in a cycle: a -> a");
    }
}
