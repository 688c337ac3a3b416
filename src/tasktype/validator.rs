//! Task config validators.
//!
//! Each task type declares an ordered list of validators when it is built.
//! Validators run once per task at load time; a task with any problem is
//! disabled for the session.

use toml::Value;

use crate::error::ConfigProblem;
use crate::quest::definition::TaskConfig;

/// A single check over a task's raw config
pub trait ConfigValidator: Send + Sync {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem>;
}

/// Run every validator, collecting problems in validator order
pub fn run_validators(validators: &[Box<dyn ConfigValidator>], config: &TaskConfig) -> Vec<ConfigProblem> {
    validators
        .iter()
        .filter_map(|v| v.validate(config).err())
        .collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string \"{s}\""),
        other => format!("{} {}", other.type_str(), other),
    }
}

/// Key must be present
#[derive(Debug, Clone)]
pub struct RequiredKey {
    key: String,
}

impl RequiredKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ConfigValidator for RequiredKey {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem> {
        if config.contains(&self.key) {
            Ok(())
        } else {
            Err(ConfigProblem::MissingKey { key: self.key.clone() })
        }
    }
}

/// Key, if present, must hold an integer
#[derive(Debug, Clone)]
pub struct IntegerValue {
    key: String,
}

impl IntegerValue {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ConfigValidator for IntegerValue {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem> {
        match config.get(&self.key) {
            None | Some(Value::Integer(_)) => Ok(()),
            Some(other) => Err(ConfigProblem::NotInteger {
                key: self.key.clone(),
                found: describe(other),
            }),
        }
    }
}

/// Key, if present, must hold a boolean
#[derive(Debug, Clone)]
pub struct BooleanValue {
    key: String,
}

impl BooleanValue {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ConfigValidator for BooleanValue {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem> {
        match config.get(&self.key) {
            None | Some(Value::Boolean(_)) => Ok(()),
            Some(other) => Err(ConfigProblem::NotBoolean {
                key: self.key.clone(),
                found: describe(other),
            }),
        }
    }
}

/// Key, if present, must hold one of a fixed set of strings
#[derive(Debug, Clone)]
pub struct AcceptedValues {
    key: String,
    accepted: Vec<String>,
}

impl AcceptedValues {
    pub fn new<I, S>(key: impl Into<String>, accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            accepted: accepted.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigValidator for AcceptedValues {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem> {
        let Some(value) = config.get(&self.key) else {
            return Ok(());
        };

        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if self.accepted.contains(&text) {
            Ok(())
        } else {
            Err(ConfigProblem::NotAccepted {
                key: self.key.clone(),
                value: text,
                accepted: self.accepted.join(", "),
            })
        }
    }
}

/// Key, if present, must hold a list of strings
#[derive(Debug, Clone)]
pub struct StringListValue {
    key: String,
}

impl StringListValue {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ConfigValidator for StringListValue {
    fn validate(&self, config: &TaskConfig) -> Result<(), ConfigProblem> {
        match config.get(&self.key) {
            None => Ok(()),
            Some(Value::Array(items)) if items.iter().all(Value::is_str) => Ok(()),
            Some(other) => Err(ConfigProblem::NotStringList {
                key: self.key.clone(),
                found: describe(other),
            }),
        }
    }
}
