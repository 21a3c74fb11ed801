//! ActionName - the key of the requirement registry.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use super::errors::CoordinatorError;

/// Name of an action or action group.
///
/// Names are non-empty and cheap to clone (they are copied into every
/// job record and event that mentions them).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionName(Arc<str>);

impl ActionName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, CoordinatorError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(CoordinatorError::InvalidName);
        }
        Ok(Self(Arc::from(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActionName {
    type Error = CoordinatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActionName> for String {
    fn from(name: ActionName) -> Self {
        name.0.to_string()
    }
}

impl Borrow<str> for ActionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ActionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(ActionName::new(""), Err(CoordinatorError::InvalidName));
    }

    #[test]
    fn names_compare_by_value() {
        let a = ActionName::new("fetch").unwrap();
        let b = ActionName::new(String::from("fetch")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "fetch");
    }

    #[test]
    fn deserializing_empty_name_fails() {
        let parsed: Result<ActionName, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());

        let parsed: ActionName = serde_json::from_str("\"pear\"").unwrap();
        assert_eq!(parsed.to_string(), "pear");
    }
}
