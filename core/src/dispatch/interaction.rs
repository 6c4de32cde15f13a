use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AppError;

pub const ACTION_ATTR: &str = "data-action";

/// An element on the propagation path of a user event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Shorthand for an element carrying `data-action`.
    pub fn action(tag: impl Into<String>, action: &str) -> Self {
        Self::new(tag).attr(ACTION_ATTR, action)
    }

    /// Shorthand for a `data-<name>` attribute.
    pub fn data(self, name: &str, value: impl Into<String>) -> Self {
        self.attr(format!("data-{name}"), value)
    }
}

/// A user event as seen by the delegated root listener: the path from the
/// event target (first) up to the listener's element (last).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    pub path: Vec<Element>,
    /// Current value of the target, for text inputs and selects.
    pub value: Option<String>,
}

impl Interaction {
    pub fn click(path: Vec<Element>) -> Self {
        Self { path, value: None }
    }

    pub fn input(path: Vec<Element>, value: impl Into<String>) -> Self {
        Self {
            path,
            value: Some(value.into()),
        }
    }

    /// Finds the closest element carrying an action and extracts its payload.
    pub fn resolve(&self) -> Option<(String, Payload)> {
        let el = self
            .path
            .iter()
            .find(|el| el.attrs.contains_key(ACTION_ATTR))?;
        let action = el.attrs.get(ACTION_ATTR)?.trim().to_string();
        if action.is_empty() {
            return None;
        }
        let mut payload = Payload::default();
        for (name, value) in &el.attrs {
            if name == ACTION_ATTR {
                continue;
            }
            if let Some(key) = name.strip_prefix("data-") {
                payload.fields.insert(key.to_string(), value.clone());
            }
        }
        if let Some(v) = &self.value {
            payload.fields.insert("value".to_string(), v.clone());
        }
        Some((action, payload))
    }
}

/// The `data-*` parameters of a resolved action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: BTreeMap<String, String>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, AppError> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::validation(format!("missing {key}")))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, AppError> {
        let raw = self.require(key)?;
        raw.trim()
            .parse()
            .map_err(|_| AppError::validation(format!("invalid {key}: {raw}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
