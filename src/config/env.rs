//! Environment snapshot and typed flag helpers

use std::collections::HashMap;

/// Point-in-time copy of the process environment.
///
/// Provider state reads credentials and flags from a snapshot instead of the
/// live environment, so a state generation sees one consistent view and tests
/// can inject their own.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Non-empty value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// `true` / `1` (case-insensitive).
    pub fn truthy(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Positive integer value of `key`.
    pub fn number(&self, key: &str) -> Option<u64> {
        self.get(key)?.trim().parse::<u64>().ok().filter(|n| *n > 0)
    }
}

impl FromIterator<(String, String)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
