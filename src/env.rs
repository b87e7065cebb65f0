//! Environment variable abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`]
//! (after `main` has folded any `.env` file into the process environment).
//! Tests use [`Env::mock()`] backed by a `HashMap`, so nothing ever calls
//! [`std::env::set_var`].

use std::collections::HashMap;
use std::str::FromStr;

/// Environment variable reader.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name. Blank values count as unset.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }?;
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }

    /// Look up and parse a variable.
    ///
    /// Returns `None` when unset. A value that fails to parse is logged and
    /// ignored so a typo never prevents startup.
    pub fn parsed<T: FromStr>(&self, name: &str) -> Option<T> {
        let raw = self.var(name)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("ignoring invalid {name} value: {raw}");
                None
            }
        }
    }
}
