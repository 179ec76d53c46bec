use serde::Serialize;
use std::fmt;

/// Separator between names in the enablement value.
pub const DELIMITER: char = '+';

/// Handler names requested through the enablement value, in the order given.
///
/// Tokens are trimmed and lower-cased; blank tokens are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestedHandlers(Vec<String>);

impl RequestedHandlers {
    pub fn parse(value: Option<&str>) -> Self {
        let names = value
            .map(|value| {
                value
                    .split(DELIMITER)
                    .map(|token| token.trim().to_lowercase())
                    .filter(|token| !token.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RequestedHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
