use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Caller-supplied options passed to the transformation untouched.
///
/// The relay never interprets this blob. It is kept as the exact JSON text
/// that arrived on the trigger request so the outbound payload carries the
/// same bytes. An absent or `null` blob serialises as `null`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Option<Box<RawValue>>);

impl Options {
    /// Wrap raw JSON text, validating only that it is well-formed JSON.
    pub fn from_raw(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(|raw| Self(Some(raw)))
    }

    /// The verbatim JSON text, if the caller supplied one.
    pub fn as_raw(&self) -> Option<&str> {
        self.0.as_deref().map(RawValue::get)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl PartialEq for Options {
    fn eq(&self, other: &Self) -> bool {
        self.as_raw() == other.as_raw()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_raw() {
            Some(raw) => write!(f, "Options({raw})"),
            None => f.write_str("Options(null)"),
        }
    }
}
