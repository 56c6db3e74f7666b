//! Object selector used by metadata directives
//!
//! Metadata directives that read names, labels or annotations point at one of
//! the three objects involved in rendering. The selector is parsed from its
//! string form when the template is deserialized; unknown values are kept as
//! `Invalid` so the renderer can report them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object a metadata directive reads from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectSelector {
    /// The CAPI `Machine` owning the provider machine
    Machine,
    /// The `Metal3Machine` consuming the rendered data
    Metal3Machine,
    /// The `BareMetalHost` the provider machine is bound to
    BareMetalHost,
    /// Any other value, as written in the template
    Invalid(String),
}

impl ObjectSelector {
    /// Parse a selector, ignoring case
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "machine" => Self::Machine,
            "metal3machine" => Self::Metal3Machine,
            "baremetalhost" => Self::BareMetalHost,
            _ => Self::Invalid(value.to_string()),
        }
    }

    /// Canonical (lowercase) string form
    pub fn as_str(&self) -> &str {
        match self {
            Self::Machine => "machine",
            Self::Metal3Machine => "metal3machine",
            Self::BareMetalHost => "baremetalhost",
            Self::Invalid(raw) => raw,
        }
    }
}

impl From<String> for ObjectSelector {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ObjectSelector> for String {
    fn from(selector: ObjectSelector) -> Self {
        selector.as_str().to_string()
    }
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
