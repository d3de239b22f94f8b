//! Parameter declarations and URL suffix derivation.
//!
//! # Responsibilities
//! - Describe a declared operation parameter (name, location, example)
//! - Force path parameters to be required
//! - Build the `/:name` suffix contributed by path parameters
//!
//! # Design Decisions
//! - Pure functions only; identical input always yields identical output
//! - Path parameters contribute to the suffix in declaration order, which
//!   callers must keep aligned with their left-to-right order in the URL

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamIn {
    Path,
    Query,
    Form,
    Body,
    Header,
}

impl ParamIn {
    /// Lowercase wire name of the location.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamIn::Path => "path",
            ParamIn::Query => "query",
            ParamIn::Form => "form",
            ParamIn::Body => "body",
            ParamIn::Header => "header",
        }
    }
}

impl fmt::Display for ParamIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a location name is not one of the supported ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported parameter location: {0:?}")]
pub struct UnknownLocation(pub String);

impl FromStr for ParamIn {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(ParamIn::Path),
            "query" => Ok(ParamIn::Query),
            "form" => Ok(ParamIn::Form),
            "body" => Ok(ParamIn::Body),
            "header" => Ok(ParamIn::Header),
            _ => Err(UnknownLocation(s.to_string())),
        }
    }
}

/// A declared operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,

    /// Location of the parameter in the request.
    #[serde(rename = "in")]
    pub location: ParamIn,

    /// Whether the parameter must be present. Always true for path parameters
    /// once the owning descriptor is built.
    #[serde(default)]
    pub required: bool,

    /// Example value, at least the zero value of the expected type.
    #[serde(default)]
    pub format: serde_json::Value,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl Param {
    pub fn new(name: impl Into<String>, location: ParamIn) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            format: serde_json::Value::Null,
            description: String::new(),
        }
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamIn::Path)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParamIn::Query)
    }

    pub fn form(name: impl Into<String>) -> Self {
        Self::new(name, ParamIn::Form)
    }

    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParamIn::Body)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParamIn::Header)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn format(mut self, format: serde_json::Value) -> Self {
        self.format = format;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the parameter is bound to a URL segment.
    pub fn is_path(&self) -> bool {
        self.location == ParamIn::Path
    }
}

/// Derive the URL suffix from the path parameters and mark them required.
///
/// Returns the suffix (`/:a/:b` for path params `a`, `b` in declaration order)
/// together with a copy of the parameters where every path parameter has
/// `required = true`. Non-path parameters are returned untouched.
pub fn derive_suffix_and_required(params: &[Param]) -> (String, Vec<Param>) {
    let mut suffix = String::new();
    let mut out = Vec::with_capacity(params.len());

    for param in params {
        let mut param = param.clone();
        if param.is_path() {
            param.required = true;
            suffix.push_str("/:");
            suffix.push_str(&param.name);
        }
        out.push(param);
    }

    (suffix, out)
}
