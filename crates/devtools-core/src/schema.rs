//! In-memory model of a DevTools protocol description.
//!
//! The protocol ships as a JSON document (`browser_protocol.json`,
//! `js_protocol.json`) listing every *domain* together with its commands,
//! events, and types.  Only the parts needed to generate callable bindings
//! are modelled here; everything else in the file (events, type
//! definitions, redirects) is ignored by the deserializer.
//!
//! ```json
//! {
//!   "version": { "major": "1", "minor": "3" },
//!   "domains": [
//!     {
//!       "domain": "Page",
//!       "commands": [
//!         { "name": "navigate",
//!           "parameters": [ { "name": "url", "type": "string" } ] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A [`Schema`] is immutable once loaded.  [`Schema::from_json_str`] and
//! [`Schema::load`] both run [`Schema::validate`], so a schema value obtained
//! through them is guaranteed to map every domain, command, and parameter to
//! a distinct generated identifier.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::naming::{domain_to_attr_name, to_snake_case};

/// Errors raised while loading or validating a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not have the expected shape.
    #[error("malformed schema: {0}")]
    Json(#[from] serde_json::Error),

    /// Two domains map to the same accessor name.
    #[error("domains `{first}` and `{second}` both map to accessor `{attr}`")]
    AttrNameCollision {
        first: String,
        second: String,
        attr: String,
    },

    /// Two commands of one domain map to the same generated function name.
    #[error("commands `{domain}.{first}` and `{domain}.{second}` collide as `{ident}`")]
    CommandNameCollision {
        domain: String,
        first: String,
        second: String,
        ident: String,
    },

    /// Two parameters of one command map to the same generated argument name.
    #[error("parameters `{first}` and `{second}` of `{method}` collide as `{ident}`")]
    ParameterNameCollision {
        method: String,
        first: String,
        second: String,
        ident: String,
    },
}

// ── Schema types ──────────────────────────────────────────────────────────────

/// A whole protocol description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Schema {
    pub version: Version,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// Protocol version.  The published files spell the parts as strings
/// (`"1"`, `"3"`); integers are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
    #[serde(deserialize_with = "version_part")]
    pub major: String,
    #[serde(deserialize_with = "version_part")]
    pub minor: String,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// One protocol domain, e.g. `Page` or `DOMDebugger`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Domain {
    /// Capitalised wire name.
    #[serde(rename = "domain")]
    pub name: String,
    #[serde(default)]
    pub experimental: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

/// A command belonging to exactly one [`Domain`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub experimental: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// One named argument of a command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<ParamType>,
    /// Name of a schema type when the parameter is declared by reference.
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// The primitive type tag of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Any,
    /// A tag this model does not know about, kept verbatim.
    Other(String),
}

impl ParamType {
    /// Maps a schema `type` tag onto the enum.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "integer" => Self::Integer,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "any" => Self::Any,
            other => Self::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

fn version_part<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Part {
        Text(String),
        Number(u64),
    }

    Ok(match Part::deserialize(deserializer)? {
        Part::Text(text) => text,
        Part::Number(number) => number.to_string(),
    })
}

// ── Loading and validation ────────────────────────────────────────────────────

impl Schema {
    /// Parses and validates a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] for malformed input and one of the
    /// collision variants if two names map to the same generated identifier.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(text)?;
        schema.validate()?;
        debug!(
            version = %schema.version,
            domains = schema.domains.len(),
            "loaded protocol schema"
        );
        Ok(schema)
    }

    /// Reads, parses, and validates a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Schema::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// `"{major}.{minor}"`.
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Looks a domain up by its wire name.
    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Checks that every domain, command, and parameter maps to a distinct
    /// generated name.
    ///
    /// # Errors
    ///
    /// Returns the first collision found, in schema order.
    pub fn validate(&self) -> Result<(), SchemaError> {
        // Accessors are compared both as attribute names and as the
        // snake_case identifiers actually emitted.
        let mut accessors: HashMap<String, usize> = HashMap::new();
        for (index, domain) in self.domains.iter().enumerate() {
            let attr = domain.attr_name();
            for key in [attr.clone(), to_snake_case(&attr)] {
                match accessors.insert(key, index) {
                    Some(first) if first != index => {
                        return Err(SchemaError::AttrNameCollision {
                            first: self.domains[first].name.clone(),
                            second: domain.name.clone(),
                            attr,
                        });
                    }
                    _ => {}
                }
            }
            domain.validate()?;
        }
        Ok(())
    }
}

impl Domain {
    /// The lower-camel accessor name, see [`domain_to_attr_name`].
    pub fn attr_name(&self) -> String {
        domain_to_attr_name(&self.name)
    }

    /// Looks a command up by its wire name.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut idents: HashMap<String, &str> = HashMap::new();
        for command in &self.commands {
            let ident = to_snake_case(&command.name);
            if let Some(first) = idents.insert(ident.clone(), &command.name) {
                return Err(SchemaError::CommandNameCollision {
                    domain: self.name.clone(),
                    first: first.to_string(),
                    second: command.name.clone(),
                    ident,
                });
            }
            command.validate(&self.name)?;
        }
        Ok(())
    }
}

impl Command {
    /// Fully qualified wire name, `"{domain}.{command}"`.
    pub fn wire_name(&self, domain: &str) -> String {
        format!("{domain}.{}", self.name)
    }

    /// Parameters in generated-call order: required ones first, then the
    /// optional ones, each group keeping schema order.
    pub fn ordered_parameters(&self) -> impl Iterator<Item = &Parameter> {
        let required = self.parameters.iter().filter(|p| !p.optional);
        let optional = self.parameters.iter().filter(|p| p.optional);
        required.chain(optional)
    }

    fn validate(&self, domain: &str) -> Result<(), SchemaError> {
        let mut idents: HashMap<String, &str> = HashMap::new();
        for param in &self.parameters {
            let ident = to_snake_case(&param.name);
            if let Some(first) = idents.insert(ident.clone(), &param.name) {
                return Err(SchemaError::ParameterNameCollision {
                    method: self.wire_name(domain),
                    first: first.to_string(),
                    second: param.name.clone(),
                    ident,
                });
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_SCHEMA: &str = r#"{
        "version": { "major": "1", "minor": "3" },
        "domains": [
            {
                "domain": "Page",
                "description": "Actions and events related to the inspected page.",
                "commands": [
                    {
                        "name": "navigate",
                        "description": "Navigates current page to the given URL.",
                        "parameters": [
                            { "name": "referrer", "type": "string", "optional": true },
                            { "name": "url", "type": "string", "description": "URL to navigate the page to." }
                        ]
                    },
                    { "name": "captureScreenshot" }
                ],
                "events": [ { "name": "loadEventFired" } ]
            },
            { "domain": "DOMDebugger", "experimental": true, "commands": [] }
        ]
    }"#;

    #[test]
    fn test_parse_small_schema() {
        // Arrange / Act
        let schema = Schema::from_json_str(SMALL_SCHEMA).unwrap();

        // Assert
        assert_eq!(schema.version_string(), "1.3");
        assert_eq!(schema.domains.len(), 2);
        let page = schema.domain("Page").unwrap();
        assert!(!page.experimental);
        assert_eq!(page.commands.len(), 2);
        assert!(schema.domain("DOMDebugger").unwrap().experimental);
    }

    #[test]
    fn test_command_without_parameters_defaults_to_empty_list() {
        let schema = Schema::from_json_str(SMALL_SCHEMA).unwrap();
        let capture = schema.domain("Page").unwrap().command("captureScreenshot").unwrap();
        assert!(capture.parameters.is_empty());
        assert!(capture.description.is_none());
    }

    #[test]
    fn test_ordered_parameters_puts_required_first() {
        // Arrange
        let schema = Schema::from_json_str(SMALL_SCHEMA).unwrap();
        let navigate = schema.domain("Page").unwrap().command("navigate").unwrap();

        // Act
        let names: Vec<&str> = navigate
            .ordered_parameters()
            .map(|p| p.name.as_str())
            .collect();

        // Assert
        assert_eq!(names, vec!["url", "referrer"]);
    }

    #[test]
    fn test_wire_name_joins_domain_and_command() {
        let schema = Schema::from_json_str(SMALL_SCHEMA).unwrap();
        let navigate = schema.domain("Page").unwrap().command("navigate").unwrap();
        assert_eq!(navigate.wire_name("Page"), "Page.navigate");
    }

    #[test]
    fn test_numeric_version_parts_are_accepted() {
        let schema =
            Schema::from_json_str(r#"{"version": {"major": 1, "minor": 2}, "domains": []}"#)
                .unwrap();
        assert_eq!(schema.version_string(), "1.2");
    }

    #[test]
    fn test_param_type_tags() {
        assert_eq!(ParamType::from_tag("integer"), ParamType::Integer);
        assert_eq!(ParamType::from_tag("boolean"), ParamType::Boolean);
        assert_eq!(
            ParamType::from_tag("binary"),
            ParamType::Other("binary".to_string())
        );
    }

    #[test]
    fn test_ref_parameter_has_no_type_tag() {
        let schema = Schema::from_json_str(
            r#"{"version": {"major": "1", "minor": "0"}, "domains": [
                {"domain": "Page", "commands": [
                    {"name": "navigate", "parameters": [
                        {"name": "frameId", "$ref": "FrameId", "optional": true}
                    ]}
                ]}
            ]}"#,
        )
        .unwrap();
        let param = &schema.domains[0].commands[0].parameters[0];
        assert!(param.kind.is_none());
        assert_eq!(param.reference.as_deref(), Some("FrameId"));
        assert!(param.optional);
    }

    #[test]
    fn test_domain_attr_name_collision_is_rejected() {
        // Arrange: "CSS" and "Css" both map to "css".
        let text = r#"{"version": {"major": "1", "minor": "0"}, "domains": [
            {"domain": "CSS", "commands": []},
            {"domain": "Css", "commands": []}
        ]}"#;

        // Act
        let err = Schema::from_json_str(text).unwrap_err();

        // Assert
        assert!(matches!(err, SchemaError::AttrNameCollision { ref attr, .. } if attr == "css"));
    }

    #[test]
    fn test_duplicate_domain_name_is_rejected() {
        // Arrange
        let text = r#"{"version": {"major": "1", "minor": "0"}, "domains": [
            {"domain": "Page", "commands": []},
            {"domain": "Page", "commands": [{"name": "enable"}]}
        ]}"#;

        // Act
        let err = Schema::from_json_str(text).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            SchemaError::AttrNameCollision { ref first, ref second, ref attr }
                if first == "Page" && second == "Page" && attr == "page"
        ));
    }

    #[test]
    fn test_command_name_collision_is_rejected() {
        let text = r#"{"version": {"major": "1", "minor": "0"}, "domains": [
            {"domain": "Page", "commands": [
                {"name": "getHTML"}, {"name": "getHtml"}
            ]}
        ]}"#;
        let err = Schema::from_json_str(text).unwrap_err();
        assert!(matches!(err, SchemaError::CommandNameCollision { .. }));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = Schema::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Json(_)));
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Schema::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
