//! # devtools-codegen
//!
//! Turns a protocol [`Schema`] into Rust source for typed, async bindings.
//!
//! For every domain the generator emits a small borrowing struct with one
//! `async fn` per command, and a `Domains` trait giving the session one
//! accessor per domain.  For a domain `Page` with a command
//! `navigate(url, referrer?)` the generated surface is:
//!
//! ```text
//! session.page().navigate("http://example.com", None).await
//!     -> Result<serde_json::Value, ClientError>
//! ```
//!
//! The generated code refers to the runtime only through four items,
//! `CallArgs`, `ClientError`, `Session`, and `Session::call`, all resolved
//! under [`GeneratorOptions::runtime_path`].  Everything else is spelled with
//! absolute paths so the output can be `include!`d into any module.
//!
//! Generation is a pure function of its inputs: the same schema always
//! produces byte-identical output.

use std::collections::HashMap;
use std::fmt::Write;

use devtools_core::naming::{is_rust_keyword, rust_ident, to_snake_case, to_upper_camel};
use devtools_core::schema::{Command, Domain, ParamType, Parameter, Schema, SchemaError};
use thiserror::Error;
use tracing::debug;

/// Name of the emitted accessor trait.
pub const DOMAINS_TRAIT: &str = "Domains";

/// Method names every bindings struct defines itself.
const RESERVED_METHODS: &[&str] = &["new"];

/// Errors raised by [`generate`].
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The schema maps two names onto one identifier.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    /// Two domains would produce the same bindings struct.
    #[error("domains `{first}` and `{second}` both generate struct `{ident}`")]
    StructNameCollision {
        first: String,
        second: String,
        ident: String,
    },

    /// A command would generate a method the bindings struct already has.
    #[error("command `{domain}.{command}` would generate reserved method `{ident}`")]
    ReservedCommandName {
        domain: String,
        command: String,
        ident: String,
    },

    /// Writing into the output buffer failed.
    #[error("failed to format generated code")]
    Format(#[from] std::fmt::Error),
}

/// Knobs for [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Module path under which `CallArgs`, `ClientError`, and `Session` are
    /// reachable from the generated code.  `"crate"` when the output is
    /// included into the client crate itself.
    pub runtime_path: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_path: "crate".to_string(),
        }
    }
}

/// Renders bindings for every domain of `schema`.
///
/// # Errors
///
/// Returns [`GenerateError::Schema`] if the schema fails validation,
/// [`GenerateError::StructNameCollision`] if two domains would produce the
/// same struct name, and [`GenerateError::ReservedCommandName`] if a command
/// would shadow the struct's constructor.
pub fn generate(schema: &Schema, options: &GeneratorOptions) -> Result<String, GenerateError> {
    schema.validate()?;
    let names = DomainNames::assign(&schema.domains)?;
    let rt = options.runtime_path.as_str();

    let mut out = String::new();
    writeln!(
        out,
        "// Generated by devtools-gen from protocol version {}. Do not edit.",
        schema.version
    )?;
    writeln!(out)?;
    writeln!(out, "/// Protocol version these bindings were generated from.")?;
    writeln!(
        out,
        "pub const PROTOCOL_VERSION: &str = {:?};",
        schema.version_string()
    )?;

    for (domain, name) in schema.domains.iter().zip(&names.0) {
        emit_domain(&mut out, rt, domain, name)?;
    }
    emit_domains_trait(&mut out, rt, &schema.domains, &names.0)?;

    debug!(
        version = %schema.version,
        domains = schema.domains.len(),
        bytes = out.len(),
        "generated bindings"
    );
    Ok(out)
}

// ── Naming ────────────────────────────────────────────────────────────────────

/// Generated identifiers for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DomainName {
    /// Bindings struct, e.g. `DomDebugger`.
    type_name: String,
    /// Accessor function, e.g. `dom_debugger`.
    accessor: String,
}

struct DomainNames(Vec<DomainName>);

impl DomainNames {
    fn assign(domains: &[Domain]) -> Result<Self, GenerateError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        seen.insert(DOMAINS_TRAIT.to_string(), DOMAINS_TRAIT);

        let mut names = Vec::with_capacity(domains.len());
        for domain in domains {
            let name = domain_name(domain);
            if let Some(first) = seen.insert(name.type_name.clone(), &domain.name) {
                return Err(GenerateError::StructNameCollision {
                    first: first.to_string(),
                    second: domain.name.clone(),
                    ident: name.type_name,
                });
            }
            check_reserved(domain)?;
            names.push(name);
        }
        Ok(Self(names))
    }
}

fn check_reserved(domain: &Domain) -> Result<(), GenerateError> {
    for command in &domain.commands {
        let ident = rust_ident(&command.name);
        if RESERVED_METHODS.contains(&ident.as_str()) {
            return Err(GenerateError::ReservedCommandName {
                domain: domain.name.clone(),
                command: command.name.clone(),
                ident,
            });
        }
    }
    Ok(())
}

fn domain_name(domain: &Domain) -> DomainName {
    let attr = domain.attr_name();
    let mut type_name = to_upper_camel(&to_snake_case(&attr));
    if is_rust_keyword(&type_name) || type_name.is_empty() {
        type_name.push_str("Domain");
    }
    DomainName {
        type_name,
        accessor: rust_ident(&attr),
    }
}

/// The Rust type a parameter is accepted as.
fn param_type(param: &Parameter) -> &'static str {
    match param.kind {
        Some(ParamType::Integer) => "i64",
        Some(ParamType::Number) => "f64",
        Some(ParamType::String) => "&str",
        Some(ParamType::Boolean) => "bool",
        _ => "::serde_json::Value",
    }
}

// ── Emitters ──────────────────────────────────────────────────────────────────

fn emit_domain(
    out: &mut String,
    rt: &str,
    domain: &Domain,
    name: &DomainName,
) -> Result<(), GenerateError> {
    let ty = &name.type_name;

    writeln!(out)?;
    let mut doc: Vec<String> = doc_lines(domain.description.as_deref());
    if doc.is_empty() {
        doc.push(format!("Commands of the `{}` domain.", domain.name));
    }
    if domain.experimental {
        doc.push(String::new());
        doc.push("**Experimental.**".to_string());
    }
    if domain.deprecated {
        doc.push(String::new());
        doc.push("**Deprecated.**".to_string());
    }
    emit_doc(out, "", &doc)?;
    writeln!(out, "#[derive(Clone, Copy)]")?;
    writeln!(out, "pub struct {ty}<'a> {{")?;
    writeln!(out, "    session: &'a {rt}::Session,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl<'a> {ty}<'a> {{")?;
    writeln!(out, "    /// Wire name of this domain.")?;
    writeln!(out, "    pub const NAME: &'static str = {:?};", domain.name)?;
    writeln!(
        out,
        "    pub const EXPERIMENTAL: bool = {};",
        domain.experimental
    )?;
    writeln!(out)?;
    writeln!(out, "    pub fn new(session: &'a {rt}::Session) -> Self {{")?;
    writeln!(out, "        Self {{ session }}")?;
    writeln!(out, "    }}")?;

    for command in &domain.commands {
        emit_command(out, rt, &domain.name, command)?;
    }

    writeln!(out, "}}")?;
    Ok(())
}

fn emit_command(
    out: &mut String,
    rt: &str,
    domain: &str,
    command: &Command,
) -> Result<(), GenerateError> {
    writeln!(out)?;

    let mut doc = doc_lines(command.description.as_deref());
    let params: Vec<&Parameter> = command.ordered_parameters().collect();
    if !params.is_empty() {
        if !doc.is_empty() {
            doc.push(String::new());
        }
        for param in &params {
            doc.push(param_doc(param));
        }
    }
    if command.experimental {
        doc.push(String::new());
        doc.push("**Experimental.**".to_string());
    }
    if command.deprecated {
        doc.push(String::new());
        doc.push("**Deprecated.**".to_string());
    }
    emit_doc(out, "    ", &doc)?;

    let mut signature = String::from("&self");
    for param in &params {
        let ty = param_type(param);
        if param.optional {
            write!(signature, ", {}: Option<{ty}>", rust_ident(&param.name))?;
        } else {
            write!(signature, ", {}: {ty}", rust_ident(&param.name))?;
        }
    }

    writeln!(
        out,
        "    pub async fn {}({signature}) -> Result<::serde_json::Value, {rt}::ClientError> {{",
        rust_ident(&command.name)
    )?;
    writeln!(out, "        self.session")?;
    writeln!(out, "            .call(")?;
    writeln!(out, "                {:?},", command.wire_name(domain))?;
    if params.is_empty() {
        writeln!(out, "                {rt}::CallArgs::new(),")?;
    } else {
        writeln!(out, "                {rt}::CallArgs::new()")?;
        for param in &params {
            let builder = if param.optional { "opt_arg" } else { "arg" };
            writeln!(
                out,
                "                    .{builder}({:?}, {})",
                param.name,
                rust_ident(&param.name)
            )?;
        }
        // Trailing comma closes the argument list of `call`.
        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len);
        writeln!(out, ",")?;
    }
    writeln!(out, "            )")?;
    writeln!(out, "            .await")?;
    writeln!(out, "    }}")?;
    Ok(())
}

fn emit_domains_trait(
    out: &mut String,
    rt: &str,
    domains: &[Domain],
    names: &[DomainName],
) -> Result<(), GenerateError> {
    writeln!(out)?;
    writeln!(out, "/// One accessor per protocol domain.")?;
    writeln!(out, "pub trait {DOMAINS_TRAIT} {{")?;
    for (domain, name) in domains.iter().zip(names) {
        writeln!(out, "    /// The `{}` domain.", domain.name)?;
        writeln!(
            out,
            "    fn {}(&self) -> {}<'_>;",
            name.accessor, name.type_name
        )?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {DOMAINS_TRAIT} for {rt}::Session {{")?;
    for name in names {
        writeln!(
            out,
            "    fn {}(&self) -> {}<'_> {{",
            name.accessor, name.type_name
        )?;
        writeln!(out, "        {}::new(self)", name.type_name)?;
        writeln!(out, "    }}")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

// ── Doc comments ──────────────────────────────────────────────────────────────

fn param_doc(param: &Parameter) -> String {
    let mut line = format!("* `{}`", param.name);
    if param.optional {
        line.push_str(" (optional)");
    }
    if let Some(description) = param.description.as_deref() {
        let text = sanitize_doc_line(&collapse_whitespace(description));
        if !text.is_empty() {
            line.push_str(" - ");
            line.push_str(&text);
        }
    }
    line
}

/// Splits a schema description into doc lines that cannot form a code
/// block: lines are left-trimmed (no indented blocks) and fences are
/// defused.
fn doc_lines(description: Option<&str>) -> Vec<String> {
    let Some(description) = description else {
        return Vec::new();
    };
    let mut lines: Vec<String> = description.lines().map(sanitize_doc_line).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    lines
}

fn sanitize_doc_line(line: &str) -> String {
    line.trim().replace("```", "'''").replace("~~~", "---")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn emit_doc(out: &mut String, indent: &str, lines: &[String]) -> Result<(), GenerateError> {
    for line in lines {
        if line.is_empty() {
            writeln!(out, "{indent}///")?;
        } else {
            writeln!(out, "{indent}/// {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(text: &str) -> Schema {
        Schema::from_json_str(text).expect("test schema must load")
    }

    const PAGE: &str = r#"{
        "version": { "major": "1", "minor": "3" },
        "domains": [{
            "domain": "Page",
            "description": "Actions and events related to the inspected page.",
            "commands": [
                { "name": "enable", "description": "Enables page domain notifications." },
                {
                    "name": "navigate",
                    "description": "Navigates current page to the given URL.",
                    "parameters": [
                        { "name": "referrer", "type": "string", "optional": true,
                          "description": "Referrer URL." },
                        { "name": "url", "type": "string", "description": "URL to navigate the page to." },
                        { "name": "transitionType", "$ref": "TransitionType", "optional": true }
                    ]
                }
            ]
        }]
    }"#;

    #[test]
    fn test_generate_emits_protocol_version() {
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();
        assert!(code.contains(r#"pub const PROTOCOL_VERSION: &str = "1.3";"#));
    }

    #[test]
    fn test_generate_puts_required_parameters_first() {
        // Act
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();

        // Assert
        assert!(code.contains(
            "pub async fn navigate(&self, url: &str, referrer: Option<&str>, \
             transition_type: Option<::serde_json::Value>) \
             -> Result<::serde_json::Value, crate::ClientError> {"
        ));
    }

    #[test]
    fn test_generate_uses_wire_names_in_call() {
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();

        assert!(code.contains(r#""Page.navigate","#));
        assert!(code.contains(r#".arg("url", url)"#));
        assert!(code.contains(r#".opt_arg("transitionType", transition_type),"#));
    }

    #[test]
    fn test_generate_command_without_parameters_sends_empty_args() {
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();

        assert!(code.contains("pub async fn enable(&self)"));
        assert!(code.contains("crate::CallArgs::new(),"));
    }

    #[test]
    fn test_generate_documents_parameters() {
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();

        assert!(code.contains("    /// Navigates current page to the given URL.\n    ///\n"));
        assert!(code.contains("/// * `url` - URL to navigate the page to."));
        assert!(code.contains("/// * `referrer` (optional) - Referrer URL."));
        assert!(code.contains("/// * `transitionType` (optional)\n"));
    }

    #[test]
    fn test_generate_emits_domain_constants_and_accessor() {
        // Act
        let code = generate(&schema(PAGE), &GeneratorOptions::default()).unwrap();

        // Assert
        assert!(code.contains("pub struct Page<'a> {"));
        assert!(code.contains(r#"pub const NAME: &'static str = "Page";"#));
        assert!(code.contains("pub const EXPERIMENTAL: bool = false;"));
        assert!(code.contains("fn page(&self) -> Page<'_>;"));
        assert!(code.contains("impl Domains for crate::Session {"));
    }

    #[test]
    fn test_generate_honours_runtime_path() {
        let options = GeneratorOptions {
            runtime_path: "::devtools_client".to_string(),
        };

        let code = generate(&schema(PAGE), &options).unwrap();

        assert!(code.contains("session: &'a ::devtools_client::Session,"));
        assert!(!code.contains("crate::"));
    }

    #[test]
    fn test_generate_escapes_keyword_parameters() {
        // Arrange
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [{ "domain": "Input", "commands": [{
                "name": "dispatchKeyEvent",
                "parameters": [ { "name": "type", "type": "string" } ]
            }]}]
        }"#;

        // Act
        let code = generate(&schema(text), &GeneratorOptions::default()).unwrap();

        // Assert: raw identifier in Rust, schema name on the wire
        assert!(code.contains("pub async fn dispatch_key_event(&self, r#type: &str)"));
        assert!(code.contains(r#".arg("type", r#type),"#));
    }

    #[test]
    fn test_generate_maps_acronym_domains() {
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [
                { "domain": "DOMDebugger", "experimental": true },
                { "domain": "IndexedDB" },
                { "domain": "CSS" }
            ]
        }"#;

        let code = generate(&schema(text), &GeneratorOptions::default()).unwrap();

        assert!(code.contains("fn dom_debugger(&self) -> DomDebugger<'_>;"));
        assert!(code.contains("fn indexed_db(&self) -> IndexedDb<'_>;"));
        assert!(code.contains("fn css(&self) -> Css<'_>;"));
        assert!(code.contains("pub const EXPERIMENTAL: bool = true;"));
    }

    #[test]
    fn test_generate_maps_primitive_types() {
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [{ "domain": "Emulation", "commands": [{
                "name": "setDeviceMetricsOverride",
                "parameters": [
                    { "name": "width", "type": "integer" },
                    { "name": "deviceScaleFactor", "type": "number" },
                    { "name": "mobile", "type": "boolean" },
                    { "name": "screenOrientation", "type": "object", "optional": true }
                ]
            }]}]
        }"#;

        let code = generate(&schema(text), &GeneratorOptions::default()).unwrap();

        assert!(code.contains(
            "width: i64, device_scale_factor: f64, mobile: bool, \
             screen_orientation: Option<::serde_json::Value>"
        ));
    }

    #[test]
    fn test_generate_defuses_code_fences_in_descriptions() {
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [{ "domain": "Runtime", "commands": [{
                "name": "evaluate",
                "description": "Evaluates.\n```\n    let x = 1;\n```"
            }]}]
        }"#;

        let code = generate(&schema(text), &GeneratorOptions::default()).unwrap();

        assert!(!code.contains("```"));
        assert!(code.contains("    /// let x = 1;\n"));
    }

    #[test]
    fn test_generate_rejects_struct_name_collision() {
        // Arrange: a domain that would shadow the accessor trait
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [{ "domain": "Domains" }]
        }"#;

        // Act
        let err = generate(&schema(text), &GeneratorOptions::default()).unwrap_err();

        // Assert
        assert!(matches!(err, GenerateError::StructNameCollision { .. }));
    }

    #[test]
    fn test_generate_rejects_command_named_like_constructor() {
        // Arrange
        let text = r#"{
            "version": { "major": "1", "minor": "0" },
            "domains": [{ "domain": "Target", "commands": [
                { "name": "getTargets" }, { "name": "new" }
            ]}]
        }"#;

        // Act
        let err = generate(&schema(text), &GeneratorOptions::default()).unwrap_err();

        // Assert
        assert!(matches!(
            err,
            GenerateError::ReservedCommandName { ref domain, ref command, ref ident }
                if domain == "Target" && command == "new" && ident == "new"
        ));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let s = schema(PAGE);
        let first = generate(&s, &GeneratorOptions::default()).unwrap();
        let second = generate(&s, &GeneratorOptions::default()).unwrap();
        assert_eq!(first, second);
    }
}
