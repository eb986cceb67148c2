//! Generates bindings for the protocol file bundled with the client crate and
//! checks the shape of the output.

use std::path::PathBuf;

use devtools_codegen::{generate, GeneratorOptions};
use devtools_core::Schema;

fn bundled_schema() -> Schema {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../devtools-client/protocol/browser_protocol.json");
    Schema::load(&path).expect("bundled protocol must load")
}

#[test]
fn test_every_domain_gets_an_accessor() {
    // Arrange
    let schema = bundled_schema();

    // Act
    let code = generate(&schema, &GeneratorOptions::default()).unwrap();

    // Assert
    for accessor in [
        "fn page(&self) -> Page<'_>;",
        "fn runtime(&self) -> Runtime<'_>;",
        "fn dom(&self) -> Dom<'_>;",
        "fn css(&self) -> Css<'_>;",
        "fn dom_debugger(&self) -> DomDebugger<'_>;",
        "fn indexed_db(&self) -> IndexedDb<'_>;",
        "fn network(&self) -> Network<'_>;",
        "fn target(&self) -> Target<'_>;",
    ] {
        assert!(code.contains(accessor), "missing accessor `{accessor}`");
    }
}

#[test]
fn test_one_async_fn_per_command() {
    let schema = bundled_schema();
    let commands: usize = schema.domains.iter().map(|d| d.commands.len()).sum();

    let code = generate(&schema, &GeneratorOptions::default()).unwrap();

    assert_eq!(code.matches("pub async fn ").count(), commands);
}

#[test]
fn test_acronym_commands_are_snake_cased() {
    let code = generate(&bundled_schema(), &GeneratorOptions::default()).unwrap();

    assert!(code.contains("pub async fn set_dom_breakpoint(&self, node_id: ::serde_json::Value, r#type: ::serde_json::Value)"));
    assert!(code.contains("pub async fn get_outer_html(&self, node_id: Option<::serde_json::Value>"));
    assert!(code.contains(r#""DOMDebugger.setDOMBreakpoint","#));
}

#[test]
fn test_multiline_descriptions_stay_doc_comments() {
    let code = generate(&bundled_schema(), &GeneratorOptions::default()).unwrap();

    for line in code.lines() {
        let trimmed = line.trim_start();
        assert!(
            !trimmed.starts_with("///    "),
            "indented doc line would form a code block: {line:?}"
        );
    }
}
