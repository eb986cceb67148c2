//! Identifier rules shared by the binding generator and the schema validator.
//!
//! Three spellings exist for every schema name:
//!
//! | Spelling           | Example (`DOMDebugger`) | Used for                         |
//! |--------------------|-------------------------|----------------------------------|
//! | wire name          | `DOMDebugger`           | the `method` field on the wire   |
//! | attribute name     | `domDebugger`           | the canonical accessor name      |
//! | Rust identifier    | `dom_debugger`          | generated accessor functions     |
//!
//! The attribute name is produced by [`domain_to_attr_name`] and is the only
//! mapping from a domain to its accessor.  The Rust identifier is derived
//! from it mechanically by [`to_snake_case`], so two domains collide in Rust
//! only if they already collide as attribute names (or differ solely in case
//! below the first letter of a word, which the schema validator also rejects).

/// Words reserved by the Rust language that must not appear as bare
/// identifiers in generated code.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers (`r#self` is rejected
/// by the compiler), so they get a trailing underscore instead.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Converts a capitalised domain name into its lower-camel attribute name.
///
/// The first character is lowercased.  While the name is still inside its
/// leading run of capitals, each capital is lowercased unless it is directly
/// followed by a lowercase letter, in which case it starts the next word and
/// stays uppercase.  Once the first lowercase letter has been seen the rest
/// of the name is copied unchanged.
///
/// # Examples
///
/// ```rust
/// use devtools_core::naming::domain_to_attr_name;
///
/// assert_eq!(domain_to_attr_name("CSS"), "css");
/// assert_eq!(domain_to_attr_name("DOMDebugger"), "domDebugger");
/// assert_eq!(domain_to_attr_name("IndexedDB"), "indexedDB");
/// assert_eq!(domain_to_attr_name("Page"), "page");
/// ```
pub fn domain_to_attr_name(domain: &str) -> String {
    let chars: Vec<char> = domain.chars().collect();
    let mut out = String::with_capacity(domain.len());
    let mut in_leading_run = true;

    for (n, &c) in chars.iter().enumerate() {
        if n == 0 {
            out.extend(c.to_lowercase());
            continue;
        }

        let prev_is_upper = chars.get(n - 1).is_some_and(|p| p.is_uppercase());
        if in_leading_run && prev_is_upper {
            let next_is_lower = chars.get(n + 1).is_some_and(|next| next.is_lowercase());
            if next_is_lower {
                out.push(c);
            } else {
                out.extend(c.to_lowercase());
            }
            if c.is_lowercase() {
                in_leading_run = false;
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Converts a camelCase (or PascalCase) name into snake_case.
///
/// An underscore is inserted before an uppercase letter when the previous
/// character is lowercase or a digit, or when it closes an acronym
/// (`getOuterHTML` → `get_outer_html`, `setDOMStorageItem` →
/// `set_dom_storage_item`).
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (n, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && n > 0 {
            let prev = chars.get(n - 1).copied().unwrap_or('_');
            let next_is_lower = chars.get(n + 1).is_some_and(|next| next.is_lowercase());
            let starts_word = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if starts_word && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Converts a snake_case name into UpperCamelCase (`dom_debugger` →
/// `DomDebugger`).
pub fn to_upper_camel(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Returns `true` if `word` is reserved in Rust.
pub fn is_rust_keyword(word: &str) -> bool {
    RUST_KEYWORDS.contains(&word)
}

/// Turns a schema name into a usable Rust value identifier.
///
/// The name is snake-cased; keywords become raw identifiers (`type` →
/// `r#type`) except those the compiler refuses in raw form, which get a
/// trailing underscore (`self` → `self_`).  Names starting with a digit are
/// prefixed with an underscore.
pub fn rust_ident(name: &str) -> String {
    let snake = to_snake_case(name);
    if NON_RAW_KEYWORDS.contains(&snake.as_str()) {
        format!("{snake}_")
    } else if is_rust_keyword(&snake) {
        format!("r#{snake}")
    } else if snake.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{snake}")
    } else {
        snake
    }
}
