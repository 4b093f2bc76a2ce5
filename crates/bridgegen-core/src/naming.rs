//! Case conversion and identifier helpers shared by symbol computation
//! and the emitter.
//!
//! Native names are never case-converted: entry points use member names
//! verbatim. Only the Rust items the emitter writes go through here.

const RESERVED: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// Convert a PascalCase or camelCase member name to snake_case
///
/// # Examples
/// ```
/// use bridgegen_core::naming::to_snake_case;
/// assert_eq!(to_snake_case("Width"), "width");
/// assert_eq!(to_snake_case("GetPixelWidth"), "get_pixel_width");
/// assert_eq!(to_snake_case("EnableMSAA"), "enable_msaa");
/// assert_eq!(to_snake_case("already_snake"), "already_snake");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_was_upper = false;
    let mut prev_was_underscore = true; // Start as true to avoid leading underscore

    for c in s.chars() {
        if c == '-' || c == '.' {
            if !prev_was_underscore {
                result.push('_');
                prev_was_underscore = true;
            }
            prev_was_upper = false;
        } else if c.is_uppercase() {
            if !prev_was_upper && !prev_was_underscore {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_was_upper = true;
            prev_was_underscore = false;
        } else {
            result.push(c);
            prev_was_upper = false;
            prev_was_underscore = c == '_';
        }
    }

    result
}

/// Escape reserved words as raw identifiers
///
/// `self`, `Self`, `super` and `crate` cannot be raw identifiers, so they
/// get a trailing underscore instead.
pub fn to_rust_ident(name: &str) -> String {
    match name {
        "self" | "Self" | "super" | "crate" => format!("{}_", name),
        _ if RESERVED.contains(&name) => format!("r#{}", name),
        _ => name.to_string(),
    }
}

/// The bare text of an identifier, without any `r#` prefix
///
/// Used to derive helper local names such as `__{name}_native`.
pub fn ident_stem(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}
