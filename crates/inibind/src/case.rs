//! Key name case conversion.

/// `MaxConns` / `maxConns` to `max_conns`. Already snake_case names pass through.
pub(crate) fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `max_conns` to `MaxConns`.
pub(crate) fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split('_') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Comparison form for fallback matching: PascalCase, then lower-cased,
/// so `max_conns`, `MaxConns` and `maxconns` compare equal.
pub(crate) fn fold_key(name: &str) -> String {
    to_pascal_case(name).to_lowercase()
}

/// Key a field binds to when it has no explicit one.
pub(crate) fn default_key(declared: &str) -> String {
    to_snake_case(declared.strip_prefix("r#").unwrap_or(declared))
}
