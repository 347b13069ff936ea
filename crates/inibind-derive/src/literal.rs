//! Literal handling for attribute values.

use unsynn::{Literal, TokenStream, TokenTree};

/// Parse a string literal (regular or raw) and return its content.
pub(crate) fn parse_string_literal(lit: &Literal) -> Option<String> {
    let text = lit.to_string();
    let text = text.as_str();

    // Raw string: r#"..."# or r"..."
    if let Some(rest) = text.strip_prefix('r') {
        let hashes = rest.chars().take_while(|&c| c == '#').count();
        let prefix = 1 + hashes + 1;
        let suffix = 1 + hashes;
        if text.len() >= prefix + suffix {
            return Some(text[prefix..text.len() - suffix].to_string());
        }
        return None;
    }

    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('0') => result.push('\0'),
            Some('u') => {
                // \u{XXXX}
                if chars.next() != Some('{') {
                    return None;
                }
                let mut hex = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    hex.push(c);
                }
                let code = u32::from_str_radix(&hex.replace('_', ""), 16).ok()?;
                result.push(char::from_u32(code)?);
            }
            // Line continuation: skip the newline and leading whitespace.
            Some('\n') => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            _ => return None,
        }
    }
    Some(result)
}

/// Text of an attribute value: string literals are unescaped, anything
/// else (`8080`, `-1`, `true`, `2.5`) is taken as written.
pub(crate) fn value_text(tokens: &[TokenTree]) -> Option<String> {
    match tokens {
        [] => None,
        [TokenTree::Literal(lit)] => {
            let text = lit.to_string();
            if text.starts_with('"') || text.starts_with('r') {
                parse_string_literal(lit)
            } else {
                Some(text)
            }
        }
        _ => Some(
            tokens
                .iter()
                .cloned()
                .collect::<TokenStream>()
                .to_string()
                .replace(' ', ""),
        ),
    }
}
