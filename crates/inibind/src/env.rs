//! `$NAME` / `${NAME}` substitution in values.

use std::borrow::Cow;
use std::collections::HashMap;

/// Source of environment variables.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for tests and sandboxed parsing.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn name_len(text: &str) -> usize {
    text.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len())
}

/// Replace every `${NAME}` and `$NAME` in `value`. Unset variables expand
/// to nothing. A `$` that starts neither form is kept as is.
pub fn expand<'a>(value: &'a str, env: &dyn Environment) -> Cow<'a, str> {
    let Some(first) = value.find('$') else {
        return Cow::Borrowed(value);
    };

    let mut out = String::with_capacity(value.len());
    out.push_str(&value[..first]);
    let mut rest = &value[first..];

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        rest = &rest[dollar + 1..];

        if let Some(braced) = rest.strip_prefix('{') {
            let len = name_len(braced);
            if len > 0 && braced[len..].starts_with('}') {
                out.push_str(&env.var(&braced[..len]).unwrap_or_default());
                rest = &braced[len + 1..];
            } else {
                out.push('$');
            }
            continue;
        }

        let len = name_len(rest);
        if len == 0 {
            out.push('$');
            continue;
        }
        out.push_str(&env.var(&rest[..len]).unwrap_or_default());
        rest = &rest[len..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> MapEnv {
        MapEnv::new()
            .with("HOME", "/home/app")
            .with("PORT", "8080")
            .with("EMPTY", "")
    }

    #[test]
    fn test_no_reference_borrows() {
        assert!(matches!(expand("plain value", &env()), Cow::Borrowed("plain value")));
    }

    #[test]
    fn test_both_forms() {
        assert_eq!(expand("$HOME/data", &env()), "/home/app/data");
        assert_eq!(expand("${HOME}data", &env()), "/home/appdata");
        assert_eq!(expand("localhost:${PORT}", &env()), "localhost:8080");
        assert_eq!(expand("$HOME:$PORT", &env()), "/home/app:8080");
    }

    #[test]
    fn test_unset_is_empty() {
        assert_eq!(expand("a${MISSING}b", &env()), "ab");
        assert_eq!(expand("a$MISSING", &env()), "a");
        assert_eq!(expand("a${EMPTY}b", &env()), "ab");
    }

    #[test]
    fn test_literal_dollars() {
        assert_eq!(expand("cost: $5", &env()), "cost: ");
        assert_eq!(expand("cost $", &env()), "cost $");
        assert_eq!(expand("a $ b", &env()), "a $ b");
        assert_eq!(expand("${HOME", &env()), "${HOME");
        assert_eq!(expand("${}", &env()), "${}");
        assert_eq!(expand("$$HOME", &env()), "$/home/app");
    }

    #[test]
    fn test_expansion_is_not_recursive() {
        let env = MapEnv::new().with("A", "$B").with("B", "nope");
        assert_eq!(expand("$A", &env), "$B");
    }
}
