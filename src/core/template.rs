// Named-placeholder interpolation for message templates
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;

/// Placeholder values keyed by name (without braces)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, replacing any previous value for `name`
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    /// Look up the stringified value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl<K: Into<String>, V: Display, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Substitute every `{name}` found in `params`.
///
/// Replacement happens in a single left-to-right pass, so substituted text
/// is never scanned again. Unknown names and stray braces are copied as-is.
pub fn interpolate<'a>(template: &'a str, params: &Params) -> Cow<'a, str> {
    if params.is_empty() || !template.contains('{') {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let value = tail[1..]
            .find('}')
            .and_then(|close| params.get(&tail[1..close + 1]).map(|v| (v, close + 2)));

        match value {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_known_placeholder() {
        let params = Params::new().with("s", 5);
        assert_eq!(interpolate("Sleep for {s} seconds", &params), "Sleep for 5 seconds");
    }

    #[test]
    fn test_unknown_placeholder_passes_through() {
        let params = Params::from([("a", "1")]);
        assert_eq!(interpolate("{a} and {b}", &params), "1 and {b}");
    }

    #[test]
    fn test_unused_params_are_ignored() {
        let params = Params::from([("x", 1), ("y", 2)]);
        assert_eq!(interpolate("only {x}", &params), "only 1");
    }

    #[test]
    fn test_repeated_placeholder() {
        let params = Params::new().with("n", "ab");
        assert_eq!(interpolate("{n}-{n}-{n}", &params), "ab-ab-ab");
    }

    #[test]
    fn test_no_rescan_of_substituted_text() {
        let params = Params::new().with("a", "{b}").with("b", "boom");
        assert_eq!(interpolate("{a}", &params), "{b}");
    }

    #[test]
    fn test_stray_braces() {
        let params = Params::new().with("s", 1);
        assert_eq!(interpolate("{{s}", &params), "{1");
        assert_eq!(interpolate("{s}}", &params), "1}");
        assert_eq!(interpolate("open { only", &params), "open { only");
        assert_eq!(interpolate("{}", &params), "{}");
    }

    #[test]
    fn test_empty_params_borrow() {
        let out = interpolate("{x}", &Params::new());
        assert!(matches!(out, Cow::Borrowed("{x}")));
    }

    #[test]
    fn test_multibyte_text() {
        let params = Params::new().with("name", "Łódź");
        assert_eq!(interpolate("→ {name} ←", &params), "→ Łódź ←");
    }
}
