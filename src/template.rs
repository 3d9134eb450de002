use crate::error::Result;
use crate::keys::KeyValueMap;
use regex::{Captures, Regex};

/// Represents a `${key}` placeholder found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The key between `${` and `}`
    pub key: String,
    /// Starting position in the template
    pub start: usize,
    /// Ending position in the template
    pub end: usize,
}

/// Builds the placeholder token for a key, e.g. `${name}`
#[must_use]
pub fn placeholder_token(key: &str) -> String {
    format!("${{{key}}}")
}

/// Replaces every `${key}` in `template` with its value.
///
/// Substitution is a single literal pass over `template`: inserted values are
/// never scanned again, so a value containing `${other}` stays as written.
/// Where tokens overlap, the longest one wins. Placeholders without a key are
/// left as they are.
///
/// # Errors
///
/// Returns `TemplaterError::Regex` if the token pattern can't be compiled.
pub fn fill_template(template: &str, keys: &KeyValueMap) -> Result<String> {
    if keys.is_empty() {
        return Ok(template.to_string());
    }

    let mut tokens: Vec<String> = keys.keys().map(|key| placeholder_token(key)).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&alternation)?;

    let filled = pattern.replace_all(template, |captures: &Captures| {
        let token = &captures[0];
        let key = &token[2..token.len() - 1];
        keys.get(key).cloned().unwrap_or_else(|| token.to_string())
    });
    Ok(filled.into_owned())
}

/// Finds all `${...}` placeholders in the given text
///
/// # Errors
///
/// Returns `TemplaterError::Regex` if there's an error compiling the regex pattern.
pub fn find_placeholders(template: &str) -> Result<Vec<Placeholder>> {
    let pattern = Regex::new(r"\$\{([^{}]*)\}")?;
    let mut placeholders = Vec::new();

    for capture in pattern.captures_iter(template) {
        if let Some(full_match) = capture.get(0)
            && let Some(key) = capture.get(1)
        {
            placeholders.push(Placeholder {
                key: key.as_str().to_string(),
                start: full_match.start(),
                end: full_match.end(),
            });
        }
    }

    Ok(placeholders)
}

/// Returns the placeholders of `template` that `keys` has no value for
///
/// # Errors
///
/// Returns errors from `find_placeholders`.
pub fn unresolved_placeholders(template: &str, keys: &KeyValueMap) -> Result<Vec<Placeholder>> {
    Ok(find_placeholders(template)?
        .into_iter()
        .filter(|placeholder| !keys.contains_key(&placeholder.key))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&str, &str)]) -> KeyValueMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn fill(template: &str, pairs: &[(&str, &str)]) -> String {
        fill_template(template, &keys(pairs)).unwrap()
    }

    #[test]
    fn test_fill_template_basic() {
        assert_eq!(fill("${a}-${b}", &[("a", "1"), ("b", "2")]), "1-2");
    }

    #[test]
    fn test_fill_template_missing_key_untouched() {
        assert_eq!(fill("${missing}", &[]), "${missing}");
        assert_eq!(fill("${a} ${missing}", &[("a", "x")]), "x ${missing}");
    }

    #[test]
    fn test_fill_template_every_occurrence() {
        assert_eq!(fill("${x}${x} and ${x}", &[("x", "y")]), "yy and y");
    }

    #[test]
    fn test_fill_template_is_literal() {
        // regex metacharacters in keys and values are plain text
        assert_eq!(fill("${a.b} ${c}", &[("a.b", "$1"), ("c", "\\d+")]), "$1 \\d+");
        assert_eq!(fill("${a*} ${a}", &[("a*", "star"), ("a", "plain")]), "star plain");
        // bare key without braces is not a placeholder
        assert_eq!(fill("$a {a}", &[("a", "1")]), "$a {a}");
    }

    #[test]
    fn test_fill_template_value_not_reexpanded_by_own_key() {
        assert_eq!(fill("${a}", &[("a", "${a}!")]), "${a}!");
    }

    #[test]
    fn test_fill_template_value_not_reexpanded_by_other_key() {
        // `a` sorts before `b`
        assert_eq!(fill("${a}", &[("a", "${b}"), ("b", "x")]), "${b}");
        // `z` sorts after `b`
        assert_eq!(fill("${z}", &[("z", "${b}"), ("b", "x")]), "${b}");
        assert_eq!(
            fill("${a} ${b}", &[("a", "${b}"), ("b", "${a}")]),
            "${b} ${a}"
        );
    }

    #[test]
    fn test_fill_template_independent_of_key_names() {
        let template = "${first}/${second}";
        assert_eq!(
            fill(template, &[("first", "${second}"), ("second", "2")]),
            "${second}/2"
        );
        let renamed = "${zfirst}/${second}";
        assert_eq!(
            fill(renamed, &[("zfirst", "${second}"), ("second", "2")]),
            "${second}/2"
        );
    }

    #[test]
    fn test_fill_template_idempotent() {
        let map = keys(&[("host", "db"), ("port", "5432")]);
        let template = "url: ${host}:${port}/${name}";
        let once = fill_template(template, &map).unwrap();
        assert_eq!(once, "url: db:5432/${name}");
        assert_eq!(fill_template(&once, &map).unwrap(), once);
    }

    #[test]
    fn test_fill_template_empty() {
        assert_eq!(fill("", &[("a", "1")]), "");
        assert_eq!(fill("plain text\n", &[("a", "1")]), "plain text\n");
    }

    #[test]
    fn test_find_placeholders() {
        let placeholders = find_placeholders("a: ${one}\nb: ${two} ${}").unwrap();
        assert_eq!(placeholders.len(), 3);
        assert_eq!(placeholders[0].key, "one");
        assert_eq!(placeholders[0].start, 3);
        assert_eq!(placeholders[0].end, 9);
        assert_eq!(placeholders[1].key, "two");
        assert_eq!(placeholders[2].key, "");

        assert!(find_placeholders("no placeholders $here {x}").unwrap().is_empty());
        assert!(find_placeholders("${unclosed").unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_placeholders() {
        let unresolved =
            unresolved_placeholders("${a} ${b} ${a}", &keys(&[("a", "1")])).unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].key, "b");
    }

    #[test]
    fn test_placeholder_token() {
        assert_eq!(placeholder_token("name"), "${name}");
    }
}
