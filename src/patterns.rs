//! Comment grammar table: file extension -> ordered list of strip rules.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// `#` to end of line (Python, R, and the extra PHP rule).
const HASH_LINE: &str = r"#[^\n]*";
/// `//` to end of line (C family). Always applied with the colon guard.
const SLASH_LINE: &str = r"//[^\n]*";
/// `/* ... */`, lazy body, newlines allowed.
const SLASH_BLOCK: &str = r"/\*[\s\S]*?\*/";
/// `<!-- ... -->`, lazy body, newlines allowed.
const HTML_BLOCK: &str = r"<!--[\s\S]*?-->";
/// `""" ... """` docstring blocks.
const TRIPLE_DOUBLE: &str = r#""""[\s\S]*?""""#;
/// `''' ... '''` docstring blocks.
const TRIPLE_SINGLE: &str = r"'''[\s\S]*?'''";

/// Whether a candidate match needs a look at the preceding character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Guard {
    /// Delete every match.
    None,
    /// Skip a match whose immediately preceding character is `:`, so that
    /// `://` (scope operators, URLs outside strings) is not read as the
    /// start of a `//` comment. Exactly one character back is examined.
    NotAfterColon,
}

/// One comment-matching expression, applied as a single global strip pass.
#[derive(Debug)]
pub(crate) struct Rule {
    pub(crate) pattern: Regex,
    pub(crate) guard: Guard,
}

impl Rule {
    fn plain(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            guard: Guard::None,
        }
    }

    fn colon_guarded(pattern: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            guard: Guard::NotAfterColon,
        }
    }
}

/// `//` line comments plus `/* */` block comments, in that order.
fn c_family() -> Vec<Rule> {
    vec![Rule::colon_guarded(SLASH_LINE), Rule::plain(SLASH_BLOCK)]
}

/// The supported-extension table. Keys are lower-case, no leading dot.
/// Built once, read-only afterwards.
static PATTERN_TABLE: LazyLock<HashMap<&'static str, Vec<Rule>>> = LazyLock::new(|| {
    HashMap::from([
        (
            "py",
            vec![
                Rule::plain(HASH_LINE),
                Rule::plain(TRIPLE_DOUBLE),
                Rule::plain(TRIPLE_SINGLE),
            ],
        ),
        ("r", vec![Rule::plain(HASH_LINE)]),
        ("c", c_family()),
        ("cpp", c_family()),
        ("java", c_family()),
        ("js", c_family()),
        ("ts", c_family()),
        ("rs", c_family()),
        ("php", {
            let mut rules = c_family();
            rules.push(Rule::plain(HASH_LINE));
            rules
        }),
        ("html", vec![Rule::plain(HTML_BLOCK)]),
        ("css", vec![Rule::plain(SLASH_BLOCK)]),
    ])
});

/// Rules for a normalized extension key, or `None` if unsupported.
pub(crate) fn rules_for(key: &str) -> Option<&'static [Rule]> {
    PATTERN_TABLE.get(key).map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_the_closed_extension_set() {
        let expected = [
            "py", "r", "c", "cpp", "java", "js", "ts", "rs", "php", "html", "css",
        ];
        for ext in expected {
            assert!(rules_for(ext).is_some(), "missing rules for {ext}");
        }
        assert_eq!(PATTERN_TABLE.len(), expected.len());
    }

    #[test]
    fn rule_counts_and_order_match_the_grammar() {
        assert_eq!(rules_for("py").unwrap().len(), 3);
        assert_eq!(rules_for("r").unwrap().len(), 1);
        assert_eq!(rules_for("php").unwrap().len(), 3);
        assert_eq!(rules_for("html").unwrap().len(), 1);
        assert_eq!(rules_for("css").unwrap().len(), 1);
        for ext in ["c", "cpp", "java", "js", "ts", "rs"] {
            assert_eq!(rules_for(ext).unwrap().len(), 2, "{ext}");
        }
    }

    #[test]
    fn only_line_slash_rules_carry_the_colon_guard() {
        for (ext, rules) in PATTERN_TABLE.iter() {
            for rule in rules {
                let guarded = rule.guard == Guard::NotAfterColon;
                let is_slash_line = rule.pattern.as_str() == SLASH_LINE;
                assert_eq!(guarded, is_slash_line, "{ext}: {}", rule.pattern.as_str());
            }
        }
    }

    #[test]
    fn lookup_is_exact_no_dots_no_uppercase() {
        assert!(rules_for(".py").is_none());
        assert!(rules_for("PY").is_none());
        assert!(rules_for("xyz").is_none());
    }
}
