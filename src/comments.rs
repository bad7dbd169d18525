//! The stripping core: apply an extension's comment rules as global delete
//! passes, then collapse blank lines.

use regex::Regex;
use thiserror::Error;

use crate::patterns::{Guard, Rule, rules_for};

/// The only failure the core can produce. Carries the extension exactly as
/// the caller supplied it, for user display.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StripError {
    #[error("Unsupported file type: {extension}")]
    UnsupportedExtension { extension: String },
}

/// Strip comments from `content` according to the grammar for `extension`,
/// then drop blank lines.
///
/// - `extension` is case-insensitive and may carry a leading dot.
/// - Each rule deletes every non-overlapping match from the text produced
///   by the previous rule; matches may span lines and are replaced with
///   nothing, so an inline block comment joins its neighbours.
/// - Lines that are empty after trimming are dropped; survivors are joined
///   with a single `\n`. No trailing newline.
///
/// The rules are plain patterns, not a lexer: comment markers inside string
/// literals are stripped too, and unbalanced block delimiters consume up to
/// the next closing delimiter with no error. The only error is an extension
/// outside the supported set.
pub fn strip_comments(content: &str, extension: &str) -> Result<String, StripError> {
    let key = normalize_extension(extension);
    let rules = rules_for(&key).ok_or_else(|| StripError::UnsupportedExtension {
        extension: extension.to_string(),
    })?;

    let mut text = content.to_string();
    for rule in rules {
        text = apply_rule(rule, &text);
    }

    Ok(collapse_blank_lines(&text))
}

/// Whether `extension` (case-insensitive, optional leading dot) selects a
/// comment grammar.
pub fn supported_extension(extension: &str) -> bool {
    rules_for(&normalize_extension(extension)).is_some()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn apply_rule(rule: &Rule, input: &str) -> String {
    match rule.guard {
        Guard::None => rule.pattern.replace_all(input, "").into_owned(),
        Guard::NotAfterColon => strip_unless_after_colon(&rule.pattern, input),
    }
}

/// Delete matches of `pattern` except where the character immediately
/// before the match is `:`. A skipped candidate advances the scan by one
/// character, not past the whole candidate, so overlapping candidates are
/// still considered (`a:///b` keeps `a:/`). Guarded patterns start with an
/// ASCII `/`, so the one-byte step stays on a char boundary.
fn strip_unless_after_colon(pattern: &Regex, input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut from = 0;

    while let Some(m) = pattern.find_at(input, from) {
        if input[..m.start()].ends_with(':') {
            from = m.start() + 1;
            continue;
        }
        out.push_str(&input[copied..m.start()]);
        copied = m.end();
        from = m.end();
    }

    out.push_str(&input[copied..]);
    out
}

fn collapse_blank_lines(text: &str) -> String {
    let kept: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_free_input_only_loses_blank_lines() {
        let all = [
            "py", "r", "c", "cpp", "java", "js", "ts", "rs", "php", "html", "css",
        ];
        for ext in all {
            let out = strip_comments("alpha\n\nbeta\n", ext).unwrap();
            assert_eq!(out, "alpha\nbeta", "{ext}");
        }
    }

    #[test]
    fn python_trailing_and_full_line_comments() {
        let out = strip_comments("code()  # trailing\n# full line\nx = 1\n", "py").unwrap();
        assert_eq!(out, "code()  \nx = 1");
    }

    #[test]
    fn python_docstrings_both_quote_styles() {
        let src = "def f():\n    \"\"\"multi\n    line\"\"\"\n    return 1\n'''also\ngone'''\ny = 2\n";
        let out = strip_comments(src, "py").unwrap();
        assert_eq!(out, "def f():\n    return 1\ny = 2");
    }

    #[test]
    fn python_unbalanced_triple_quote_is_left_alone() {
        // No closing delimiter, so the block rule finds nothing.
        let out = strip_comments("x = 1\n'''dangling\ny = 2\n", "py").unwrap();
        assert_eq!(out, "x = 1\n'''dangling\ny = 2");
    }

    #[test]
    fn cpp_scope_operator_survives_line_comment_removal() {
        let out = strip_comments("std::cout << 1; // show\n", "cpp").unwrap();
        assert_eq!(out, "std::cout << 1; ");
    }

    #[test]
    fn cpp_block_comment_spanning_lines_is_removed() {
        let out = strip_comments("/* a\nb */\nint x;\n", "cpp").unwrap();
        assert_eq!(out, "int x;");
    }

    #[test]
    fn inline_block_comment_joins_its_neighbours() {
        let out = strip_comments("int a = /* mid */ 1;\n", "c").unwrap();
        assert_eq!(out, "int a =  1;");
    }

    #[test]
    fn url_after_colon_is_not_a_comment() {
        let out = strip_comments("let u = https://x.test; // note\n", "rs").unwrap();
        assert_eq!(out, "let u = https://x.test; ");
    }

    #[test]
    fn guard_skips_one_character_only() {
        // Second slash pair is preceded by `/`, not `:`, so it still matches.
        let out = strip_comments("a:///b\n", "cpp").unwrap();
        assert_eq!(out, "a:/");
    }

    #[test]
    fn guard_also_fires_after_a_lone_colon() {
        // Known limitation: one character back is all the guard sees, so a
        // comment starting right after a single colon is kept too.
        let out = strip_comments("label://part\n", "c").unwrap();
        assert_eq!(out, "label://part");
    }

    #[test]
    fn comment_markers_inside_strings_are_stripped_anyway() {
        let out = strip_comments("s = \"# not a comment\"\n", "py").unwrap();
        assert_eq!(out, "s = \"");

        let out = strip_comments("let s = \"// inside\";\n", "rs").unwrap();
        assert_eq!(out, "let s = \"");
    }

    #[test]
    fn php_gets_hash_comments_on_top_of_c_rules() {
        let src = "$a = 1; // c\n$b = 2; # d\n/* e */\n$c = 3;\n";
        let out = strip_comments(src, "php").unwrap();
        assert_eq!(out, "$a = 1; \n$b = 2; \n$c = 3;");
    }

    #[test]
    fn html_block_comments_span_lines() {
        let src = "<p>hi</p>\n<!-- note\nspans -->\n<b>x</b>\n";
        let out = strip_comments(src, "html").unwrap();
        assert_eq!(out, "<p>hi</p>\n<b>x</b>");
    }

    #[test]
    fn css_inline_comment_and_blank_run_collapse() {
        let out = strip_comments("a{} /* note */ b{}\n\n\n", "css").unwrap();
        assert_eq!(out, "a{}  b{}");
    }

    #[test]
    fn r_hash_comments() {
        let out = strip_comments("x <- 1 # note\n\ny <- 2\n", "r").unwrap();
        assert_eq!(out, "x <- 1 \ny <- 2");
    }

    #[test]
    fn extension_lookup_is_case_and_dot_insensitive() {
        let src = "int x; // c\n";
        let plain = strip_comments(src, "cpp").unwrap();
        for spelling in [".cpp", "CPP", ".CPP", " cpp "] {
            assert_eq!(strip_comments(src, spelling).unwrap(), plain, "{spelling}");
        }
    }

    #[test]
    fn unsupported_extension_is_rejected_before_processing() {
        let err = strip_comments("anything // here\n", ".xyz").unwrap_err();
        assert_eq!(
            err,
            StripError::UnsupportedExtension {
                extension: ".xyz".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unsupported file type: .xyz");
    }

    #[test]
    fn empty_input_is_fine() {
        assert_eq!(strip_comments("", "py").unwrap(), "");
        assert_eq!(strip_comments("\n\n\n", "css").unwrap(), "");
    }

    #[test]
    fn supported_extension_normalizes_like_strip() {
        assert!(supported_extension(".Py"));
        assert!(supported_extension("rs"));
        assert!(!supported_extension(".xyz"));
        assert!(!supported_extension(""));
    }
}
