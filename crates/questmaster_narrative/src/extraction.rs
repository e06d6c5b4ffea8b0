//! Utilities for extracting structured content from oracle replies.
//!
//! Replies often wrap JSON or PDDL in markdown code fences or surround it
//! with prose. Failures here are validation failures of the oracle output,
//! so they are reported as [`ModelError`]s.

use questmaster_error::{ModelError, ModelErrorKind};
use regex::Regex;
use std::str::CharIndices;
use std::sync::LazyLock;

/// Extract a JSON object from a reply that may contain markdown or extra text.
///
/// A fenced block tagged `json` wins, then the first fenced block, then the
/// first balanced object anywhere in the reply.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::extract_json;
///
/// let reply = "Here is the domain:\n```json\n{\"domain_name\": \"cave\"}\n```\n";
/// assert_eq!(extract_json(reply).unwrap(), "{\"domain_name\": \"cave\"}");
/// ```
pub fn extract_json(response: &str) -> Result<String, ModelError> {
    let blocks = fenced_blocks(response);
    let fenced = blocks
        .iter()
        .find(|block| block.tag.eq_ignore_ascii_case("json"))
        .or(blocks.first())
        .and_then(|block| balanced(block.body, Syntax::Json));

    if let Some(json) = fenced.or_else(|| balanced(response, Syntax::Json)) {
        return Ok(json.to_string());
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON object found in oracle reply"
    );
    Err(ModelError::new(ModelErrorKind::MalformedJson(format!(
        "no JSON object found in reply ({} bytes)",
        response.len()
    ))))
}

/// Extract a PDDL `(define ...)` form from a reply.
///
/// `;` comments inside the form may hold unbalanced parentheses.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::extract_pddl;
///
/// let reply = "Fixed:\n```pddl\n(define (domain d) (:predicates (p)))\n```";
/// assert_eq!(extract_pddl(reply).unwrap(), "(define (domain d) (:predicates (p)))");
/// ```
pub fn extract_pddl(response: &str) -> Result<String, ModelError> {
    let text = strip_code_fences(response);
    let malformed = |message: &str| {
        ModelError::new(ModelErrorKind::MalformedPddl {
            field: "reply".to_string(),
            message: message.to_string(),
        })
    };

    let start = text
        .find("(define")
        .ok_or_else(|| malformed("no (define ...) form found"))?;
    balanced(&text[start..], Syntax::Pddl)
        .map(str::to_string)
        .ok_or_else(|| malformed("unbalanced parentheses in (define ...) form"))
}

/// Removes markdown fence lines (```` ``` ```` with an optional language tag).
pub fn strip_code_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// `1. text`, `2) text`, `**3.** text`
static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*)?\d+[.)](?:\*\*)?\s+(.+?)\s*$").expect("Valid option regex")
});

/// Numbered list items of a reply, in order, without their numbers.
///
/// # Examples
///
/// ```
/// use questmaster_narrative::extract_options;
///
/// let reply = "Here are your options:\n1. Enter the cave\n2. Wait for dawn\n\nWhich action?";
/// assert_eq!(extract_options(reply), vec!["Enter the cave", "Wait for dawn"]);
/// ```
pub fn extract_options(response: &str) -> Vec<String> {
    response
        .lines()
        .filter_map(|line| OPTION.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

struct FencedBlock<'a> {
    tag: &'a str,
    body: &'a str,
}

/// Every ```` ``` ```` block in order. An unclosed fence runs to the end of
/// the reply, which is what a truncated reply looks like.
fn fenced_blocks(response: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut rest = response;

    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let first_line = after[..line_end].trim();
        let (tag, body) = if first_line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            (first_line, &after[line_end..])
        } else {
            ("", after)
        };

        match body.find("```") {
            Some(close) => {
                blocks.push(FencedBlock {
                    tag,
                    body: body[..close].trim(),
                });
                rest = &body[close + 3..];
            }
            None => {
                blocks.push(FencedBlock {
                    tag,
                    body: body.trim(),
                });
                break;
            }
        }
    }
    blocks
}

#[derive(Debug, Clone, Copy)]
enum Syntax {
    /// `{}` objects; delimiters inside `"..."` strings do not count
    Json,
    /// `()` forms; delimiters inside `;` line comments do not count
    Pddl,
}

/// The first `{...}` or `(...)` span of `text` with its delimiters matched.
fn balanced(text: &str, syntax: Syntax) -> Option<&str> {
    let (open, close) = match syntax {
        Syntax::Json => ('{', '}'),
        Syntax::Pddl => ('(', ')'),
    };
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut chars = text[start..].char_indices();

    while let Some((i, ch)) = chars.next() {
        match (syntax, ch) {
            (Syntax::Json, '"') => skip_string(&mut chars),
            (Syntax::Pddl, ';') => {
                chars.by_ref().find(|(_, c)| *c == '\n');
            }
            _ if ch == open => depth += 1,
            _ if ch == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Advances past the closing quote of a JSON string.
fn skip_string(chars: &mut CharIndices<'_>) {
    while let Some((_, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '"' => return,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = "Sure!\n```json\n{\"a\": {\"b\": 1}}\n```\nAnything else?";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_extract_json_ignores_braces_in_strings() {
        let response = r#"{"goal": ["(has hero key})"], "x": 1} trailing"#;
        assert_eq!(
            extract_json(response).unwrap(),
            r#"{"goal": ["(has hero key})"], "x": 1}"#
        );
    }

    #[test]
    fn test_extract_json_without_fence() {
        let response = "The problem is {\"problem_name\": \"p\"}.";
        assert_eq!(extract_json(response).unwrap(), "{\"problem_name\": \"p\"}");
    }

    #[test]
    fn test_extract_json_fails_on_prose() {
        assert!(extract_json("I cannot do that.").is_err());
    }

    #[test]
    fn test_extract_pddl_skips_leading_prose() {
        let response = "Here you go (corrected):\n(define (problem p)\n  (:domain d))\nDone.";
        assert_eq!(
            extract_pddl(response).unwrap(),
            "(define (problem p)\n  (:domain d))"
        );
    }

    #[test]
    fn test_extract_pddl_rejects_truncated_form() {
        assert!(extract_pddl("(define (domain d) (:predicates").is_err());
    }

    #[test]
    fn test_extract_pddl_ignores_parens_in_comments() {
        let response = "(define (domain d) ; the ) closes nothing\n  (:predicates (p)))";
        assert_eq!(extract_pddl(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_prefers_json_fence() {
        let response = "```text\n{\"note\": 1}\n```\n```json\n{\"domain_name\": \"cave\"}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"domain_name\": \"cave\"}");
    }

    #[test]
    fn test_extract_json_from_truncated_fence() {
        let response = "```json\n{\"a\": \"}\\\"\"}\n";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": \"}\\\"\"}");
    }

    #[test]
    fn test_extract_options_skips_prose() {
        let reply = "Here are your options:\n**1.** Draw the sword → fight\n2) Flee\nSection 3 is far.\n";
        assert_eq!(extract_options(reply), vec!["Draw the sword → fight", "Flee"]);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```lisp\n(a)\n```"), "(a)");
    }
}
