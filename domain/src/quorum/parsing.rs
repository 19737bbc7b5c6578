//! Response validation for structured model output.
//!
//! [`ResponseValidator`] turns raw model text into an [`Outcome`]. It is
//! pure domain logic: no I/O, no retries, no provider knowledge.
//!
//! # Recovery pass
//!
//! Models wrap JSON in prose or Markdown fences often enough that strict
//! parsing alone would discard usable answers. Before failing, the validator
//! tries, in order:
//!
//! | Step | Input |
//! |------|-------|
//! | 1 | The trimmed response |
//! | 2 | The response with a surrounding code fence removed |
//! | 3 | The first balanced `{...}` object embedded anywhere in the text |
//!
//! Recovery only ever locates an object. Field values are never guessed;
//! a missing or unrecognized enum value is a [`ValidationReason`].

use super::outcome::Outcome;
use super::response::{StructuredResponse, ValidationReason};
use serde_json::{Map, Value};

/// Validates raw model output against a [`StructuredResponse`] contract
pub struct ResponseValidator;

impl ResponseValidator {
    /// Validate a raw response
    ///
    /// # Examples
    ///
    /// ```
    /// use assembly_domain::quorum::{Outcome, ResponseValidator, ValidationReason, VoteChoice, VoteResponse};
    ///
    /// let ok: Outcome<VoteResponse> =
    ///     ResponseValidator::validate(r#"{"vote":"YES","statement":"We support this."}"#);
    /// assert_eq!(ok.success().unwrap().vote, VoteChoice::Yes);
    ///
    /// let bad: Outcome<VoteResponse> = ResponseValidator::validate("not valid json at all");
    /// assert!(matches!(bad, Outcome::ValidationFailure { reason: ValidationReason::NotParseable, .. }));
    /// ```
    pub fn validate<T: StructuredResponse>(raw: &str) -> Outcome<T> {
        let Some(object) = Self::extract_object(raw) else {
            return Outcome::validation_failure(raw, ValidationReason::NotParseable);
        };

        match T::from_object(&object) {
            Ok(payload) => Outcome::Success(payload),
            Err(reason) => Outcome::validation_failure(raw, reason),
        }
    }

    /// Locate the JSON object in a raw response, if any
    pub fn extract_object(raw: &str) -> Option<Map<String, Value>> {
        let trimmed = raw.trim();

        if let Some(object) = parse_object(trimmed) {
            return Some(object);
        }

        if let Some(inner) = strip_code_fence(trimmed)
            && let Some(object) = parse_object(inner)
        {
            return Some(object);
        }

        first_embedded_object(trimmed)
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` line and a trailing fence
fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let body = body.trim_end();
    Some(body.strip_suffix("```").unwrap_or(body).trim())
}

/// Scan for the first `{` whose balanced span parses as a JSON object
fn first_embedded_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let end = balanced_end(&text[start..])?;
            parse_object(&text[start..start + end])
        })
}

/// Byte length of the balanced object starting at `text[0] == '{'`
///
/// Braces inside string literals (including escaped quotes) are ignored.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
