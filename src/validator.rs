use std::sync::LazyLock;

use regex::Regex;

use crate::error::FilterError;
use crate::tokenizer::{count_parentheses, split_unquoted_space};

// Field names are lower case with underscores; unquoted values are alphanumeric plus `._-`.
static CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_]+!?=[A-Za-z0-9._-]+$").expect("condition pattern")
});
static QUOTED_CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[a-z_]+!?=(?:"[A-Za-z0-9._ -]+"|'[A-Za-z0-9._ -]+')$"#)
        .expect("quoted condition pattern")
});
static EMPTY_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("empty group pattern"));

/// Checks a filter expression and returns every problem found, in order.
///
/// An empty list means the expression is valid. The check is a pure function of the
/// string so an editor can rerun it after every keystroke. Callers usually pass the
/// output of [`crate::tokenizer::format_expression`].
pub fn validate_expression(expression: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if expression.trim().is_empty() {
        return errors;
    }

    if !parentheses_balanced(expression) {
        errors.push("Error: Unbalanced parentheses.".to_string());
    }
    if EMPTY_GROUP_RE.is_match(expression) {
        errors.push("Error: Parentheses without content.".to_string());
    }

    let ungrouped = expression.replace(['(', ')'], " ");
    let tokens: Vec<String> = split_unquoted_space(ungrouped.trim())
        .into_iter()
        .filter(|token| !token.is_empty())
        .collect();
    errors.extend(check_alternation(&tokens));
    errors
}

/// Same check, surfaced as an error for callers that stop on the first invalid filter.
pub fn ensure_valid(expression: &str) -> Result<(), FilterError> {
    let errors = validate_expression(expression);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(FilterError::InvalidExpression(errors))
    }
}

fn parentheses_balanced(expression: &str) -> bool {
    let (open, close) = count_parentheses(expression);
    if open != close {
        return false;
    }
    let mut depth = 0i64;
    for ch in expression.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn is_condition(token: &str) -> bool {
    CONDITION_RE.is_match(token) || QUOTED_CONDITION_RE.is_match(token)
}

fn check_alternation(tokens: &[String]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut prev_was_condition = false;
    for token in tokens {
        if is_condition(token) {
            if prev_was_condition {
                errors.push(format!("Error: Missing operator before '{token}'."));
            }
            prev_was_condition = true;
        } else if token == "AND" || token == "OR" {
            if !prev_was_condition {
                errors.push(format!(
                    "Error: Operator '{token}' must be between conditions."
                ));
            }
            prev_was_condition = false;
        } else {
            errors.push(format!("Error: Invalid expression '{token}'."));
        }
    }
    if !prev_was_condition {
        errors.push("Error: Expression must end with a valid condition.".to_string());
    }
    errors
}
