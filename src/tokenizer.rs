use std::sync::LazyLock;

use regex::Regex;

static BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()]|\s+").expect("token boundary pattern"));
static AND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(?i:and)\s").expect("AND pattern"));
static OR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s(?i:or)\s").expect("OR pattern"));
static EQUALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(!?=)\s*").expect("equals pattern"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// A filter string together with its token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    raw: String,
    tokens: Vec<String>,
}

impl FilterExpression {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            tokens: split_unquoted_space(raw),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens joined by single spaces; equivalent to `raw` as a query.
    pub fn canonical(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Splits a filter on whitespace and parentheses, keeping quoted values such as
/// `scientific_name="Taeniopygia guttata"` in one token.
pub fn split_unquoted_space(s: &str) -> Vec<String> {
    if !s.chars().any(char::is_whitespace) {
        return vec![s.to_string()];
    }

    let mut pieces = split_on_boundaries(s).into_iter();
    let mut tokens = Vec::new();
    while let Some(mut token) = pieces.next() {
        if let Some(quote) = token.chars().find(|ch| *ch == '"' || *ch == '\'') {
            while has_unmatched_quote(&token, quote) {
                let Some(next) = pieces.next() else {
                    break;
                };
                token.push(' ');
                token.push_str(&next);
            }
        }
        tokens.push(token);
    }
    tokens
}

fn split_on_boundaries(s: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for boundary in BOUNDARY_RE.find_iter(s) {
        let before = &s[last..boundary.start()];
        if !before.is_empty() {
            pieces.push(before.to_string());
        }
        if !boundary.as_str().trim().is_empty() {
            pieces.push(boundary.as_str().to_string());
        }
        last = boundary.end();
    }
    if last < s.len() {
        pieces.push(s[last..].to_string());
    }
    pieces
}

fn has_unmatched_quote(token: &str, quote: char) -> bool {
    token.matches(quote).count() % 2 == 1
}

/// Normalizes operator case (` and ` to ` AND `, ` or ` to ` OR `) and drops whitespace
/// around `=` and `!=`.
pub fn format_expression(expression: &str) -> String {
    let expression = AND_RE.replace_all(expression, " AND ");
    let expression = OR_RE.replace_all(&expression, " OR ");
    EQUALS_RE.replace_all(&expression, "${1}").into_owned()
}

pub fn split_on_first_equal_sign(token: &str) -> Vec<String> {
    match token.split_once('=') {
        Some((field, value)) => vec![field.to_string(), value.to_string()],
        None => vec![token.to_string()],
    }
}

pub fn combine_expression_parts(parts: &[Vec<String>]) -> String {
    let joined = parts
        .iter()
        .map(|part| part.join("="))
        .collect::<Vec<_>>()
        .join(" ");
    WHITESPACE_RE.replace_all(&joined, " ").into_owned()
}

pub fn count_parentheses(s: &str) -> (usize, usize) {
    let open = s.chars().filter(|ch| *ch == '(').count();
    let close = s.chars().filter(|ch| *ch == ')').count();
    (open, close)
}
