use ena_filter::tokenizer::{
    FilterExpression, combine_expression_parts, format_expression, split_on_first_equal_sign,
};
use ena_filter::validator::validate_expression;

#[test]
fn editor_round_trip_keeps_quoted_values() {
    let raw = r#"tax_id = 7165 and scientific_name = "Anopheles gambiae""#;
    let formatted = format_expression(raw);
    assert_eq!(formatted, r#"tax_id=7165 AND scientific_name="Anopheles gambiae""#);

    let expression = FilterExpression::parse(&formatted);
    assert_eq!(
        expression.tokens(),
        ["tax_id=7165", "AND", r#"scientific_name="Anopheles gambiae""#]
    );

    let parts: Vec<Vec<String>> = expression
        .tokens()
        .iter()
        .map(|token| split_on_first_equal_sign(token))
        .collect();
    assert_eq!(combine_expression_parts(&parts), formatted);
    assert!(validate_expression(&formatted).is_empty());
}

#[test]
fn grouped_expression_is_valid() {
    let expression = format_expression(
        "(instrument_platform=ILLUMINA or instrument_platform=OXFORD_NANOPORE) and tax_id=9606",
    );
    assert!(validate_expression(&expression).is_empty());
}

#[test]
fn invalid_expressions_report_every_problem() {
    let errors = validate_expression("(tax_id=1 AND ()");
    assert!(errors.contains(&"Error: Unbalanced parentheses.".to_string()));
    assert!(errors.contains(&"Error: Parentheses without content.".to_string()));
    assert!(errors.contains(&"Error: Expression must end with a valid condition.".to_string()));
}

#[test]
fn adjacent_conditions_need_an_operator() {
    assert_eq!(
        validate_expression("tax_id=1 tax_id=2"),
        vec!["Error: Missing operator before 'tax_id=2'."]
    );
}

#[test]
fn leading_operator_is_rejected() {
    let errors = validate_expression("OR tax_id=1");
    assert_eq!(errors[0], "Error: Operator 'OR' must be between conditions.");
}
