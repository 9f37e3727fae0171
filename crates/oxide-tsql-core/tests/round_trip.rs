//! Property tests: any parsed text renders back byte for byte.

use oxide_tsql_core::ast::SyntaxNode;
use oxide_tsql_core::lexer::Keyword;
use oxide_tsql_core::{parse_expression, parse_script};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}".prop_filter("keywords are not names", |s| {
        Keyword::from_str(s).is_none()
    })
}

fn comment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,8}".prop_map(|text| format!("/*{text}*/")),
        "[a-z ]{0,8}".prop_map(|text| format!("--{text}\n")),
    ]
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        identifier(),
        "[0-9]{1,4}",
        "[a-z ]{0,5}".prop_map(|text| format!("'{text}'")),
        "[a-z]{1,5}".prop_map(|name| format!("@{name}")),
    ]
}

fn expression(operators: &'static [&'static str]) -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 32, 2, move |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(operators), inner.clone())
                .prop_map(|(left, op, right)| format!("{left} {op} {right}")),
            inner.clone().prop_map(|e| format!("({e})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            (identifier(), inner.clone()).prop_map(|(f, e)| format!("{f}({e})")),
            (inner, comment()).prop_map(|(e, c)| format!("{e} {c}")),
        ]
    })
}

const ALL_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "<>", "<", ">=", "and", "or",
];

const ARITHMETIC: &[&str] = &["+", "-", "*", "/", "%"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn expressions_round_trip(text in expression(ALL_OPERATORS)) {
        let expr = parse_expression(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(expr.to_source(), text);
        let clean = expr.to_clean_string();
        prop_assert!(!clean.contains("/*"));
        prop_assert!(!clean.contains("--"));
    }

    #[test]
    fn scripts_round_trip(values in prop::collection::vec(expression(ARITHMETIC), 1..5)) {
        let text: String = values
            .iter()
            .enumerate()
            .map(|(i, value)| format!("set @v{i} = {value};\n"))
            .collect();
        let list = parse_script(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(list.len(), values.len());
        prop_assert_eq!(list.to_source(), text);
    }
}
