//! Error reporting tests.

mod common;
use common::*;

use oxide_tsql_core::ast::{CreateProcedureStmt, IfStmt};
use oxide_tsql_core::{
    Error, Parser, ParserOptions, parse_expression, parse_script, parse_statement,
    parse_statement_as,
};

#[test]
fn error_missing_end() {
    let err = parse_err("BEGIN a = 1");
    assert!(syntax_message(&err).starts_with("missing END"));
}

#[test]
fn error_empty_input() {
    let err = parse_err("");
    assert_eq!(syntax_message(&err), "expected statement, found end of input");
}

#[test]
fn error_trailing_input() {
    let err = parse_expr_err("1 2");
    assert_eq!(syntax_message(&err), "expected end of input, found '2'");
}

#[test]
fn error_unterminated_string() {
    let err = parse_err("select 'abc");
    assert!(syntax_message(&err).contains("Unterminated string literal"));
}

#[test]
fn error_reports_position_and_context() {
    let err = parse_expr_err("1 + ) x");
    let syntax = err.as_syntax().unwrap();
    assert_eq!(syntax.span.start, 4);
    assert_eq!(syntax.near, ") x");
    assert!(err.to_string().ends_with("near ') x'"));
}

#[test]
fn error_unclosed_paren() {
    assert!(parse_expr_err("(1 + 2").as_syntax().is_some());
}

#[test]
fn error_stray_end() {
    let err = parse_err("end");
    assert!(syntax_message(&err).contains("unexpected"));
}

#[test]
fn error_clr_procedure_unsupported() {
    let err = parse_statement("create procedure p as external name a.b.c").unwrap_err();
    assert!(matches!(err, Error::Unsupported(_)));
    assert_eq!(err.to_string(), "CLR routine is not supported");
}

#[test]
fn error_variant_mismatch() {
    let err = parse_statement_as::<IfStmt>("select 1").unwrap_err();
    let Error::TypeMismatch { expected, found } = err else {
        panic!("expected type mismatch, got {err:?}");
    };
    assert_eq!(expected, "IfStmt");
    assert_eq!(found, "ExpressionStmt");
}

#[test]
fn error_variant_match() {
    assert!(parse_statement_as::<CreateProcedureStmt>("create proc p as return").is_ok());
}

#[test]
fn error_nesting_too_deep() {
    let text = format!("{}print 1", "if 1 = 1 ".repeat(20));
    let mut parser = Parser::new(&text).with_options(ParserOptions { max_depth: 8 });
    let err = parser.parse_statement().unwrap_err();
    assert!(syntax_message(&err).contains("nesting too deep"));

    let mut parser = Parser::new(&text);
    assert!(parser.parse_statement().is_ok());
}

#[test]
fn error_clause_word_is_not_a_statement() {
    for sql in ["where a = 1", "from t", "then 1", "x = 1"] {
        let err = parse_err(sql);
        assert!(
            syntax_message(&err).starts_with("expected statement, found"),
            "{sql}: {err}"
        );
    }
}

/// Parses `text` on a thread with the default test stack size.
fn parse_on_small_stack(text: String, script: bool) -> Result<(), String> {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let result = if script {
                parse_script(&text).map(|_| ())
            } else {
                parse_expression(&text).map(|_| ())
            };
            result.map_err(|err| err.to_string())
        })
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn error_deep_case_fails_before_stack_runs_out() {
    let depth = 250;
    let text = format!(
        "{}1{}",
        "case when 1 = 1 then ".repeat(depth),
        " end".repeat(depth)
    );
    let err = parse_on_small_stack(text, false).unwrap_err();
    assert!(err.contains("nesting too deep"), "{err}");
}

#[test]
fn error_deep_statements_fail_before_stack_runs_out() {
    let text = format!("{}print 1", "while 1 = 1 begin if 1 = 1 ".repeat(200));
    let err = parse_on_small_stack(text, true).unwrap_err();
    assert!(err.contains("nesting too deep"), "{err}");
}

#[test]
fn deep_parentheses_parse_on_small_stack() {
    let depth = 250;
    let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert!(parse_on_small_stack(text, false).is_ok());
}
