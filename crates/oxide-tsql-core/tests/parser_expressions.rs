//! Tests for the expression engine: precedence, negated forms and queries.

mod common;
use common::*;

use oxide_tsql_core::ast::SyntaxNode;
use oxide_tsql_core::lexer::Keyword;
use oxide_tsql_core::Expr;

#[test]
fn precedence_multiplication_over_addition() {
    let Expr::Binary(root) = parse_expr("a + b * c") else {
        panic!("expected binary");
    };
    assert_eq!(root.operator().text(), "+");
    assert_eq!(root.left().to_source().trim(), "a");
    let Expr::Binary(product) = root.right() else {
        panic!("expected product on the right");
    };
    assert_eq!(product.operator().text(), "*");
}

#[test]
fn precedence_parens_override() {
    let Expr::Binary(root) = parse_expr("(a + b) * c") else {
        panic!("expected binary");
    };
    assert_eq!(root.operator().text(), "*");
    assert!(matches!(root.left(), Expr::Paren(_)));
}

#[test]
fn precedence_comparison_over_logical() {
    let Expr::Binary(root) = parse_expr("a < 1 and b >= 2 or not c <> 3") else {
        panic!("expected binary");
    };
    assert!(root.operator().is_keyword(Keyword::Or));
    assert!(root.is_logical());
    let Expr::Unary(not) = root.right() else {
        panic!("expected NOT");
    };
    assert!(matches!(not.operand(), Expr::Binary(b) if b.is_comparison()));
}

#[test]
fn comparison_chain_is_left_associative() {
    let Expr::Binary(root) = parse_expr("a = b = c") else {
        panic!("expected binary");
    };
    assert!(root.is_comparison());
    assert!(matches!(root.left(), Expr::Binary(_)));
}

#[test]
fn assignment_chain_rejected_in_select_list() {
    let err = parse_err("select a = b = c");
    assert!(syntax_message(&err).contains("assignment target must be a name"));
}

#[test]
fn not_between_is_negated_node() {
    let Expr::Between(between) = parse_expr("a not between 1 and 2") else {
        panic!("expected BETWEEN");
    };
    assert!(between.is_not());
    assert_eq!(between.low().to_source().trim(), "1");
    assert_eq!(between.high().to_source().trim(), "2");
}

#[test]
fn not_like_is_negated_node() {
    let Expr::Like(like) = parse_expr("a not like 'x%' escape '!'") else {
        panic!("expected LIKE");
    };
    assert!(like.is_not());
    assert!(like.escape().is_some());
}

#[test]
fn not_in_is_negated_node() {
    let Expr::In(in_expr) = parse_expr("a not in (1,2)") else {
        panic!("expected IN");
    };
    assert!(in_expr.is_not());
    assert_eq!(in_expr.values().items().len(), 2);
}

#[test]
fn plain_forms_are_not_negated() {
    let Expr::Between(between) = parse_expr("a between 1 and 2") else {
        panic!("expected BETWEEN");
    };
    assert!(!between.is_not());
    let Expr::In(in_expr) = parse_expr("a in (1)") else {
        panic!("expected IN");
    };
    assert!(!in_expr.is_not());
}

#[test]
fn is_null_shape_tracks_not() {
    let Expr::IsNull(with_not) = parse_expr("a is not null") else {
        panic!("expected IS NULL");
    };
    let Expr::IsNull(without_not) = parse_expr("a is null") else {
        panic!("expected IS NULL");
    };
    assert!(with_not.is_not());
    assert!(!without_not.is_not());
    assert_eq!(with_not.children().len(), 4);
    assert_eq!(without_not.children().len(), 3);
    assert!(with_not.null_token().is_keyword(Keyword::Null));
    assert!(without_not.null_token().is_keyword(Keyword::Null));
}

#[test]
fn simple_and_searched_case() {
    let Expr::Case(simple) = parse_expr("case x when 1 then 'a' when 2 then 'b' end") else {
        panic!("expected CASE");
    };
    assert!(simple.is_simple_case());
    assert!(!simple.has_else());
    assert_eq!(simple.whens().len(), 2);

    let Expr::Case(searched) = parse_expr("case when x = 1 then 'a' else 'b' end") else {
        panic!("expected CASE");
    };
    assert!(!searched.is_simple_case());
    assert!(searched.has_else());
}

#[test]
fn select_one() {
    let select = parse_select("select 1");
    assert_eq!(select.columns().len(), 1);
    assert!(select.from().is_none());
    assert!(select.where_clause().is_none());
}

#[test]
fn select_with_subquery_and_exists() {
    let select = parse_select(
        "select a, (select max(b) from u where u.id = t.id) as m from t where exists (select 1 from v)",
    );
    assert_eq!(select.columns().len(), 2);
    let Some(Expr::Call(exists)) = select.where_clause() else {
        panic!("expected EXISTS call");
    };
    assert_eq!(exists.function_name().as_deref(), Some("exists"));
}

#[test]
fn set_operators_are_left_associative() {
    let Expr::SetOperation(outer) = parse_expr("select 1 union select 2 except select 3") else {
        panic!("expected set operation");
    };
    assert!(outer.operator().is_keyword(Keyword::Except));
    assert!(matches!(outer.left(), Expr::SetOperation(_)));
}

#[test]
fn window_function() {
    let Expr::Alias(alias) =
        parse_select("select sum(x) over (partition by a, b order by c) total from t").columns()[0].clone()
    else {
        panic!("expected alias");
    };
    let Expr::Window(window) = alias.operand() else {
        panic!("expected window");
    };
    assert!(matches!(window.over().partition_by(), Some(Expr::List(_))));
    assert!(window.over().order_by().is_some());
    assert!(window.over().frame().is_none());
}

#[test]
fn convert_with_style_is_a_call() {
    let Expr::Call(call) = parse_expr("convert(varchar(10), @d, 120)") else {
        panic!("expected call");
    };
    assert_eq!(call.arguments().len(), 3);
}

#[test]
fn cast_to_sized_type() {
    let Expr::Cast(cast) = parse_expr("cast(@v as nvarchar(max))") else {
        panic!("expected cast");
    };
    assert!(!cast.is_try());
    assert_eq!(cast.data_type().name(), "nvarchar");
}

#[test]
fn quoted_names_and_temp_tables() {
    let select = parse_select("select [order].[id], \"x\" from #tmp as [order]");
    assert_eq!(select.columns()[0].as_name().map(|n| n.name()).as_deref(), Some("order.id"));
    assert!(select.from().is_some());
}

#[test]
fn expression_round_trips_with_comments() {
    let sql = "a + /* mid */ b -- tail\n  * c";
    assert_eq!(parse_expr(sql).to_source(), sql);
    assert_eq!(parse_expr(sql).to_clean_string(), "a + b * c");
}
