//! Tests for statement parsing and the end-to-end scenarios.

mod common;
use common::*;

use oxide_tsql_core::ast::{
    BlockStmt, DeclareCursorStmt, DeclareStmt, IfStmt, SetVariableStmt, Stmt, SyntaxNode,
    TryCatchStmt, WhileStmt,
};
use oxide_tsql_core::{Expr, parse_script};

#[test]
fn select_statement() {
    let Stmt::Expression(stmt) = parse("select 1") else {
        panic!("expected expression statement");
    };
    let Expr::Select(select) = stmt.expr() else {
        panic!("expected SELECT");
    };
    assert_eq!(select.columns().len(), 1);
    assert!(select.from().is_none());
    assert!(select.where_clause().is_none());
    assert!(!stmt.has_terminator());
}

#[test]
fn set_variable_with_terminator() {
    let set = parse_as::<SetVariableStmt>("set @x = 1 + 2;");
    assert_eq!(set.variable().text(), "@x");
    let Expr::Binary(value) = set.value() else {
        panic!("expected binary value");
    };
    assert_eq!(value.operator().text(), "+");
    assert_eq!(value.to_source().trim(), "1 + 2");
    assert!(set.to_source().ends_with(';'));
}

#[test]
fn set_compound_assignment() {
    let set = parse_as::<SetVariableStmt>("set @total *= @rate");
    assert_eq!(set.operator().text(), "*=");
}

#[test]
fn if_else_with_returns() {
    let stmt = parse_as::<IfStmt>("if @x > 0 return 1 else return 0");
    assert!(stmt.has_else());
    let Stmt::Return(then) = stmt.then() else {
        panic!("expected RETURN in THEN");
    };
    assert_eq!(then.value().map(|v| v.to_source()).as_deref().map(str::trim), Some("1"));
    let Some(Stmt::Return(otherwise)) = stmt.else_branch() else {
        panic!("expected RETURN in ELSE");
    };
    assert_eq!(otherwise.value().map(|v| v.to_source()).as_deref(), Some("0"));
}

#[test]
fn declare_two_variables() {
    let declare = parse_as::<DeclareStmt>("declare @x int, @y varchar(10) = 'a'");
    let variables = declare.variables();
    assert_eq!(variables.len(), 2);
    assert!(variables[0].value().is_none());
    assert_eq!(variables[1].data_type().name(), "varchar");
    assert_eq!(
        variables[1].value().map(|v| v.to_source()).as_deref().map(str::trim),
        Some("'a'")
    );
}

#[test]
fn declare_cursor() {
    let cursor = parse_as::<DeclareCursorStmt>(
        "declare c cursor fast_forward for select id from t where x = 1 order by id",
    );
    assert_eq!(cursor.name().text(), "c");
    assert!(matches!(cursor.query(), Expr::OrderBy(_)));
    assert!(!cursor.is_for_update());
}

#[test]
fn nested_blocks() {
    let block = parse_as::<BlockStmt>(
        "begin\n  declare @i int = 0;\n  while @i < 3\n  begin\n    set @i = @i + 1;\n  end\nend",
    );
    assert_eq!(block.body().len(), 2);
    let Stmt::While(_) = &block.body().statements()[1] else {
        panic!("expected WHILE");
    };
}

#[test]
fn while_loop_with_break() {
    let stmt = parse_as::<WhileStmt>("while 1 = 1 begin if @@fetch_status <> 0 break end");
    let Stmt::Block(body) = stmt.body() else {
        panic!("expected block body");
    };
    assert!(matches!(body.body().statements()[0], Stmt::If(_)));
}

#[test]
fn try_catch_with_transaction() {
    let stmt = parse_as::<TryCatchStmt>(
        "begin try\n  begin tran;\n  update t set a = 1;\n  commit;\nend try\nbegin catch\n  rollback;\n  throw;\nend catch",
    );
    assert_eq!(stmt.try_body().len(), 3);
    assert!(matches!(stmt.try_body().statements()[0], Stmt::BeginTransaction(_)));
    assert_eq!(stmt.catch_body().len(), 2);
}

#[test]
fn unmodeled_statements_keep_tokens() {
    let Stmt::Unmodeled(stmt) = parse("exec dbo.p @a = 1, @b = 'x';") else {
        panic!("expected unmodeled");
    };
    assert_eq!(stmt.leading_keyword(), "EXEC");
    assert_eq!(stmt.tokens()[0].text(), "exec");
    assert_eq!(stmt.tokens().last().map(|t| t.text()), Some("'x'"));
}

#[test]
fn unterminated_statements_stay_separate() {
    let list = parse_script("print 'a'\nprint 'b'\ninsert into t values (1)\nupdate t set a = 2").unwrap();
    assert_eq!(list.len(), 4);
    let texts: Vec<String> = list.iter().map(SyntaxNode::to_clean_string).collect();
    assert_eq!(
        texts,
        ["print 'a'", "print 'b'", "insert into t values (1)", "update t set a = 2"]
    );
}

#[test]
fn insert_select_is_one_statement() {
    let list = parse_script("insert into t (a) select b from s where c = 1 print 'done'").unwrap();
    assert_eq!(list.len(), 2);
    let Stmt::Unmodeled(insert) = &list.statements()[0] else {
        panic!("expected unmodeled INSERT");
    };
    assert_eq!(insert.tokens().last().map(|t| t.text()), Some("1"));
}

#[test]
fn begin_dialog_is_not_a_block() {
    let Stmt::Unmodeled(stmt) = parse("begin dialog @h from service a to service 'b'") else {
        panic!("expected unmodeled");
    };
    assert_eq!(stmt.leading_keyword(), "BEGIN");
}

#[test]
fn script_with_labels_and_goto() {
    let list = parse_script("declare @n int = 0;\nagain:\nset @n += 1;\nif @n < 5 goto again;\nprint @n").unwrap();
    let kinds: Vec<&str> = list.iter().map(SyntaxNode::kind_name).collect();
    assert_eq!(
        kinds,
        ["DeclareStmt", "LabelStmt", "SetVariableStmt", "IfStmt", "UnmodeledStmt"]
    );
}

#[test]
fn set_options() {
    let Stmt::SetOption(stmt) = parse("set transaction isolation level read committed") else {
        panic!("expected SET option");
    };
    assert_eq!(stmt.options()[0].text(), "transaction");
    assert_eq!(stmt.value().len(), 4);
}

#[test]
fn block_statements_round_trip() {
    round_trip("begin -- start\n  select a , b from t ; /* done */\nend ;\n");
    round_trip("if exists (select 1 from t)\n  delete from t\nelse\n  print 'empty'");
}

#[test]
fn clean_rendering_drops_comments() {
    let stmt = parse("select  a,\n  b -- cols\nfrom   t /* tbl */");
    assert_eq!(stmt.to_clean_string(), "select a, b from t");
}
