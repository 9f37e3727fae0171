//! Tree rewriting.
//!
//! A [`Visitor`] has one method per concrete node type. Each defaults to the
//! matching `walk_*` function, which visits the children and rebuilds the
//! node only when at least one child came back as a different instance.
//! Unchanged subtrees are returned as the original `Rc`, so an identity
//! visitor returns the input tree itself and callers can detect changes with
//! [`Expr::ptr_eq`] and [`Stmt::ptr_eq`].

use std::rc::Rc;

use tracing::warn;

use super::{
    AliasExpr, AssignmentExpr, BeginTransactionStmt, BetweenExpr, BinaryExpr, BlockStmt, CallExpr,
    CaseExpr, CastExpr, Clause, CollateExpr, CreateInlineFunctionStmt, CreateProcedureStmt,
    CreateScalarFunctionStmt, CreateTableFunctionStmt, CreateViewStmt, DataType,
    DeclareCursorStmt, DeclareStmt, EmptyStmt, Expr, ExprList, ExpressionStmt, FetchClause,
    FunctionSignature, GotoStmt, IfStmt, InExpr, IsNullExpr, JoinExpr, LabelStmt, LikeExpr,
    ListItem, LiteralExpr, MonoKeywordStmt, NameExpr, OffsetFetch, OrderByExpr, OverClause,
    ParamDecl, ParenExpr, QueryOptionExpr, RawTokens, ReturnStmt, SelectExpr, SeparatedList,
    SetOperationExpr, SetOptionStmt, SetVariableStmt, ShapeError, SortExpr, StatementList, Stmt,
    SyntaxNode, TableHintExpr, TableType, TopClause, TryCatchStmt, TypeName, UnaryExpr,
    UnmodeledStmt, VarDecl, WhenClause, WhileStmt, WindowExpr,
};
use crate::lexer::Token;

/// A tree rewriter.
///
/// Override the methods for the node types of interest and call the
/// matching `walk_*` function to keep descending.
pub trait Visitor {
    fn visit_expr(&mut self, expr: &Expr) -> Expr {
        expr.accept(self)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Stmt {
        stmt.accept(self)
    }

    fn visit_data_type(&mut self, data_type: &DataType) -> DataType {
        data_type.accept(self)
    }

    fn visit_statements(&mut self, list: &Rc<StatementList>) -> Rc<StatementList> {
        walk_statements(self, list)
    }

    fn visit_literal(&mut self, node: &Rc<LiteralExpr>) -> Expr {
        Expr::Literal(Rc::clone(node))
    }

    fn visit_name(&mut self, node: &Rc<NameExpr>) -> Expr {
        Expr::Name(Rc::clone(node))
    }

    fn visit_unary(&mut self, node: &Rc<UnaryExpr>) -> Expr {
        walk_unary(self, node)
    }

    fn visit_binary(&mut self, node: &Rc<BinaryExpr>) -> Expr {
        walk_binary(self, node)
    }

    fn visit_assignment(&mut self, node: &Rc<AssignmentExpr>) -> Expr {
        walk_assignment(self, node)
    }

    fn visit_is_null(&mut self, node: &Rc<IsNullExpr>) -> Expr {
        walk_is_null(self, node)
    }

    fn visit_like(&mut self, node: &Rc<LikeExpr>) -> Expr {
        walk_like(self, node)
    }

    fn visit_between(&mut self, node: &Rc<BetweenExpr>) -> Expr {
        walk_between(self, node)
    }

    fn visit_in(&mut self, node: &Rc<InExpr>) -> Expr {
        walk_in(self, node)
    }

    fn visit_paren(&mut self, node: &Rc<ParenExpr>) -> Expr {
        walk_paren(self, node)
    }

    fn visit_call(&mut self, node: &Rc<CallExpr>) -> Expr {
        walk_call(self, node)
    }

    fn visit_window(&mut self, node: &Rc<WindowExpr>) -> Expr {
        walk_window(self, node)
    }

    fn visit_cast(&mut self, node: &Rc<CastExpr>) -> Expr {
        walk_cast(self, node)
    }

    fn visit_case(&mut self, node: &Rc<CaseExpr>) -> Expr {
        walk_case(self, node)
    }

    fn visit_collate(&mut self, node: &Rc<CollateExpr>) -> Expr {
        walk_collate(self, node)
    }

    fn visit_list(&mut self, node: &Rc<ExprList>) -> Expr {
        walk_list(self, node)
    }

    fn visit_alias(&mut self, node: &Rc<AliasExpr>) -> Expr {
        walk_alias(self, node)
    }

    fn visit_sort(&mut self, node: &Rc<SortExpr>) -> Expr {
        walk_sort(self, node)
    }

    fn visit_join(&mut self, node: &Rc<JoinExpr>) -> Expr {
        walk_join(self, node)
    }

    fn visit_table_hint(&mut self, node: &Rc<TableHintExpr>) -> Expr {
        walk_table_hint(self, node)
    }

    fn visit_select(&mut self, node: &Rc<SelectExpr>) -> Expr {
        walk_select(self, node)
    }

    fn visit_set_operation(&mut self, node: &Rc<SetOperationExpr>) -> Expr {
        walk_set_operation(self, node)
    }

    fn visit_order_by(&mut self, node: &Rc<OrderByExpr>) -> Expr {
        walk_order_by(self, node)
    }

    fn visit_query_option(&mut self, node: &Rc<QueryOptionExpr>) -> Expr {
        walk_query_option(self, node)
    }

    fn visit_raw(&mut self, node: &Rc<RawTokens>) -> Expr {
        Expr::Raw(Rc::clone(node))
    }

    fn visit_type_name(&mut self, node: &Rc<TypeName>) -> DataType {
        walk_type_name(self, node)
    }

    fn visit_table_type(&mut self, node: &Rc<TableType>) -> DataType {
        DataType::Table(Rc::clone(node))
    }

    fn visit_empty(&mut self, node: &Rc<EmptyStmt>) -> Stmt {
        Stmt::Empty(Rc::clone(node))
    }

    fn visit_expression(&mut self, node: &Rc<ExpressionStmt>) -> Stmt {
        walk_expression(self, node)
    }

    fn visit_block(&mut self, node: &Rc<BlockStmt>) -> Stmt {
        walk_block(self, node)
    }

    fn visit_begin_transaction(&mut self, node: &Rc<BeginTransactionStmt>) -> Stmt {
        Stmt::BeginTransaction(Rc::clone(node))
    }

    fn visit_try_catch(&mut self, node: &Rc<TryCatchStmt>) -> Stmt {
        walk_try_catch(self, node)
    }

    fn visit_if(&mut self, node: &Rc<IfStmt>) -> Stmt {
        walk_if(self, node)
    }

    fn visit_while(&mut self, node: &Rc<WhileStmt>) -> Stmt {
        walk_while(self, node)
    }

    fn visit_mono_keyword(&mut self, node: &Rc<MonoKeywordStmt>) -> Stmt {
        Stmt::MonoKeyword(Rc::clone(node))
    }

    fn visit_return(&mut self, node: &Rc<ReturnStmt>) -> Stmt {
        walk_return(self, node)
    }

    fn visit_goto(&mut self, node: &Rc<GotoStmt>) -> Stmt {
        Stmt::Goto(Rc::clone(node))
    }

    fn visit_label(&mut self, node: &Rc<LabelStmt>) -> Stmt {
        Stmt::Label(Rc::clone(node))
    }

    fn visit_set_variable(&mut self, node: &Rc<SetVariableStmt>) -> Stmt {
        walk_set_variable(self, node)
    }

    fn visit_set_option(&mut self, node: &Rc<SetOptionStmt>) -> Stmt {
        Stmt::SetOption(Rc::clone(node))
    }

    fn visit_declare(&mut self, node: &Rc<DeclareStmt>) -> Stmt {
        walk_declare(self, node)
    }

    fn visit_declare_cursor(&mut self, node: &Rc<DeclareCursorStmt>) -> Stmt {
        walk_declare_cursor(self, node)
    }

    fn visit_create_procedure(&mut self, node: &Rc<CreateProcedureStmt>) -> Stmt {
        walk_create_procedure(self, node)
    }

    fn visit_create_view(&mut self, node: &Rc<CreateViewStmt>) -> Stmt {
        walk_create_view(self, node)
    }

    fn visit_create_scalar_function(&mut self, node: &Rc<CreateScalarFunctionStmt>) -> Stmt {
        walk_create_scalar_function(self, node)
    }

    fn visit_create_inline_function(&mut self, node: &Rc<CreateInlineFunctionStmt>) -> Stmt {
        walk_create_inline_function(self, node)
    }

    fn visit_create_table_function(&mut self, node: &Rc<CreateTableFunctionStmt>) -> Stmt {
        walk_create_table_function(self, node)
    }

    fn visit_unmodeled(&mut self, node: &Rc<UnmodeledStmt>) -> Stmt {
        Stmt::Unmodeled(Rc::clone(node))
    }
}

/// Tracks whether any child of the node being walked was replaced.
#[derive(Default)]
struct Rebuild {
    changed: bool,
}

impl Rebuild {
    fn expr<V: Visitor + ?Sized>(&mut self, v: &mut V, expr: &Expr) -> Expr {
        let new = v.visit_expr(expr);
        self.changed |= !new.ptr_eq(expr);
        new
    }

    fn opt_expr<V: Visitor + ?Sized>(&mut self, v: &mut V, expr: Option<&Expr>) -> Option<Expr> {
        expr.map(|e| self.expr(v, e))
    }

    /// A keyword followed by an expression, such as `ELSE x` or `ON x`.
    fn tail<V: Visitor + ?Sized>(
        &mut self,
        v: &mut V,
        tail: Option<&(Token, Expr)>,
    ) -> Option<(Token, Expr)> {
        tail.map(|(keyword, e)| (keyword.clone(), self.expr(v, e)))
    }

    fn stmt<V: Visitor + ?Sized>(&mut self, v: &mut V, stmt: &Stmt) -> Stmt {
        let new = v.visit_stmt(stmt);
        self.changed |= !new.ptr_eq(stmt);
        new
    }

    fn data_type<V: Visitor + ?Sized>(&mut self, v: &mut V, data_type: &DataType) -> DataType {
        let new = v.visit_data_type(data_type);
        self.changed |= !new.ptr_eq(data_type);
        new
    }

    fn statements<V: Visitor + ?Sized>(
        &mut self,
        v: &mut V,
        list: &Rc<StatementList>,
    ) -> Rc<StatementList> {
        let new = v.visit_statements(list);
        self.node(list, new)
    }

    fn node<T>(&mut self, old: &Rc<T>, new: Rc<T>) -> Rc<T> {
        self.changed |= !Rc::ptr_eq(old, &new);
        new
    }

    fn clause<V: Visitor + ?Sized>(
        &mut self,
        v: &mut V,
        clause: Option<&Rc<Clause>>,
    ) -> Option<Rc<Clause>> {
        clause.map(|c| {
            let new = walk_clause(v, c);
            self.node(c, new)
        })
    }

    fn list<T: ListItem>(
        &mut self,
        list: &Rc<SeparatedList<T>>,
        f: impl FnMut(&T) -> T,
    ) -> Rc<SeparatedList<T>> {
        let items: Vec<T> = list.iter().map(f).collect();
        if items.iter().zip(list.iter()).all(|(new, old)| new.same(old)) {
            Rc::clone(list)
        } else {
            self.changed = true;
            Rc::new(list.with_items(items))
        }
    }

    fn finish<T: Clone>(self, node: &Rc<T>, build: impl FnOnce(T) -> T) -> Rc<T> {
        if self.changed {
            Rc::new(build(T::clone(node)))
        } else {
            Rc::clone(node)
        }
    }

    /// Like [`Rebuild::finish`] for nodes whose shape depends on their
    /// children. The changed node goes through its validating constructor;
    /// when that rejects it, the original node is kept.
    fn checked<T>(
        self,
        node: &Rc<T>,
        build: impl FnOnce(&T) -> Result<T, ShapeError>,
    ) -> Rc<T> {
        if !self.changed {
            return Rc::clone(node);
        }
        match build(node) {
            Ok(new) => Rc::new(new),
            Err(err) => {
                warn!(error = %err, "rewrite rejected, keeping the original node");
                Rc::clone(node)
            }
        }
    }
}

pub fn walk_unary<V: Visitor + ?Sized>(v: &mut V, node: &Rc<UnaryExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    Expr::Unary(r.finish(node, |n| UnaryExpr { operand, ..n }))
}

pub fn walk_binary<V: Visitor + ?Sized>(v: &mut V, node: &Rc<BinaryExpr>) -> Expr {
    let mut r = Rebuild::default();
    let left = r.expr(v, &node.left);
    let right = r.expr(v, &node.right);
    Expr::Binary(r.finish(node, |n| BinaryExpr { left, right, ..n }))
}

pub fn walk_assignment<V: Visitor + ?Sized>(v: &mut V, node: &Rc<AssignmentExpr>) -> Expr {
    let mut r = Rebuild::default();
    let target = r.expr(v, &node.target);
    let value = r.expr(v, &node.value);
    Expr::Assignment(r.checked(node, |n| {
        AssignmentExpr::new(target, n.operator.clone(), value)
    }))
}

pub fn walk_is_null<V: Visitor + ?Sized>(v: &mut V, node: &Rc<IsNullExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    Expr::IsNull(r.finish(node, |n| IsNullExpr { operand, ..n }))
}

pub fn walk_like<V: Visitor + ?Sized>(v: &mut V, node: &Rc<LikeExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    let pattern = r.expr(v, &node.pattern);
    let escape = r.tail(v, node.escape.as_ref());
    Expr::Like(r.finish(node, |n| LikeExpr {
        operand,
        pattern,
        escape,
        ..n
    }))
}

pub fn walk_between<V: Visitor + ?Sized>(v: &mut V, node: &Rc<BetweenExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    let low = r.expr(v, &node.low);
    let high = r.expr(v, &node.high);
    Expr::Between(r.finish(node, |n| BetweenExpr {
        operand,
        low,
        high,
        ..n
    }))
}

pub fn walk_in<V: Visitor + ?Sized>(v: &mut V, node: &Rc<InExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    let values = r.expr(v, &node.values);
    Expr::In(r.finish(node, |n| InExpr {
        operand,
        values,
        ..n
    }))
}

pub fn walk_paren<V: Visitor + ?Sized>(v: &mut V, node: &Rc<ParenExpr>) -> Expr {
    let mut r = Rebuild::default();
    let inner = r.expr(v, &node.inner);
    Expr::Paren(r.finish(node, |n| ParenExpr { inner, ..n }))
}

pub fn walk_call<V: Visitor + ?Sized>(v: &mut V, node: &Rc<CallExpr>) -> Expr {
    let mut r = Rebuild::default();
    let callee = r.expr(v, &node.callee);
    let args = r.opt_expr(v, node.args.as_ref());
    Expr::Call(r.finish(node, |n| CallExpr {
        callee,
        args,
        ..n
    }))
}

pub fn walk_window<V: Visitor + ?Sized>(v: &mut V, node: &Rc<WindowExpr>) -> Expr {
    let mut r = Rebuild::default();
    let function = r.expr(v, &node.function);
    let over = walk_over(v, &node.over);
    let over = r.node(&node.over, over);
    Expr::Window(r.checked(node, |_| WindowExpr::new(function, over)))
}

pub fn walk_cast<V: Visitor + ?Sized>(v: &mut V, node: &Rc<CastExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    let data_type = r.data_type(v, &node.data_type);
    Expr::Cast(r.finish(node, |n| CastExpr {
        operand,
        data_type,
        ..n
    }))
}

pub fn walk_case<V: Visitor + ?Sized>(v: &mut V, node: &Rc<CaseExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.opt_expr(v, node.operand.as_ref());
    let whens: Vec<Rc<WhenClause>> = node
        .whens
        .iter()
        .map(|when| {
            let new = walk_when(v, when);
            r.node(when, new)
        })
        .collect();
    let else_clause = r.tail(v, node.else_clause.as_ref());
    Expr::Case(r.finish(node, |n| CaseExpr {
        operand,
        whens,
        else_clause,
        ..n
    }))
}

pub fn walk_when<V: Visitor + ?Sized>(v: &mut V, node: &Rc<WhenClause>) -> Rc<WhenClause> {
    let mut r = Rebuild::default();
    let condition = r.expr(v, &node.condition);
    let result = r.expr(v, &node.result);
    r.finish(node, |n| WhenClause {
        condition,
        result,
        ..n
    })
}

pub fn walk_collate<V: Visitor + ?Sized>(v: &mut V, node: &Rc<CollateExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    Expr::Collate(r.finish(node, |n| CollateExpr { operand, ..n }))
}

pub fn walk_list<V: Visitor + ?Sized>(v: &mut V, node: &Rc<ExprList>) -> Expr {
    let mut r = Rebuild::default();
    Expr::List(r.list(node, |item| v.visit_expr(item)))
}

pub fn walk_alias<V: Visitor + ?Sized>(v: &mut V, node: &Rc<AliasExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    Expr::Alias(r.finish(node, |n| AliasExpr { operand, ..n }))
}

pub fn walk_sort<V: Visitor + ?Sized>(v: &mut V, node: &Rc<SortExpr>) -> Expr {
    let mut r = Rebuild::default();
    let operand = r.expr(v, &node.operand);
    Expr::Sort(r.finish(node, |n| SortExpr { operand, ..n }))
}

pub fn walk_join<V: Visitor + ?Sized>(v: &mut V, node: &Rc<JoinExpr>) -> Expr {
    let mut r = Rebuild::default();
    let left = r.expr(v, &node.left);
    let right = r.expr(v, &node.right);
    let on = r.tail(v, node.on.as_ref());
    Expr::Join(r.finish(node, |n| JoinExpr {
        left,
        right,
        on,
        ..n
    }))
}

pub fn walk_table_hint<V: Visitor + ?Sized>(v: &mut V, node: &Rc<TableHintExpr>) -> Expr {
    let mut r = Rebuild::default();
    let table = r.expr(v, &node.table);
    let hints = r.expr(v, &node.hints);
    Expr::TableHint(r.finish(node, |n| TableHintExpr {
        table,
        hints,
        ..n
    }))
}

pub fn walk_select<V: Visitor + ?Sized>(v: &mut V, node: &Rc<SelectExpr>) -> Expr {
    let mut r = Rebuild::default();
    let top = node.top.as_ref().map(|top| {
        let new = walk_top(v, top);
        r.node(top, new)
    });
    let columns = r.expr(v, &node.columns);
    let into = r.clause(v, node.into.as_ref());
    let from = r.clause(v, node.from.as_ref());
    let where_clause = r.clause(v, node.where_clause.as_ref());
    let group_by = r.clause(v, node.group_by.as_ref());
    let having = r.clause(v, node.having.as_ref());
    Expr::Select(r.finish(node, |n| SelectExpr {
        top,
        columns,
        into,
        from,
        where_clause,
        group_by,
        having,
        ..n
    }))
}

pub fn walk_top<V: Visitor + ?Sized>(v: &mut V, node: &Rc<TopClause>) -> Rc<TopClause> {
    let mut r = Rebuild::default();
    let count = r.expr(v, &node.count);
    r.finish(node, |n| TopClause { count, ..n })
}

pub fn walk_clause<V: Visitor + ?Sized>(v: &mut V, node: &Rc<Clause>) -> Rc<Clause> {
    let mut r = Rebuild::default();
    let body = r.expr(v, &node.body);
    r.finish(node, |n| Clause { body, ..n })
}

pub fn walk_set_operation<V: Visitor + ?Sized>(v: &mut V, node: &Rc<SetOperationExpr>) -> Expr {
    let mut r = Rebuild::default();
    let left = r.expr(v, &node.left);
    let right = r.expr(v, &node.right);
    Expr::SetOperation(r.finish(node, |n| SetOperationExpr {
        left,
        right,
        ..n
    }))
}

pub fn walk_order_by<V: Visitor + ?Sized>(v: &mut V, node: &Rc<OrderByExpr>) -> Expr {
    let mut r = Rebuild::default();
    let query = r.expr(v, &node.query);
    let order_by = walk_clause(v, &node.order_by);
    let order_by = r.node(&node.order_by, order_by);
    let offset = node.offset.as_ref().map(|offset| {
        let new = walk_offset(v, offset);
        r.node(offset, new)
    });
    Expr::OrderBy(r.finish(node, |_| OrderByExpr {
        query,
        order_by,
        offset,
    }))
}

pub fn walk_offset<V: Visitor + ?Sized>(v: &mut V, node: &Rc<OffsetFetch>) -> Rc<OffsetFetch> {
    let mut r = Rebuild::default();
    let count = r.expr(v, &node.count);
    let fetch = node.fetch.as_ref().map(|fetch| FetchClause {
        count: r.expr(v, &fetch.count),
        ..fetch.clone()
    });
    r.finish(node, |n| OffsetFetch { count, fetch, ..n })
}

pub fn walk_query_option<V: Visitor + ?Sized>(v: &mut V, node: &Rc<QueryOptionExpr>) -> Expr {
    let mut r = Rebuild::default();
    let query = r.expr(v, &node.query);
    Expr::QueryOption(r.finish(node, |n| QueryOptionExpr { query, ..n }))
}

pub fn walk_over<V: Visitor + ?Sized>(v: &mut V, node: &Rc<OverClause>) -> Rc<OverClause> {
    let mut r = Rebuild::default();
    let partition = r.clause(v, node.partition.as_ref());
    let order = r.clause(v, node.order.as_ref());
    r.finish(node, |n| OverClause {
        partition,
        order,
        ..n
    })
}

pub fn walk_type_name<V: Visitor + ?Sized>(v: &mut V, node: &Rc<TypeName>) -> DataType {
    let mut r = Rebuild::default();
    let args = r.opt_expr(v, node.args.as_ref());
    DataType::Named(r.finish(node, |n| TypeName { args, ..n }))
}

pub fn walk_statements<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<StatementList>,
) -> Rc<StatementList> {
    let mut r = Rebuild::default();
    let statements: Vec<Stmt> = node.statements.iter().map(|s| r.stmt(v, s)).collect();
    r.finish(node, |_| StatementList { statements })
}

pub fn walk_expression<V: Visitor + ?Sized>(v: &mut V, node: &Rc<ExpressionStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let expr = r.expr(v, &node.expr);
    Stmt::Expression(r.finish(node, |n| ExpressionStmt { expr, ..n }))
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, node: &Rc<BlockStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let body = r.statements(v, &node.body);
    Stmt::Block(r.finish(node, |n| BlockStmt { body, ..n }))
}

pub fn walk_try_catch<V: Visitor + ?Sized>(v: &mut V, node: &Rc<TryCatchStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let try_body = r.statements(v, &node.try_body);
    let catch_body = r.statements(v, &node.catch_body);
    Stmt::TryCatch(r.finish(node, |n| TryCatchStmt {
        try_body,
        catch_body,
        ..n
    }))
}

pub fn walk_if<V: Visitor + ?Sized>(v: &mut V, node: &Rc<IfStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let condition = r.expr(v, &node.condition);
    let then = r.stmt(v, &node.then);
    let else_clause = node
        .else_clause
        .as_ref()
        .map(|(keyword, stmt)| (keyword.clone(), r.stmt(v, stmt)));
    Stmt::If(r.finish(node, |n| IfStmt {
        condition,
        then,
        else_clause,
        ..n
    }))
}

pub fn walk_while<V: Visitor + ?Sized>(v: &mut V, node: &Rc<WhileStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let condition = r.expr(v, &node.condition);
    let body = r.stmt(v, &node.body);
    Stmt::While(r.finish(node, |n| WhileStmt {
        condition,
        body,
        ..n
    }))
}

pub fn walk_return<V: Visitor + ?Sized>(v: &mut V, node: &Rc<ReturnStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let value = r.opt_expr(v, node.value.as_ref());
    Stmt::Return(r.finish(node, |n| ReturnStmt { value, ..n }))
}

pub fn walk_set_variable<V: Visitor + ?Sized>(v: &mut V, node: &Rc<SetVariableStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let value = r.expr(v, &node.value);
    Stmt::SetVariable(r.finish(node, |n| SetVariableStmt { value, ..n }))
}

pub fn walk_declare<V: Visitor + ?Sized>(v: &mut V, node: &Rc<DeclareStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let variables = r.list(&node.variables, |decl| walk_var_decl(v, decl));
    Stmt::Declare(r.finish(node, |n| DeclareStmt { variables, ..n }))
}

pub fn walk_var_decl<V: Visitor + ?Sized>(v: &mut V, node: &Rc<VarDecl>) -> Rc<VarDecl> {
    let mut r = Rebuild::default();
    let data_type = r.data_type(v, &node.data_type);
    let value = r.tail(v, node.value.as_ref());
    r.checked(node, |n| {
        VarDecl::new(n.name.clone(), n.as_token.clone(), data_type, value)
    })
}

pub fn walk_declare_cursor<V: Visitor + ?Sized>(v: &mut V, node: &Rc<DeclareCursorStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let query = r.expr(v, &node.query);
    Stmt::DeclareCursor(r.finish(node, |n| DeclareCursorStmt { query, ..n }))
}

pub fn walk_param_decl<V: Visitor + ?Sized>(v: &mut V, node: &Rc<ParamDecl>) -> Rc<ParamDecl> {
    let mut r = Rebuild::default();
    let data_type = r.data_type(v, &node.data_type);
    let default = r.tail(v, node.default.as_ref());
    r.finish(node, |n| ParamDecl {
        data_type,
        default,
        ..n
    })
}

pub fn walk_create_procedure<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<CreateProcedureStmt>,
) -> Stmt {
    let mut r = Rebuild::default();
    let params = node
        .params
        .as_ref()
        .map(|params| r.list(params, |param| walk_param_decl(v, param)));
    let body = r.statements(v, &node.body);
    Stmt::CreateProcedure(r.finish(node, |n| CreateProcedureStmt {
        params,
        body,
        ..n
    }))
}

pub fn walk_create_view<V: Visitor + ?Sized>(v: &mut V, node: &Rc<CreateViewStmt>) -> Stmt {
    let mut r = Rebuild::default();
    let query = r.expr(v, &node.query);
    Stmt::CreateView(r.checked(node, |n| {
        CreateViewStmt::new(n.header(), query, n.check_option.clone(), n.terminator.clone())
    }))
}

pub fn walk_signature<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<FunctionSignature>,
) -> Rc<FunctionSignature> {
    let mut r = Rebuild::default();
    let params = node
        .params
        .as_ref()
        .map(|params| r.list(params, |param| walk_param_decl(v, param)));
    r.finish(node, |n| FunctionSignature { params, ..n })
}

/// Visits a routine body block. The body slot only holds `BEGIN ... END`,
/// so a replacement of another kind is rejected and the body kept.
fn walk_body<V: Visitor + ?Sized>(
    r: &mut Rebuild,
    v: &mut V,
    body: &Rc<BlockStmt>,
) -> Rc<BlockStmt> {
    match v.visit_block(body) {
        Stmt::Block(new) => r.node(body, new),
        other => {
            warn!(
                found = other.kind_name(),
                "rewrite rejected, a routine body must be a block"
            );
            Rc::clone(body)
        }
    }
}

pub fn walk_create_scalar_function<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<CreateScalarFunctionStmt>,
) -> Stmt {
    let mut r = Rebuild::default();
    let signature = walk_signature(v, &node.signature);
    let signature = r.node(&node.signature, signature);
    let return_type = r.data_type(v, &node.return_type);
    let body = walk_body(&mut r, v, &node.body);
    Stmt::CreateScalarFunction(r.checked(node, |n| {
        CreateScalarFunctionStmt::new(
            signature,
            return_type,
            n.options.clone(),
            n.as_token.clone(),
            body,
        )
    }))
}

pub fn walk_create_inline_function<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<CreateInlineFunctionStmt>,
) -> Stmt {
    let mut r = Rebuild::default();
    let signature = walk_signature(v, &node.signature);
    let signature = r.node(&node.signature, signature);
    let query = r.expr(v, &node.query);
    Stmt::CreateInlineFunction(r.checked(node, |n| {
        CreateInlineFunctionStmt::new(
            signature,
            n.table.clone(),
            n.options.clone(),
            n.as_token.clone(),
            n.return_token.clone(),
            query,
            n.terminator.clone(),
        )
    }))
}

pub fn walk_create_table_function<V: Visitor + ?Sized>(
    v: &mut V,
    node: &Rc<CreateTableFunctionStmt>,
) -> Stmt {
    let mut r = Rebuild::default();
    let signature = walk_signature(v, &node.signature);
    let signature = r.node(&node.signature, signature);
    let body = walk_body(&mut r, v, &node.body);
    Stmt::CreateTableFunction(r.finish(node, |n| CreateTableFunctionStmt {
        signature,
        body,
        ..n
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Span, TokenKind};

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, Span::default())
    }

    fn int(text: &str) -> Expr {
        LiteralExpr::new(tok(TokenKind::Integer, text)).unwrap().into()
    }

    fn name(text: &str) -> Expr {
        NameExpr::single(tok(TokenKind::Identifier, text))
            .unwrap()
            .into()
    }

    struct Identity;

    impl Visitor for Identity {}

    /// Replaces the literal `1` with `42`.
    struct ReplaceOne;

    impl Visitor for ReplaceOne {
        fn visit_literal(&mut self, node: &Rc<LiteralExpr>) -> Expr {
            if node.token().text() == "1" {
                int("42")
            } else {
                Expr::Literal(Rc::clone(node))
            }
        }
    }

    #[test]
    fn test_identity_returns_same_instance() {
        let plus = tok(TokenKind::Plus, "+");
        let expr: Expr = BinaryExpr::new(name("a"), plus, int("1")).unwrap().into();
        let out = Identity.visit_expr(&expr);
        assert!(out.ptr_eq(&expr));
    }

    #[test]
    fn test_rewrite_rebuilds_changed_path_only() {
        let star = tok(TokenKind::Star, "*");
        let plus = tok(TokenKind::Plus, "+");
        let untouched: Expr = BinaryExpr::new(name("a"), star, name("b")).unwrap().into();
        let expr: Expr = BinaryExpr::new(untouched.clone(), plus, int("1"))
            .unwrap()
            .into();
        let out = ReplaceOne.visit_expr(&expr);
        assert!(!out.ptr_eq(&expr));
        assert_eq!(out.to_source(), "a*b+42");
        let Expr::Binary(binary) = out else {
            panic!("expected a binary expression");
        };
        assert!(binary.left().ptr_eq(&untouched));
    }

    #[test]
    fn test_list_keeps_separators() {
        let comma = tok(TokenKind::Comma, ",");
        let list: Expr = ExprList::new(vec![int("1"), int("2")], vec![comma])
            .unwrap()
            .into();
        let out = ReplaceOne.visit_expr(&list);
        assert_eq!(out.to_source(), "42,2");
        assert_eq!(out.items().len(), 2);
    }

    /// Replaces every name with the literal `0`.
    struct NamesToZero;

    impl Visitor for NamesToZero {
        fn visit_name(&mut self, _node: &Rc<NameExpr>) -> Expr {
            int("0")
        }
    }

    /// Replaces every block with an empty statement.
    struct DropBlocks;

    impl Visitor for DropBlocks {
        fn visit_block(&mut self, _node: &Rc<BlockStmt>) -> Stmt {
            EmptyStmt::new(tok(TokenKind::Semicolon, ";")).unwrap().into()
        }
    }

    #[test]
    fn test_rewrite_that_breaks_shape_keeps_original() {
        let assign = tok(TokenKind::Assign, "=");
        let expr: Expr = AssignmentExpr::new(name("a"), assign, int("1"))
            .unwrap()
            .into();
        let out = NamesToZero.visit_expr(&expr);
        assert!(out.ptr_eq(&expr));
        assert_eq!(out.to_source(), "a=1");
    }

    #[test]
    fn test_routine_body_stays_a_block() {
        let stmt = crate::parse_statement("create function f() returns int as begin return 1 end")
            .unwrap();
        let out = stmt.accept(&mut DropBlocks);
        assert!(out.ptr_eq(&stmt));
    }
}
