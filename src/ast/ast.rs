//! Core AST definitions.
//!
//! The parser hands the type checker a flat `Vec<Stmt>` per block with all
//! operator precedence already resolved.

use crate::Span;

use super::{
    expressions::{
        ArrayExpr, BinaryExpr, BooleanExpr, CallExpr, IndexExpr, MemberExpr, NumberExpr,
        ObjectExpr, PrefixExpr, StringExpr, SymbolExpr,
    },
    statements::{
        CondBlock, ElseStmt, ExpressionStmt, FnDeclStmt, ImportStmt, ReAssignmentStmt,
        ReturnStmt, VarDeclStmt, WhileStmt,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberExpr),
    Boolean(BooleanExpr),
    String(StringExpr),
    Symbol(SymbolExpr),
    Object(ObjectExpr),
    Array(ArrayExpr),
    Prefix(PrefixExpr),
    Binary(BinaryExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    Call(CallExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    ReAssignment(ReAssignmentStmt),
    If(CondBlock),
    ElseIf(CondBlock),
    Else(ElseStmt),
    While(WhileStmt),
    Break(Span),
    Continue(Span),
    FnDecl(FnDeclStmt),
    Return(ReturnStmt),
    Import(ImportStmt),
    Expression(ExpressionStmt),
    Eof,
}
