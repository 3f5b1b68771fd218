//! Typed Abstract Syntax Tree definitions.
//!
//! This module contains the typed variants of AST nodes produced by
//! the type checker. Every type in this tree is a `Type`, which has no
//! sentinel variants, so a consumer of the typed tree never meets an
//! unresolved or pending type.
//!
//! The typed AST mirrors the structure of the untyped AST except that:
//! - Every expression carries its resolved type
//! - Each `if`/`else if`/`else` run is one `TypedIfStmt`
//! - Imports carry the types of the imported names
//!
//! `untype` maps a typed tree back onto untyped syntax, keeping every
//! memoized type, so that it can be checked again.

use std::fmt::Display;

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::{
            ArrayExpr, BinaryExpr, BinaryOperator, BooleanExpr, CallExpr, IndexExpr, MemberExpr,
            NumberExpr, ObjectExpr, PrefixExpr, PrefixOperator, StringExpr, SymbolExpr,
        },
        statements::{
            AssignmentOperator, AssignmentPath, CondBlock, ElseStmt, ExpressionStmt, FnDeclStmt,
            ImportStmt, IndexPath, MemberPath, ReAssignmentStmt, ReturnStmt, VarDeclStmt,
            WhileStmt,
        },
        types::DataType,
    },
    errors::errors::{Error, ErrorImpl},
    Position, Span,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number,
    Boolean,
    String {
        length: usize,
    },
    Array {
        base: Box<Type>,
        length: usize,
    },
    Object {
        fields: Vec<(String, Type)>,
    },
    Function {
        arguments: Vec<(String, Type)>,
        return_type: Box<Type>,
    },
    Void,
    Identifier(String),
}

fn convert_fields(
    fields: Vec<(String, DataType)>,
    position: &Position,
) -> Result<Vec<(String, Type)>, Error> {
    fields
        .into_iter()
        .map(|(name, datatype)| Ok((name, Type::from_datatype(datatype, position)?)))
        .collect()
}

impl Type {
    /// Fails with `UnresolvedType` if a sentinel is left anywhere inside.
    pub fn from_datatype(datatype: DataType, position: &Position) -> Result<Type, Error> {
        match datatype {
            DataType::Number => Ok(Type::Number),
            DataType::Boolean => Ok(Type::Boolean),
            DataType::String { length } => Ok(Type::String { length }),
            DataType::Array { base, length } => Ok(Type::Array {
                base: Box::new(Type::from_datatype(*base, position)?),
                length,
            }),
            DataType::Object { fields } => Ok(Type::Object {
                fields: convert_fields(fields, position)?,
            }),
            DataType::Function {
                arguments,
                return_type,
            } => Ok(Type::Function {
                arguments: convert_fields(arguments, position)?,
                return_type: Box::new(Type::from_datatype(*return_type, position)?),
            }),
            DataType::Void => Ok(Type::Void),
            DataType::Identifier(name) => Ok(Type::Identifier(name)),
            unresolved @ (DataType::Unresolved
            | DataType::NotCalculated
            | DataType::Pending(_)) => Err(Error::new(
                ErrorImpl::UnresolvedType {
                    datatype: unresolved.to_string(),
                },
                position.clone(),
            )),
        }
    }
}

impl From<Type> for DataType {
    fn from(value: Type) -> Self {
        let fields = |fields: Vec<(String, Type)>| -> Vec<(String, DataType)> {
            fields
                .into_iter()
                .map(|(name, datatype)| (name, DataType::from(datatype)))
                .collect()
        };

        match value {
            Type::Number => DataType::Number,
            Type::Boolean => DataType::Boolean,
            Type::String { length } => DataType::String { length },
            Type::Array { base, length } => DataType::Array {
                base: Box::new(DataType::from(*base)),
                length,
            },
            Type::Object { fields: object } => DataType::Object {
                fields: fields(object),
            },
            Type::Function {
                arguments,
                return_type,
            } => DataType::Function {
                arguments: fields(arguments),
                return_type: Box::new(DataType::from(*return_type)),
            },
            Type::Void => DataType::Void,
            Type::Identifier(name) => DataType::Identifier(name),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", DataType::from(self.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedSymbolExpr {
    pub value: String,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedObjectExpr {
    pub fields: Vec<(String, TypedExpr)>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedArrayExpr {
    pub elements: Vec<TypedExpr>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedPrefixExpr {
    pub operator: PrefixOperator,
    pub right: Box<TypedExpr>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBinaryExpr {
    pub left: Box<TypedExpr>,
    pub operator: BinaryOperator,
    pub right: Box<TypedExpr>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedIndexExpr {
    pub left: Box<TypedExpr>,
    pub index: Box<TypedExpr>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedMemberExpr {
    pub left: Box<TypedExpr>,
    pub field: String,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedCallExpr {
    pub callee: Box<TypedExpr>,
    pub arguments: Vec<TypedExpr>,
    pub datatype: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExpr {
    Number(NumberExpr),
    Boolean(BooleanExpr),
    String(StringExpr),
    Symbol(TypedSymbolExpr),
    Object(TypedObjectExpr),
    Array(TypedArrayExpr),
    Prefix(TypedPrefixExpr),
    Binary(TypedBinaryExpr),
    Index(TypedIndexExpr),
    Member(TypedMemberExpr),
    Call(TypedCallExpr),
}

fn unresolved(what: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::UnresolvedType {
            datatype: what.to_string(),
        },
        position.clone(),
    )
}

impl TypedExpr {
    pub fn get_type(&self) -> Type {
        match self {
            TypedExpr::Number(_) => Type::Number,
            TypedExpr::Boolean(_) => Type::Boolean,
            TypedExpr::String(string) => Type::String {
                length: string.value.chars().count(),
            },
            TypedExpr::Symbol(symbol) => symbol.datatype.clone(),
            TypedExpr::Object(object) => object.datatype.clone(),
            TypedExpr::Array(array) => array.datatype.clone(),
            TypedExpr::Prefix(prefix) => prefix.datatype.clone(),
            TypedExpr::Binary(binary) => binary.datatype.clone(),
            TypedExpr::Index(index) => index.datatype.clone(),
            TypedExpr::Member(member) => member.datatype.clone(),
            TypedExpr::Call(call) => call.datatype.clone(),
        }
    }

    pub fn from_expr(expr: Expr, position: &Position) -> Result<TypedExpr, Error> {
        let boxed = |expr: Box<Expr>| TypedExpr::from_expr(*expr, position).map(Box::new);

        Ok(match expr {
            Expr::Number(number) => TypedExpr::Number(number),
            Expr::Boolean(boolean) => TypedExpr::Boolean(boolean),
            Expr::String(string) => TypedExpr::String(string),
            Expr::Symbol(symbol) => TypedExpr::Symbol(TypedSymbolExpr {
                value: symbol.value,
                datatype: Type::from_datatype(symbol.datatype, position)?,
            }),
            Expr::Object(object) => TypedExpr::Object(TypedObjectExpr {
                fields: object
                    .fields
                    .into_iter()
                    .map(|(name, value)| Ok((name, TypedExpr::from_expr(value, position)?)))
                    .collect::<Result<_, Error>>()?,
                datatype: Type::from_datatype(object.datatype, position)?,
            }),
            Expr::Array(array) => TypedExpr::Array(TypedArrayExpr {
                elements: array
                    .elements
                    .into_iter()
                    .map(|element| TypedExpr::from_expr(element, position))
                    .collect::<Result<_, Error>>()?,
                datatype: Type::from_datatype(array.datatype, position)?,
            }),
            Expr::Prefix(prefix) => {
                let datatype = match prefix.operator {
                    PrefixOperator::Bang => Type::Boolean,
                    PrefixOperator::Plus | PrefixOperator::Minus => Type::Number,
                };
                TypedExpr::Prefix(TypedPrefixExpr {
                    operator: prefix.operator,
                    right: boxed(prefix.right)?,
                    datatype,
                })
            }
            Expr::Binary(binary) => {
                let left = boxed(binary.left)?;
                let right = boxed(binary.right)?;
                let datatype = match (left.get_type(), right.get_type()) {
                    (Type::String { length: left }, Type::String { length: right }) => {
                        Type::String {
                            length: left + right,
                        }
                    }
                    _ if binary.operator.is_arithmetic() => Type::Number,
                    _ => Type::Boolean,
                };
                TypedExpr::Binary(TypedBinaryExpr {
                    left,
                    operator: binary.operator,
                    right,
                    datatype,
                })
            }
            Expr::Index(index) => {
                let left = boxed(index.left)?;
                let datatype = match left.get_type() {
                    Type::Array { base, .. } => *base,
                    _ => return Err(unresolved("index target", position)),
                };
                TypedExpr::Index(TypedIndexExpr {
                    left,
                    index: boxed(index.index)?,
                    datatype,
                })
            }
            Expr::Member(member) => {
                let left = boxed(member.left)?;
                let datatype = match left.get_type() {
                    Type::Object { fields } => fields
                        .into_iter()
                        .find(|(name, _)| *name == member.field)
                        .map(|(_, datatype)| datatype)
                        .ok_or_else(|| unresolved(&member.field, position))?,
                    _ => return Err(unresolved("member target", position)),
                };
                TypedExpr::Member(TypedMemberExpr {
                    left,
                    field: member.field,
                    datatype,
                })
            }
            Expr::Call(call) => {
                let callee = boxed(call.callee)?;
                let datatype = match callee.get_type() {
                    Type::Function { return_type, .. } => *return_type,
                    _ => return Err(unresolved("callee", position)),
                };
                TypedExpr::Call(TypedCallExpr {
                    callee,
                    arguments: call
                        .arguments
                        .into_iter()
                        .map(|argument| TypedExpr::from_expr(argument, position))
                        .collect::<Result<_, Error>>()?,
                    datatype,
                })
            }
        })
    }
}

impl From<TypedExpr> for Expr {
    fn from(value: TypedExpr) -> Self {
        let boxed = |expr: Box<TypedExpr>| Box::new(Expr::from(*expr));

        match value {
            TypedExpr::Number(number) => Expr::Number(number),
            TypedExpr::Boolean(boolean) => Expr::Boolean(boolean),
            TypedExpr::String(string) => Expr::String(string),
            TypedExpr::Symbol(symbol) => Expr::Symbol(SymbolExpr {
                value: symbol.value,
                datatype: symbol.datatype.into(),
            }),
            TypedExpr::Object(object) => Expr::Object(ObjectExpr {
                fields: object
                    .fields
                    .into_iter()
                    .map(|(name, value)| (name, value.into()))
                    .collect(),
                datatype: object.datatype.into(),
            }),
            TypedExpr::Array(array) => Expr::Array(ArrayExpr {
                elements: array.elements.into_iter().map(Expr::from).collect(),
                datatype: array.datatype.into(),
            }),
            TypedExpr::Prefix(prefix) => Expr::Prefix(PrefixExpr {
                operator: prefix.operator,
                right: boxed(prefix.right),
            }),
            TypedExpr::Binary(binary) => Expr::Binary(BinaryExpr {
                left: boxed(binary.left),
                operator: binary.operator,
                right: boxed(binary.right),
            }),
            TypedExpr::Index(index) => Expr::Index(IndexExpr {
                left: boxed(index.left),
                index: boxed(index.index),
            }),
            TypedExpr::Member(member) => Expr::Member(MemberExpr {
                left: boxed(member.left),
                field: member.field,
            }),
            TypedExpr::Call(call) => Expr::Call(CallExpr {
                callee: boxed(call.callee),
                arguments: call.arguments.into_iter().map(Expr::from).collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedAssignmentPath {
    Symbol(String),
    Member {
        left: Box<TypedAssignmentPath>,
        left_datatype: Type,
        field: String,
    },
    Index {
        left: Box<TypedAssignmentPath>,
        left_base_type: Type,
        index: TypedExpr,
    },
}

impl TypedAssignmentPath {
    pub fn from_path(path: AssignmentPath, position: &Position) -> Result<Self, Error> {
        Ok(match path {
            AssignmentPath::Symbol(value) => TypedAssignmentPath::Symbol(value),
            AssignmentPath::Member(member) => TypedAssignmentPath::Member {
                left: Box::new(TypedAssignmentPath::from_path(*member.left, position)?),
                left_datatype: Type::from_datatype(member.left_datatype, position)?,
                field: member.field,
            },
            AssignmentPath::Index(index) => TypedAssignmentPath::Index {
                left: Box::new(TypedAssignmentPath::from_path(*index.left, position)?),
                left_base_type: Type::from_datatype(index.left_base_type, position)?,
                index: TypedExpr::from_expr(index.index, position)?,
            },
        })
    }
}

impl From<TypedAssignmentPath> for AssignmentPath {
    fn from(value: TypedAssignmentPath) -> Self {
        match value {
            TypedAssignmentPath::Symbol(value) => AssignmentPath::Symbol(value),
            TypedAssignmentPath::Member {
                left,
                left_datatype,
                field,
            } => AssignmentPath::Member(MemberPath {
                left: Box::new((*left).into()),
                left_datatype: left_datatype.into(),
                field,
            }),
            TypedAssignmentPath::Index {
                left,
                left_base_type,
                index,
            } => AssignmentPath::Index(IndexPath {
                left: Box::new((*left).into()),
                left_base_type: left_base_type.into(),
                index: index.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedVarDeclStmt {
    pub identifier: String,
    pub is_constant: bool,
    pub assigned_value: TypedExpr,
    pub var_type: Type,
    pub export: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedReAssignmentStmt {
    pub path: TypedAssignmentPath,
    pub operator: AssignmentOperator,
    pub assigned_value: TypedExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedCondBlock {
    pub condition: TypedExpr,
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedElseBlock {
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

/// A whole `if`/`else if`/`else` run.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedIfStmt {
    pub if_block: TypedCondBlock,
    pub else_if_blocks: Vec<TypedCondBlock>,
    pub else_block: Option<TypedElseBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedWhileStmt {
    pub condition: TypedExpr,
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFnDeclStmt {
    pub identifier: String,
    pub parameters: Vec<(String, Type)>,
    pub return_type: Type,
    pub body: Vec<TypedStmt>,
    pub export: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedReturnStmt {
    pub value: Option<TypedExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedImportStmt {
    pub identifiers: Vec<(String, Type)>,
    pub from: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpressionStmt {
    pub expression: TypedExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    VarDecl(TypedVarDeclStmt),
    ReAssignment(TypedReAssignmentStmt),
    If(TypedIfStmt),
    While(TypedWhileStmt),
    Break(Span),
    Continue(Span),
    FnDecl(TypedFnDeclStmt),
    Return(TypedReturnStmt),
    Import(TypedImportStmt),
    Expression(TypedExpressionStmt),
    Eof,
}

fn untype_block(block: TypedCondBlock) -> CondBlock {
    CondBlock {
        condition: block.condition.into(),
        body: untype(block.body),
        span: block.span,
    }
}

/// Maps a typed tree back to untyped syntax, keeping every memoized type.
pub fn untype(stmts: Vec<TypedStmt>) -> Vec<Stmt> {
    let mut untyped = Vec::with_capacity(stmts.len());

    for stmt in stmts {
        match stmt {
            TypedStmt::VarDecl(decl) => untyped.push(Stmt::VarDecl(VarDeclStmt {
                identifier: decl.identifier,
                is_constant: decl.is_constant,
                assigned_value: decl.assigned_value.into(),
                explicit_type: decl.var_type.clone().into(),
                var_type: decl.var_type.into(),
                export: decl.export,
                span: decl.span,
            })),
            TypedStmt::ReAssignment(stmt) => untyped.push(Stmt::ReAssignment(ReAssignmentStmt {
                path: stmt.path.into(),
                operator: stmt.operator,
                assigned_value: stmt.assigned_value.into(),
                span: stmt.span,
            })),
            TypedStmt::If(stmt) => {
                untyped.push(Stmt::If(untype_block(stmt.if_block)));
                untyped.extend(
                    stmt.else_if_blocks
                        .into_iter()
                        .map(|block| Stmt::ElseIf(untype_block(block))),
                );
                if let Some(block) = stmt.else_block {
                    untyped.push(Stmt::Else(ElseStmt {
                        body: untype(block.body),
                        span: block.span,
                    }));
                }
            }
            TypedStmt::While(stmt) => untyped.push(Stmt::While(WhileStmt {
                condition: stmt.condition.into(),
                body: untype(stmt.body),
                span: stmt.span,
            })),
            TypedStmt::Break(span) => untyped.push(Stmt::Break(span)),
            TypedStmt::Continue(span) => untyped.push(Stmt::Continue(span)),
            TypedStmt::FnDecl(decl) => untyped.push(Stmt::FnDecl(FnDeclStmt {
                identifier: decl.identifier,
                parameters: decl
                    .parameters
                    .into_iter()
                    .map(|(name, datatype)| (name, datatype.into()))
                    .collect(),
                return_type: decl.return_type.into(),
                body: untype(decl.body),
                export: decl.export,
                span: decl.span,
            })),
            TypedStmt::Return(stmt) => untyped.push(Stmt::Return(ReturnStmt {
                value: stmt.value.map(Expr::from),
                span: stmt.span,
            })),
            TypedStmt::Import(stmt) => untyped.push(Stmt::Import(ImportStmt {
                identifiers: stmt.identifiers.into_iter().map(|(name, _)| name).collect(),
                from: stmt.from,
                span: stmt.span,
            })),
            TypedStmt::Expression(stmt) => untyped.push(Stmt::Expression(ExpressionStmt {
                expression: stmt.expression.into(),
                span: stmt.span,
            })),
            TypedStmt::Eof => untyped.push(Stmt::Eof),
        }
    }

    untyped
}
