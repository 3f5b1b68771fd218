//! Statements that have been checked but may still be waiting on a hook.
//!
//! Declarations, reassignments, returns, expression statements and function
//! headers are kept behind `Rc<RefCell<_>>` so a hook can re-resolve them
//! after the statement analyzer has moved on. Once the whole file has been
//! analyzed every node is converted into the typed tree, which rejects any
//! type that is still a sentinel.

use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{
        statements::{ExpressionStmt, ReAssignmentStmt, ReturnStmt, VarDeclStmt},
        types::DataType,
    },
    errors::errors::Error,
    Span,
};

use super::{
    closure::Variable,
    typed_ast::{
        Type, TypedAssignmentPath, TypedCondBlock, TypedElseBlock, TypedExpr,
        TypedExpressionStmt, TypedFnDeclStmt, TypedIfStmt, TypedImportStmt,
        TypedReAssignmentStmt, TypedReturnStmt, TypedStmt, TypedVarDeclStmt, TypedWhileStmt,
    },
};

pub type Shared<T> = Rc<RefCell<T>>;

pub fn share<T>(node: T) -> Shared<T> {
    Rc::new(RefCell::new(node))
}

fn unshare<T: Clone>(node: Shared<T>) -> T {
    Rc::try_unwrap(node)
        .map(RefCell::into_inner)
        .unwrap_or_else(|node| node.borrow().clone())
}

/// Everything of a function declaration except its body.
#[derive(Debug, Clone)]
pub struct FnHeader {
    pub identifier: String,
    pub parameters: Vec<(String, DataType)>,
    pub return_type: DataType,
    pub export: bool,
    pub span: Span,
}

impl FnHeader {
    pub fn datatype(&self) -> DataType {
        DataType::Function {
            arguments: self.parameters.clone(),
            return_type: Box::new(self.return_type.clone()),
        }
    }

    pub fn as_variable(&self) -> Variable {
        Variable::new(&self.identifier, self.datatype(), true, self.export)
    }
}

impl VarDeclStmt {
    pub(crate) fn as_variable(&self) -> Variable {
        Variable::new(
            &self.identifier,
            self.var_type.clone(),
            self.is_constant,
            self.export,
        )
    }
}

pub struct AnalyzedCondBlock {
    pub condition: TypedExpr,
    pub body: Vec<AnalyzedStmt>,
    pub span: Span,
}

pub struct AnalyzedElseBlock {
    pub body: Vec<AnalyzedStmt>,
    pub span: Span,
}

pub enum AnalyzedStmt {
    VarDecl(Shared<VarDeclStmt>),
    ReAssignment(Shared<ReAssignmentStmt>),
    If {
        if_block: AnalyzedCondBlock,
        else_if_blocks: Vec<AnalyzedCondBlock>,
        else_block: Option<AnalyzedElseBlock>,
    },
    While {
        condition: TypedExpr,
        body: Vec<AnalyzedStmt>,
        span: Span,
    },
    Break(Span),
    Continue(Span),
    FnDecl {
        header: Shared<FnHeader>,
        body: Vec<AnalyzedStmt>,
    },
    Return(Shared<ReturnStmt>),
    Import {
        identifiers: Vec<(String, Type)>,
        from: String,
        span: Span,
    },
    Expression(Shared<ExpressionStmt>),
    Eof,
}

pub fn into_typed(stmts: Vec<AnalyzedStmt>) -> Result<Vec<TypedStmt>, Error> {
    stmts.into_iter().map(AnalyzedStmt::into_typed).collect()
}

impl AnalyzedCondBlock {
    fn into_typed(self) -> Result<TypedCondBlock, Error> {
        Ok(TypedCondBlock {
            condition: self.condition,
            body: into_typed(self.body)?,
            span: self.span,
        })
    }
}

impl AnalyzedStmt {
    pub fn into_typed(self) -> Result<TypedStmt, Error> {
        Ok(match self {
            AnalyzedStmt::VarDecl(node) => {
                let decl = unshare(node);
                let position = &decl.span.start;
                TypedStmt::VarDecl(TypedVarDeclStmt {
                    var_type: Type::from_datatype(decl.var_type, position)?,
                    assigned_value: TypedExpr::from_expr(decl.assigned_value, position)?,
                    identifier: decl.identifier,
                    is_constant: decl.is_constant,
                    export: decl.export,
                    span: decl.span,
                })
            }
            AnalyzedStmt::ReAssignment(node) => {
                let stmt = unshare(node);
                let position = &stmt.span.start;
                TypedStmt::ReAssignment(TypedReAssignmentStmt {
                    path: TypedAssignmentPath::from_path(stmt.path, position)?,
                    operator: stmt.operator,
                    assigned_value: TypedExpr::from_expr(stmt.assigned_value, position)?,
                    span: stmt.span,
                })
            }
            AnalyzedStmt::If {
                if_block,
                else_if_blocks,
                else_block,
            } => TypedStmt::If(TypedIfStmt {
                if_block: if_block.into_typed()?,
                else_if_blocks: else_if_blocks
                    .into_iter()
                    .map(AnalyzedCondBlock::into_typed)
                    .collect::<Result<_, Error>>()?,
                else_block: else_block
                    .map(|block| -> Result<TypedElseBlock, Error> {
                        Ok(TypedElseBlock {
                            body: into_typed(block.body)?,
                            span: block.span,
                        })
                    })
                    .transpose()?,
            }),
            AnalyzedStmt::While {
                condition,
                body,
                span,
            } => TypedStmt::While(TypedWhileStmt {
                condition,
                body: into_typed(body)?,
                span,
            }),
            AnalyzedStmt::Break(span) => TypedStmt::Break(span),
            AnalyzedStmt::Continue(span) => TypedStmt::Continue(span),
            AnalyzedStmt::FnDecl { header, body } => {
                let header = unshare(header);
                let position = &header.span.start;
                TypedStmt::FnDecl(TypedFnDeclStmt {
                    parameters: header
                        .parameters
                        .into_iter()
                        .map(|(name, datatype)| Ok((name, Type::from_datatype(datatype, position)?)))
                        .collect::<Result<_, Error>>()?,
                    return_type: Type::from_datatype(header.return_type, position)?,
                    body: into_typed(body)?,
                    identifier: header.identifier,
                    export: header.export,
                    span: header.span,
                })
            }
            AnalyzedStmt::Return(node) => {
                let stmt = unshare(node);
                let position = &stmt.span.start;
                TypedStmt::Return(TypedReturnStmt {
                    value: stmt
                        .value
                        .map(|value| TypedExpr::from_expr(value, position))
                        .transpose()?,
                    span: stmt.span,
                })
            }
            AnalyzedStmt::Import {
                identifiers,
                from,
                span,
            } => TypedStmt::Import(TypedImportStmt {
                identifiers,
                from,
                span,
            }),
            AnalyzedStmt::Expression(node) => {
                let stmt = unshare(node);
                TypedStmt::Expression(TypedExpressionStmt {
                    expression: TypedExpr::from_expr(stmt.expression, &stmt.span.start)?,
                    span: stmt.span,
                })
            }
            AnalyzedStmt::Eof => TypedStmt::Eof,
        })
    }
}
