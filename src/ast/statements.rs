//! Statement nodes of the untyped AST.
//!
//! An `if`/`else if`/`else` chain reaches the type checker as a run of
//! sibling statements (`Stmt::If`, then any number of `Stmt::ElseIf`, then
//! an optional `Stmt::Else`); the type checker folds the run into one node.

use crate::Span;

use super::{ast::{Expr, Stmt}, types::DataType};

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclStmt {
    pub identifier: String,
    pub is_constant: bool,
    pub assigned_value: Expr,
    /// Annotation as written, `NotCalculated` when omitted.
    pub explicit_type: DataType,
    pub var_type: DataType,
    pub export: bool,
    pub span: Span,
}

impl VarDeclStmt {
    pub fn constant(identifier: &str, assigned_value: Expr) -> Self {
        VarDeclStmt {
            identifier: identifier.to_string(),
            is_constant: true,
            assigned_value,
            explicit_type: DataType::NotCalculated,
            var_type: DataType::Unresolved,
            export: false,
            span: Span::null(),
        }
    }

    pub fn variable(identifier: &str, assigned_value: Expr) -> Self {
        VarDeclStmt {
            is_constant: false,
            ..VarDeclStmt::constant(identifier, assigned_value)
        }
    }

    pub fn with_type(mut self, explicit_type: DataType) -> Self {
        self.explicit_type = explicit_type;
        self
    }

    pub fn exported(mut self) -> Self {
        self.export = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
}

/// Target of a reassignment: a name followed by field and index accesses.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentPath {
    Symbol(String),
    Member(MemberPath),
    Index(IndexPath),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberPath {
    pub left: Box<AssignmentPath>,
    pub left_datatype: DataType,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexPath {
    pub left: Box<AssignmentPath>,
    pub left_base_type: DataType,
    pub index: Expr,
}

impl AssignmentPath {
    pub fn symbol(value: &str) -> Self {
        AssignmentPath::Symbol(value.to_string())
    }

    pub fn member(left: AssignmentPath, field: &str) -> Self {
        AssignmentPath::Member(MemberPath {
            left: Box::new(left),
            left_datatype: DataType::Unresolved,
            field: field.to_string(),
        })
    }

    pub fn index(left: AssignmentPath, index: Expr) -> Self {
        AssignmentPath::Index(IndexPath {
            left: Box::new(left),
            left_base_type: DataType::Unresolved,
            index,
        })
    }

    /// Name the path starts from.
    pub fn root(&self) -> &str {
        match self {
            AssignmentPath::Symbol(value) => value,
            AssignmentPath::Member(path) => path.left.root(),
            AssignmentPath::Index(path) => path.left.root(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReAssignmentStmt {
    pub path: AssignmentPath,
    pub operator: AssignmentOperator,
    pub assigned_value: Expr,
    pub span: Span,
}

impl ReAssignmentStmt {
    pub fn new(path: AssignmentPath, operator: AssignmentOperator, assigned_value: Expr) -> Self {
        ReAssignmentStmt {
            path,
            operator,
            assigned_value,
            span: Span::null(),
        }
    }
}

/// Body of an `if` or `else if` together with its condition.
#[derive(Debug, Clone, PartialEq)]
pub struct CondBlock {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl CondBlock {
    pub fn new(condition: Expr, body: Vec<Stmt>) -> Self {
        CondBlock {
            condition,
            body,
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl ElseStmt {
    pub fn new(body: Vec<Stmt>) -> Self {
        ElseStmt {
            body,
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl WhileStmt {
    pub fn new(condition: Expr, body: Vec<Stmt>) -> Self {
        WhileStmt {
            condition,
            body,
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDeclStmt {
    pub identifier: String,
    pub parameters: Vec<(String, DataType)>,
    /// Annotation as written, `NotCalculated` when omitted.
    pub return_type: DataType,
    pub body: Vec<Stmt>,
    pub export: bool,
    pub span: Span,
}

impl FnDeclStmt {
    pub fn new(identifier: &str, parameters: Vec<(&str, DataType)>, body: Vec<Stmt>) -> Self {
        FnDeclStmt {
            identifier: identifier.to_string(),
            parameters: parameters
                .into_iter()
                .map(|(name, datatype)| (name.to_string(), datatype))
                .collect(),
            return_type: DataType::NotCalculated,
            body,
            export: false,
            span: Span::null(),
        }
    }

    pub fn with_return_type(mut self, return_type: DataType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn exported(mut self) -> Self {
        self.export = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

impl ReturnStmt {
    pub fn new(value: Option<Expr>) -> Self {
        ReturnStmt {
            value,
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub identifiers: Vec<String>,
    pub from: String,
    pub span: Span,
}

impl ImportStmt {
    pub fn new(identifiers: Vec<&str>, from: &str) -> Self {
        ImportStmt {
            identifiers: identifiers.into_iter().map(str::to_string).collect(),
            from: from.to_string(),
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

impl ExpressionStmt {
    pub fn new(expression: Expr) -> Self {
        ExpressionStmt {
            expression,
            span: Span::null(),
        }
    }
}

macro_rules! impl_into_stmt {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Stmt {
                fn from(node: $node) -> Self {
                    Stmt::$variant(node)
                }
            }
        )*
    };
}

impl_into_stmt! {
    VarDeclStmt => VarDecl,
    ReAssignmentStmt => ReAssignment,
    WhileStmt => While,
    FnDeclStmt => FnDecl,
    ReturnStmt => Return,
    ImportStmt => Import,
    ExpressionStmt => Expression,
}
