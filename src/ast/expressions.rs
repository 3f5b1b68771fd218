//! Expression nodes of the untyped AST.
//!
//! Nodes that the type checker memoizes a type on (`SymbolExpr`,
//! `ArrayExpr`, `ObjectExpr`) start out with `DataType::Unresolved`.

use super::{ast::Expr, types::DataType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Plus,
    Minus,
    Bang,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Star,
    Slash,
    VerticalBar,
    Caret,
    Ampersand,
    StrictEquality,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl BinaryOperator {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Star
                | BinaryOperator::Slash
                | BinaryOperator::VerticalBar
                | BinaryOperator::Caret
                | BinaryOperator::Ampersand
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            BinaryOperator::StrictEquality | BinaryOperator::StrictNotEqual
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberExpr {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanExpr {
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExpr {
    pub value: String,
    pub datatype: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
    pub fields: Vec<(String, Expr)>,
    pub datatype: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    pub elements: Vec<Expr>,
    pub datatype: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub operator: PrefixOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

/// `left[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub left: Box<Expr>,
    pub index: Box<Expr>,
}

/// `left.field`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub left: Box<Expr>,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(NumberExpr { value })
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Boolean(BooleanExpr { value })
    }

    pub fn string(value: &str) -> Self {
        Expr::String(StringExpr {
            value: value.to_string(),
        })
    }

    pub fn symbol(value: &str) -> Self {
        Expr::Symbol(SymbolExpr {
            value: value.to_string(),
            datatype: DataType::Unresolved,
        })
    }

    pub fn object(fields: Vec<(&str, Expr)>) -> Self {
        Expr::Object(ObjectExpr {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            datatype: DataType::Unresolved,
        })
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Expr::Array(ArrayExpr {
            elements,
            datatype: DataType::Unresolved,
        })
    }

    pub fn prefix(operator: PrefixOperator, right: Expr) -> Self {
        Expr::Prefix(PrefixExpr {
            operator,
            right: Box::new(right),
        })
    }

    pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    pub fn index(left: Expr, index: Expr) -> Self {
        Expr::Index(IndexExpr {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    pub fn member(left: Expr, field: &str) -> Self {
        Expr::Member(MemberExpr {
            left: Box::new(left),
            field: field.to_string(),
        })
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
        })
    }
}
