//! Type system definitions for the AST.
//!
//! This module defines the datatypes used in the language, including:
//!
//! - Primitive types (numbers, fixed-length strings, booleans)
//! - Composite types (fixed-length arrays, records, functions)
//! - Named types coming from annotations
//! - The sentinels the type checker uses while a type is still unknown
//!
//! Types are compared structurally: two records are equal when they hold
//! the same fields in the same order with equal types, two functions when
//! their parameters and return types are equal position by position.

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Number,
    Boolean,
    String {
        length: usize,
    },
    Array {
        base: Box<DataType>,
        length: usize,
    },
    Object {
        fields: Vec<(String, DataType)>,
    },
    Function {
        arguments: Vec<(String, DataType)>,
        return_type: Box<DataType>,
    },
    Void,
    Identifier(String),
    /// Slot on a syntax node that the type checker has not visited yet.
    Unresolved,
    /// No explicit annotation was written.
    NotCalculated,
    /// Depends on the named symbol, which has no usable type yet.
    Pending(String),
}

impl DataType {
    pub fn string(length: usize) -> Self {
        DataType::String { length }
    }

    pub fn array(base: DataType, length: usize) -> Self {
        DataType::Array {
            base: Box::new(base),
            length,
        }
    }

    pub fn object(fields: Vec<(&str, DataType)>) -> Self {
        DataType::Object {
            fields: fields
                .into_iter()
                .map(|(name, datatype)| (name.to_string(), datatype))
                .collect(),
        }
    }

    pub fn function(arguments: Vec<(&str, DataType)>, return_type: DataType) -> Self {
        DataType::Function {
            arguments: arguments
                .into_iter()
                .map(|(name, datatype)| (name.to_string(), datatype))
                .collect(),
            return_type: Box::new(return_type),
        }
    }

    /// Name of the symbol this type is waiting on, if it is a pending sentinel.
    pub fn pending_on(&self) -> Option<&str> {
        match self {
            DataType::Pending(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_on().is_some()
    }

    /// True when no sentinel appears anywhere inside this type.
    pub fn is_concrete(&self) -> bool {
        match self {
            DataType::Unresolved | DataType::NotCalculated | DataType::Pending(_) => false,
            DataType::Array { base, .. } => base.is_concrete(),
            DataType::Object { fields } => fields.iter().all(|(_, field)| field.is_concrete()),
            DataType::Function {
                arguments,
                return_type,
            } => {
                arguments.iter().all(|(_, argument)| argument.is_concrete())
                    && return_type.is_concrete()
            }
            DataType::Number
            | DataType::Boolean
            | DataType::String { .. }
            | DataType::Void
            | DataType::Identifier(_) => true,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, DataType::Function { .. })
    }

    pub fn get_field(&self, field: &str) -> Option<&DataType> {
        match self {
            DataType::Object { fields } => fields
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, datatype)| datatype),
            _ => None,
        }
    }
}

fn fmt_fields(fields: &[(String, DataType)]) -> String {
    fields
        .iter()
        .map(|(name, datatype)| format!("{}: {}", name, datatype))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Number => write!(f, "number"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::String { length } => write!(f, "string<{}>", length),
            DataType::Array { base, length } => write!(f, "{}[{}]", base, length),
            DataType::Object { fields } => write!(f, "{{ {} }}", fmt_fields(fields)),
            DataType::Function {
                arguments,
                return_type,
            } => write!(f, "fn({}) -> {}", fmt_fields(arguments), return_type),
            DataType::Void => write!(f, "void"),
            DataType::Identifier(name) => write!(f, "{}", name),
            DataType::Unresolved => write!(f, "<unresolved>"),
            DataType::NotCalculated => write!(f, "<not calculated>"),
            DataType::Pending(name) => write!(f, "<pending on {}>", name),
        }
    }
}
