use std::fmt::Display;

use thiserror::Error;

use crate::{get_line_at_position, render_source_line, Position};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &'static str {
        match &self.internal_error {
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::HeterogeneousArray { .. } => "HeterogeneousArray",
            ErrorImpl::EmptyArray => "EmptyArray",
            ErrorImpl::DuplicateField { .. } => "DuplicateField",
            ErrorImpl::DuplicateSymbol { .. } => "DuplicateSymbol",
            ErrorImpl::UnknownSymbol { .. } => "UnknownSymbol",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::ReassignToConst { .. } => "ReassignToConst",
            ErrorImpl::ControlOutsideLoop { .. } => "ControlOutsideLoop",
            ErrorImpl::FunctionNotTopLevel { .. } => "FunctionNotTopLevel",
            ErrorImpl::DuplicateParameter { .. } => "DuplicateParameter",
            ErrorImpl::MissingTypeAnnotation { .. } => "MissingTypeAnnotation",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::InvalidForwardReference { .. } => "InvalidForwardReference",
            ErrorImpl::UnresolvedReference { .. } => "UnresolvedReference",
            ErrorImpl::UnresolvedImport { .. } => "UnresolvedImport",
            ErrorImpl::CyclicImport { .. } => "CyclicImport",
            ErrorImpl::ImportNotTopLevel => "ImportNotTopLevel",
            ErrorImpl::ExportNotTopLevel { .. } => "ExportNotTopLevel",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::InvalidLoopCondition => "InvalidLoopCondition",
            ErrorImpl::UnexpectedElse => "UnexpectedElse",
            ErrorImpl::UnresolvedType { .. } => "UnresolvedType",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::HeterogeneousArray { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Array elements must share one type: expected `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::EmptyArray => ErrorTip::Suggestion(String::from(
                "Array literals need at least one element to infer their type",
            )),
            ErrorImpl::DuplicateField { field } => {
                ErrorTip::Suggestion(format!("Field `{}` is declared more than once", field))
            }
            ErrorImpl::DuplicateSymbol { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` already declared", variable))
            }
            ErrorImpl::UnknownSymbol { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::UnknownField { field, datatype } => {
                ErrorTip::Suggestion(format!("Type `{}` has no field `{}`", datatype, field))
            }
            ErrorImpl::ReassignToConst { variable } => ErrorTip::Suggestion(format!(
                "`{}` is a constant, declare it with `let` to reassign it",
                variable
            )),
            ErrorImpl::ControlOutsideLoop { statement } => {
                ErrorTip::Suggestion(format!("`{}` can only be used inside a loop", statement))
            }
            ErrorImpl::FunctionNotTopLevel { function } => ErrorTip::Suggestion(format!(
                "Move function `{}` to the top level of the file",
                function
            )),
            ErrorImpl::DuplicateParameter { parameter } => {
                ErrorTip::Suggestion(format!("Parameter `{}` is declared twice", parameter))
            }
            ErrorImpl::MissingTypeAnnotation { parameter } => {
                ErrorTip::Suggestion(format!("Parameter `{}` needs a type annotation", parameter))
            }
            ErrorImpl::ReturnOutsideFunction => ErrorTip::None,
            ErrorImpl::ReturnTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Function returns `{}` elsewhere, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::InvalidForwardReference { variable } => ErrorTip::Suggestion(format!(
                "Only functions can be used before their declaration, declare `{}` earlier",
                variable
            )),
            ErrorImpl::UnresolvedReference { variable } => {
                ErrorTip::Suggestion(format!("`{}` is never declared", variable))
            }
            ErrorImpl::UnresolvedImport { variable, from } => {
                ErrorTip::Suggestion(format!("Module `{}` does not export `{}`", from, variable))
            }
            ErrorImpl::CyclicImport { module } => {
                ErrorTip::Suggestion(format!("Module `{}` imports itself", module))
            }
            ErrorImpl::ImportNotTopLevel => ErrorTip::Suggestion(String::from(
                "Imports are only allowed at the top level of the file",
            )),
            ErrorImpl::ExportNotTopLevel { variable } => ErrorTip::Suggestion(format!(
                "Only top level declarations can be exported, `{}` is nested",
                variable
            )),
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::InvalidLoopCondition => ErrorTip::Suggestion(String::from(
                "While loops only accept the literal `true` as condition",
            )),
            ErrorImpl::UnexpectedElse => ErrorTip::Suggestion(String::from(
                "`else` must directly follow an `if` or `else if` block",
            )),
            ErrorImpl::UnresolvedType { .. } => ErrorTip::None,
        }
    }

    /// Renders the error against the source text it was raised for.
    ///
    /// Falls back to the bare message when the position is outside `source`.
    pub fn render(&self, source: &str) -> String {
        let mut output = match self.get_tip() {
            ErrorTip::None => format!("Error: {}", self.get_error_name()),
            tip => format!("Error: {} ({})", self.get_error_name(), tip),
        };
        output.push_str(&format!("\n-> {}", self.position.1));

        if let Some((line, line_text, line_pos)) = get_line_at_position(source, self.position.0) {
            output.push('\n');
            output.push_str(&render_source_line(line, &line_text, line_pos));
        }

        output
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("array elements do not match: expected {expected:?}, received {received:?}")]
    HeterogeneousArray { expected: String, received: String },
    #[error("array literal has no elements")]
    EmptyArray,
    #[error("field {field:?} declared twice")]
    DuplicateField { field: String },
    #[error("variable {variable:?} already declared")]
    DuplicateSymbol { variable: String },
    #[error("variable {variable:?} not declared")]
    UnknownSymbol { variable: String },
    #[error("type {datatype} has no field {field:?}")]
    UnknownField { field: String, datatype: String },
    #[error("cannot reassign constant {variable:?}")]
    ReassignToConst { variable: String },
    #[error("{statement:?} outside of a loop")]
    ControlOutsideLoop { statement: String },
    #[error("function {function:?} is not declared at top level")]
    FunctionNotTopLevel { function: String },
    #[error("parameter {parameter:?} declared twice")]
    DuplicateParameter { parameter: String },
    #[error("parameter {parameter:?} has no type annotation")]
    MissingTypeAnnotation { parameter: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("return types do not match: expected {expected:?}, received {received:?}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("{variable:?} is used before its declaration and is not a function")]
    InvalidForwardReference { variable: String },
    #[error("{variable:?} is referenced but never declared")]
    UnresolvedReference { variable: String },
    #[error("{variable:?} is not exported by {from:?}")]
    UnresolvedImport { variable: String, from: String },
    #[error("module {module:?} is imported while it is being analyzed")]
    CyclicImport { module: String },
    #[error("import is not at top level")]
    ImportNotTopLevel,
    #[error("export of {variable:?} is not at top level")]
    ExportNotTopLevel { variable: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("while condition must be the literal true")]
    InvalidLoopCondition,
    #[error("else without a preceding if")]
    UnexpectedElse,
    #[error("type {datatype} was never resolved")]
    UnresolvedType { datatype: String },
}
