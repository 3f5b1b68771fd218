/// AST (Abstract Syntax Tree) module
/// Contains the untyped tree the parser produces
///
/// Submodules:
/// - ast: The `Expr` and `Stmt` unions
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: The `DataType` union used by annotations and the type checker
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
