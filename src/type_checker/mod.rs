//! Type checking and semantic analysis module.
//!
//! This module checks a parsed file and turns the untyped statements into a
//! typed tree. Along the way it:
//!
//! - Infers the type of every expression and annotates symbols with it
//! - Resolves names through a chain of lexical scopes
//! - Defers lookups of names that are not typed yet and resumes them through
//!   hooks once the name is defined or its type settles
//! - Allows only functions to be used before their declaration
//! - Folds `if`/`else if`/`else` runs into a single statement
//! - Resolves imports through a `DepImporter`
//!
//! Statements move through three shapes: the untyped `ast`, the in-flight
//! `analyzed` nodes that hooks may still rewrite, and the final `typed_ast`.

pub mod analyzed;
pub mod closure;
pub mod datatype;
pub mod importer;
pub mod type_checker;
pub mod typed_ast;
