//! Datatype inference for expressions and assignment targets.
//!
//! The resolver reads the scope arena but never changes it. It writes the
//! types it finds back into the memoization slots of the nodes it visits
//! (`SymbolExpr`, `ArrayExpr`, `ObjectExpr`, and the left-hand types of an
//! assignment path). When a symbol has no usable type yet the resolver
//! returns `DataType::Pending(name)`; registering a hook for it is the
//! caller's job.

use std::collections::HashSet;

use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayExpr, BinaryExpr, BinaryOperator, CallExpr, IndexExpr, MemberExpr, ObjectExpr,
            PrefixExpr, PrefixOperator, SymbolExpr,
        },
        statements::AssignmentPath,
        types::DataType,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::closure::{ClosureId, Closures};

pub struct DatatypeResolver<'a> {
    closures: &'a Closures,
    closure: ClosureId,
    position: &'a Position,
}

impl<'a> DatatypeResolver<'a> {
    pub fn new(closures: &'a Closures, closure: ClosureId, position: &'a Position) -> Self {
        DatatypeResolver {
            closures,
            closure,
            position,
        }
    }

    fn error(&self, error: ErrorImpl) -> Error {
        Error::new(error, self.position.clone())
    }

    fn mismatch(&self, expected: &str, received: String) -> Error {
        self.error(ErrorImpl::TypeMismatch {
            expected: expected.to_string(),
            received,
        })
    }

    /// Type of the binding `name` as seen from the current scope.
    fn lookup(&self, name: &str) -> DataType {
        match self.closures.lookup(self.closure, name) {
            Some(variable) if variable.datatype.is_concrete() => variable.datatype.clone(),
            _ => DataType::Pending(name.to_string()),
        }
    }

    pub fn resolve(&self, expr: &mut Expr) -> Result<DataType, Error> {
        match expr {
            Expr::Number(_) => Ok(DataType::Number),
            Expr::Boolean(_) => Ok(DataType::Boolean),
            Expr::String(string) => Ok(DataType::string(string.value.chars().count())),
            Expr::Symbol(symbol) => Ok(self.resolve_symbol(symbol)),
            Expr::Object(object) => self.resolve_object(object),
            Expr::Array(array) => self.resolve_array(array),
            Expr::Prefix(prefix) => self.resolve_prefix(prefix),
            Expr::Binary(binary) => self.resolve_binary(binary),
            Expr::Index(index) => self.resolve_index(index),
            Expr::Member(member) => self.resolve_member(member),
            Expr::Call(call) => self.resolve_call(call),
        }
    }

    fn resolve_symbol(&self, symbol: &mut SymbolExpr) -> DataType {
        if symbol.datatype.is_concrete() {
            return symbol.datatype.clone();
        }

        let datatype = self.lookup(&symbol.value);
        if datatype.is_concrete() {
            symbol.datatype = datatype.clone();
        }
        datatype
    }

    fn resolve_object(&self, object: &mut ObjectExpr) -> Result<DataType, Error> {
        if object.datatype.is_concrete() {
            return Ok(object.datatype.clone());
        }

        let mut seen = HashSet::new();
        let mut pending = None;
        let mut fields = Vec::with_capacity(object.fields.len());

        for (name, value) in object.fields.iter_mut() {
            if !seen.insert(name.clone()) {
                return Err(self.error(ErrorImpl::DuplicateField {
                    field: name.clone(),
                }));
            }

            let datatype = self.resolve(value)?;
            if datatype.is_pending() {
                pending.get_or_insert(datatype);
            } else {
                fields.push((name.clone(), datatype));
            }
        }

        if let Some(pending) = pending {
            return Ok(pending);
        }

        object.datatype = DataType::Object { fields };
        Ok(object.datatype.clone())
    }

    fn resolve_array(&self, array: &mut ArrayExpr) -> Result<DataType, Error> {
        if array.datatype.is_concrete() {
            return Ok(array.datatype.clone());
        }

        let mut base: Option<DataType> = None;
        let mut pending = None;

        for element in array.elements.iter_mut() {
            let datatype = self.resolve(element)?;
            if datatype.is_pending() {
                pending.get_or_insert(datatype);
                continue;
            }

            if let Some(expected) = &base {
                if *expected != datatype {
                    return Err(self.error(ErrorImpl::HeterogeneousArray {
                        expected: expected.to_string(),
                        received: datatype.to_string(),
                    }));
                }
            } else {
                base = Some(datatype);
            }
        }

        if let Some(pending) = pending {
            return Ok(pending);
        }

        let base = base.ok_or_else(|| self.error(ErrorImpl::EmptyArray))?;
        array.datatype = DataType::array(base, array.elements.len());
        Ok(array.datatype.clone())
    }

    fn resolve_prefix(&self, prefix: &mut PrefixExpr) -> Result<DataType, Error> {
        let right = self.resolve(&mut prefix.right)?;
        if right.is_pending() {
            return Ok(right);
        }

        let expected = match prefix.operator {
            PrefixOperator::Plus | PrefixOperator::Minus => DataType::Number,
            PrefixOperator::Bang => DataType::Boolean,
        };

        if right != expected {
            return Err(self.mismatch(&expected.to_string(), right.to_string()));
        }
        Ok(expected)
    }

    fn resolve_binary(&self, binary: &mut BinaryExpr) -> Result<DataType, Error> {
        let left = self.resolve(&mut binary.left)?;
        let right = self.resolve(&mut binary.right)?;

        match (&left, &right) {
            (DataType::Number, DataType::Number) if binary.operator.is_arithmetic() => {
                return Ok(DataType::Number)
            }
            (DataType::String { length: left }, DataType::String { length: right })
                if binary.operator == BinaryOperator::Plus =>
            {
                return Ok(DataType::string(left + right))
            }
            (DataType::Number, DataType::Number) | (DataType::Boolean, DataType::Boolean)
                if binary.operator.is_equality() =>
            {
                return Ok(DataType::Boolean)
            }
            (DataType::Number, DataType::Number) => return Ok(DataType::Boolean),
            _ => {}
        }

        if let Some(pending) = [&left, &right].into_iter().find(|datatype| datatype.is_pending()) {
            return Ok(pending.clone());
        }

        let expected = match binary.operator {
            BinaryOperator::Plus => "number or string",
            operator if operator.is_equality() => "number or boolean",
            _ => "number",
        };
        Err(self.mismatch(expected, format!("{} and {}", left, right)))
    }

    fn resolve_index(&self, index: &mut IndexExpr) -> Result<DataType, Error> {
        let left = self.resolve(&mut index.left)?;
        if left.is_pending() {
            return Ok(left);
        }

        let base = match left {
            DataType::Array { base, .. } => base,
            other => return Err(self.mismatch("array", other.to_string())),
        };

        let position = self.resolve(&mut index.index)?;
        if position.is_pending() {
            return Ok(position);
        }
        if position != DataType::Number {
            return Err(self.mismatch("number", position.to_string()));
        }

        Ok(*base)
    }

    fn resolve_member(&self, member: &mut MemberExpr) -> Result<DataType, Error> {
        let left = self.resolve(&mut member.left)?;
        if left.is_pending() {
            return Ok(left);
        }

        self.field_of(&left, &member.field)
    }

    fn field_of(&self, datatype: &DataType, field: &str) -> Result<DataType, Error> {
        if !matches!(datatype, DataType::Object { .. }) {
            return Err(self.mismatch("object", datatype.to_string()));
        }

        datatype.get_field(field).cloned().ok_or_else(|| {
            self.error(ErrorImpl::UnknownField {
                field: field.to_string(),
                datatype: datatype.to_string(),
            })
        })
    }

    fn resolve_call(&self, call: &mut CallExpr) -> Result<DataType, Error> {
        let callee = self.resolve(&mut call.callee)?;
        if callee.is_pending() {
            return Ok(callee);
        }

        let (arguments, return_type) = match callee {
            DataType::Function {
                arguments,
                return_type,
            } => (arguments, return_type),
            other => return Err(self.mismatch("function", other.to_string())),
        };

        if call.arguments.len() > arguments.len() {
            return Err(self.error(ErrorImpl::UnexpectedArguments {
                expected: arguments.len(),
                received: call.arguments.len(),
            }));
        }
        if call.arguments.len() < arguments.len() {
            return Err(self.error(ErrorImpl::MissingArguments {
                expected: arguments.len(),
                received: call.arguments.len(),
            }));
        }

        let mut pending = None;
        for (argument, (_, expected)) in call.arguments.iter_mut().zip(arguments.iter()) {
            let datatype = self.resolve(argument)?;
            if datatype.is_pending() {
                pending.get_or_insert(datatype);
            } else if datatype != *expected {
                return Err(self.mismatch(&expected.to_string(), datatype.to_string()));
            }
        }

        Ok(pending.unwrap_or(*return_type))
    }

    /// Type addressed by an assignment target. Records the type of every
    /// intermediate left-hand side on the path node.
    pub fn resolve_path(&self, path: &mut AssignmentPath) -> Result<DataType, Error> {
        match path {
            AssignmentPath::Symbol(value) => Ok(self.lookup(value)),
            AssignmentPath::Member(member) => {
                let left = self.resolve_path(&mut member.left)?;
                member.left_datatype = left.clone();
                if left.is_pending() {
                    return Ok(left);
                }

                self.field_of(&left, &member.field)
            }
            AssignmentPath::Index(index) => {
                let left = self.resolve_path(&mut index.left)?;
                if left.is_pending() {
                    index.left_base_type = left.clone();
                    return Ok(left);
                }

                let base = match left {
                    DataType::Array { base, .. } => base,
                    other => return Err(self.mismatch("array", other.to_string())),
                };
                index.left_base_type = (*base).clone();

                let position = self.resolve(&mut index.index)?;
                if position.is_pending() {
                    return Ok(position);
                }
                if position != DataType::Number {
                    return Err(self.mismatch("number", position.to_string()));
                }

                Ok(*base)
            }
        }
    }
}
