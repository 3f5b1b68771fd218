//! Lexical scopes ("closures") and the deferred-resolution hooks attached
//! to them.
//!
//! Every scope lives in one arena owned by the type checker and is
//! addressed by its `ClosureId`. A scope stays in the arena after its block
//! has been analyzed, so hooks registered against it can still fire later.
//!
//! A hook is a one-shot callback registered against a symbol name on one
//! scope (or against the return type of a function scope). Defining or
//! updating the symbol hands the hooks back to the caller, which runs them
//! against the type checker. The list is emptied before it is handed out,
//! so a hook that registers again only runs on the next wave.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    ast::types::DataType,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::type_checker::TypeChecker;

pub type ClosureId = usize;

pub type Hook = Box<dyn FnOnce(&mut TypeChecker) -> Result<(), Error>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub datatype: DataType,
    pub is_constant: bool,
    pub is_exported: bool,
}

impl Variable {
    pub fn new(name: &str, datatype: DataType, is_constant: bool, is_exported: bool) -> Self {
        Variable {
            name: name.to_string(),
            datatype,
            is_constant,
            is_exported,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClosureOptions {
    pub inside_loop: bool,
    /// Set for the root scope of a function body, starting with the
    /// annotated return type (`NotCalculated` when omitted).
    pub function_return_type: Option<DataType>,
}

impl ClosureOptions {
    pub fn block() -> Self {
        ClosureOptions::default()
    }

    pub fn loop_body() -> Self {
        ClosureOptions {
            inside_loop: true,
            function_return_type: None,
        }
    }

    pub fn function(return_type: DataType) -> Self {
        ClosureOptions {
            inside_loop: false,
            function_return_type: Some(return_type),
        }
    }
}

struct PendingHook {
    hook: Hook,
    position: Position,
}

struct FunctionInfo {
    return_type: DataType,
    return_type_hooks: Vec<Hook>,
}

struct Closure {
    parent: Option<ClosureId>,
    variables: IndexMap<String, Variable>,
    inside_loop: bool,
    function_info: Option<FunctionInfo>,
    variable_hooks: IndexMap<String, Vec<PendingHook>>,
}

#[derive(Default)]
pub struct Closures {
    arena: Vec<Closure>,
}

impl Closures {
    pub fn new() -> Self {
        Closures::default()
    }

    pub fn create(&mut self, parent: Option<ClosureId>, options: ClosureOptions) -> ClosureId {
        let id = self.arena.len();
        self.arena.push(Closure {
            parent,
            variables: IndexMap::new(),
            inside_loop: options.inside_loop,
            function_info: options.function_return_type.map(|return_type| FunctionInfo {
                return_type,
                return_type_hooks: vec![],
            }),
            variable_hooks: IndexMap::new(),
        });
        debug!("created closure {} with parent {:?}", id, parent);

        id
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent(&self, closure: ClosureId) -> Option<ClosureId> {
        self.arena[closure].parent
    }

    /// Walks from `closure` to the file root, `closure` first.
    pub fn ancestors(&self, closure: ClosureId) -> impl Iterator<Item = ClosureId> + '_ {
        std::iter::successors(Some(closure), move |id| self.arena[*id].parent)
    }

    pub fn top(&self, closure: ClosureId) -> ClosureId {
        self.ancestors(closure).last().unwrap_or(closure)
    }

    pub fn is_top_level(&self, closure: ClosureId) -> bool {
        self.arena[closure].parent.is_none()
    }

    /// Nearest scope, starting at `closure`, that binds `name`.
    pub fn closure_with_variable(&self, closure: ClosureId, name: &str) -> Option<ClosureId> {
        self.ancestors(closure)
            .find(|id| self.arena[*id].variables.contains_key(name))
    }

    pub fn lookup(&self, closure: ClosureId, name: &str) -> Option<&Variable> {
        self.closure_with_variable(closure, name)
            .and_then(|id| self.arena[id].variables.get(name))
    }

    pub fn lookup_local(&self, closure: ClosureId, name: &str) -> Option<&Variable> {
        self.arena[closure].variables.get(name)
    }

    pub fn define(
        &mut self,
        closure: ClosureId,
        variable: Variable,
        position: &Position,
    ) -> Result<Vec<Hook>, Error> {
        let scope = &mut self.arena[closure];
        if scope.variables.contains_key(&variable.name) {
            return Err(Error::new(
                ErrorImpl::DuplicateSymbol {
                    variable: variable.name,
                },
                position.clone(),
            ));
        }

        debug!(
            "defined `{}`: {} in closure {}",
            variable.name, variable.datatype, closure
        );
        let hooks = take_hooks(&mut scope.variable_hooks, &variable.name);
        scope.variables.insert(variable.name.clone(), variable);

        Ok(hooks)
    }

    pub fn update(
        &mut self,
        closure: ClosureId,
        variable: Variable,
        position: &Position,
    ) -> Result<Vec<Hook>, Error> {
        let scope = &mut self.arena[closure];
        let Some(slot) = scope.variables.get_mut(&variable.name) else {
            return Err(Error::new(
                ErrorImpl::UnknownSymbol {
                    variable: variable.name,
                },
                position.clone(),
            ));
        };

        debug!(
            "updated `{}`: {} in closure {}",
            variable.name, variable.datatype, closure
        );
        let hooks = take_hooks(&mut scope.variable_hooks, &variable.name);
        *slot = variable;

        Ok(hooks)
    }

    pub fn is_inside_loop(&self, closure: ClosureId) -> bool {
        self.ancestors(closure).any(|id| self.arena[id].inside_loop)
    }

    pub fn is_inside_function(&self, closure: ClosureId) -> bool {
        self.function_closure(closure).is_some()
    }

    fn function_closure(&self, closure: ClosureId) -> Option<ClosureId> {
        self.ancestors(closure)
            .find(|id| self.arena[*id].function_info.is_some())
    }

    pub fn function_return_type(&self, closure: ClosureId) -> Option<&DataType> {
        self.function_closure(closure)
            .and_then(|id| self.arena[id].function_info.as_ref())
            .map(|info| &info.return_type)
    }

    pub fn set_function_return_type(
        &mut self,
        closure: ClosureId,
        return_type: DataType,
        position: &Position,
    ) -> Result<Vec<Hook>, Error> {
        let info = self
            .function_closure(closure)
            .and_then(|id| self.arena[id].function_info.as_mut())
            .ok_or_else(|| Error::new(ErrorImpl::ReturnOutsideFunction, position.clone()))?;

        debug!("return type of closure {} set to {}", closure, return_type);
        info.return_type = return_type;

        Ok(std::mem::take(&mut info.return_type_hooks))
    }

    pub fn add_variable_hook(
        &mut self,
        closure: ClosureId,
        name: &str,
        position: Position,
        hook: Hook,
    ) {
        trace!("hook on `{}` in closure {}", name, closure);
        self.arena[closure]
            .variable_hooks
            .entry(name.to_string())
            .or_default()
            .push(PendingHook { hook, position });
    }

    pub fn add_return_type_hook(
        &mut self,
        closure: ClosureId,
        hook: Hook,
        position: &Position,
    ) -> Result<(), Error> {
        let info = self
            .function_closure(closure)
            .and_then(|id| self.arena[id].function_info.as_mut())
            .ok_or_else(|| Error::new(ErrorImpl::ReturnOutsideFunction, position.clone()))?;

        trace!("return type hook in closure {}", closure);
        info.return_type_hooks.push(hook);

        Ok(())
    }

    pub fn hooks_waiting_on(&self, closure: ClosureId, name: &str) -> usize {
        self.arena[closure]
            .variable_hooks
            .get(name)
            .map_or(0, Vec::len)
    }

    /// First symbol, in scope creation then registration order, that still
    /// has hooks waiting on it, with the position of the oldest waiter.
    pub fn first_unresolved(&self) -> Option<(&str, &Position)> {
        self.arena.iter().find_map(|scope| {
            scope
                .variable_hooks
                .iter()
                .find_map(|(name, hooks)| hooks.first().map(|hook| (name.as_str(), &hook.position)))
        })
    }
}

fn take_hooks(hooks: &mut IndexMap<String, Vec<PendingHook>>, name: &str) -> Vec<Hook> {
    hooks
        .shift_remove(name)
        .map(|pending| pending.into_iter().map(|pending| pending.hook).collect())
        .unwrap_or_default()
}
