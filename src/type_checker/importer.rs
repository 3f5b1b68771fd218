//! Resolution of imported symbols.
//!
//! The analyzer asks a `DepImporter` for the type of every name listed in an
//! `import` statement. `ModuleRegistry` is the stock implementation: it knows
//! the built-in `internal` module, accepts modules registered up front, and
//! can analyze further modules on demand through a loader callback.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use lazy_static::lazy_static;
use log::debug;

use crate::{
    ast::{ast::Stmt, types::DataType},
    config::TypeCheckerOptions,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::type_checker::type_check_with_importer;

pub const INTERNAL_MODULE: &str = "internal";

lazy_static! {
    pub static ref INTERNAL_EXPORTS: IndexMap<&'static str, DataType> = {
        let mut map = IndexMap::new();
        map.insert(
            "syscallExit",
            DataType::function(vec![("status", DataType::Number)], DataType::Boolean),
        );
        map
    };
}

pub trait DepImporter {
    /// Type of `var_name` as exported by module `from`.
    fn get_datatype_from(
        &mut self,
        var_name: &str,
        from: &str,
        position: &Position,
    ) -> Result<DataType, Error>;
}

/// Produces the untyped statements of a module by name.
pub type ModuleLoader = Box<dyn FnMut(&str) -> Result<Vec<Stmt>, Error>>;

#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, IndexMap<String, DataType>>,
    loader: Option<ModuleLoader>,
    in_progress: HashSet<String>,
    options: TypeCheckerOptions,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        let mut registry = ModuleRegistry::default();
        registry.register_module(
            INTERNAL_MODULE,
            INTERNAL_EXPORTS
                .iter()
                .map(|(name, datatype)| (name.to_string(), datatype.clone())),
        );
        registry
    }

    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: FnMut(&str) -> Result<Vec<Stmt>, Error> + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Options used when analyzing modules produced by the loader.
    pub fn with_options(mut self, options: TypeCheckerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn register_module<I>(&mut self, name: &str, exports: I)
    where
        I: IntoIterator<Item = (String, DataType)>,
    {
        let exports: IndexMap<String, DataType> = exports.into_iter().collect();
        debug!("registered module `{}` with {} exports", name, exports.len());
        self.modules.insert(name.to_string(), exports);
    }

    pub fn exports_of(&self, module: &str) -> Option<&IndexMap<String, DataType>> {
        self.modules.get(module)
    }

    fn load_module(&mut self, module: &str, position: &Position) -> Result<(), Error> {
        if self.modules.contains_key(module) {
            return Ok(());
        }
        if self.in_progress.contains(module) {
            return Err(Error::new(
                ErrorImpl::CyclicImport {
                    module: module.to_string(),
                },
                position.clone(),
            ));
        }
        let Some(loader) = self.loader.as_mut() else {
            return Ok(());
        };

        let ast = loader(module)?;
        debug!("analyzing module `{}`", module);

        self.in_progress.insert(module.to_string());
        let options = self.options.clone();
        let output = type_check_with_importer(ast, self, options);
        self.in_progress.remove(module);

        let exports = output?
            .exported_variables
            .into_iter()
            .map(|(name, datatype)| (name, datatype.into()));
        self.register_module(module, exports);

        Ok(())
    }
}

impl DepImporter for ModuleRegistry {
    fn get_datatype_from(
        &mut self,
        var_name: &str,
        from: &str,
        position: &Position,
    ) -> Result<DataType, Error> {
        self.load_module(from, position)?;

        self.modules
            .get(from)
            .and_then(|exports| exports.get(var_name))
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnresolvedImport {
                        variable: var_name.to_string(),
                        from: from.to_string(),
                    },
                    position.clone(),
                )
            })
    }
}
