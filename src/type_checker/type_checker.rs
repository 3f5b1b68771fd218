use std::{
    collections::{HashSet, VecDeque},
    iter::Peekable,
    rc::Rc,
    vec::IntoIter,
};

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    ast::{
        ast::{Expr, Stmt},
        expressions::BooleanExpr,
        statements::{
            AssignmentOperator, AssignmentPath, CondBlock, ElseStmt, ExpressionStmt, FnDeclStmt,
            ImportStmt, ReAssignmentStmt, ReturnStmt, VarDeclStmt, WhileStmt,
        },
        types::DataType,
    },
    config::{LoopCondition, TypeCheckerOptions},
    errors::errors::{Error, ErrorImpl},
    Position, Span,
};

use super::{
    analyzed::{
        into_typed, share, AnalyzedCondBlock, AnalyzedElseBlock, AnalyzedStmt, FnHeader, Shared,
    },
    closure::{ClosureId, ClosureOptions, Closures, Hook, Variable},
    datatype::DatatypeResolver,
    importer::{DepImporter, ModuleRegistry},
    typed_ast::{Type, TypedExpr, TypedStmt},
};

type Cursor = Peekable<IntoIter<Stmt>>;

/// Where a hook waiting on a symbol gets registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookTarget {
    /// The symbol is bound in this scope but its type is still pending.
    Bound(ClosureId),
    /// The symbol is not bound yet; only a later function declaration in
    /// the file root may satisfy it.
    Root(ClosureId),
}

pub struct TypeChecker {
    pub closures: Closures,
    pub root: ClosureId,
    pub options: TypeCheckerOptions,
    /// Hooks handed back by scope updates. Only the outermost `run_hooks`
    /// call fires them, in the order they were queued.
    queued_hooks: VecDeque<Hook>,
    firing: bool,
}

/// Names a deferred reassignment still has hooks waiting on.
type Waiting = Shared<HashSet<String>>;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheckOutput {
    pub typed_ast: Vec<TypedStmt>,
    pub exported_variables: IndexMap<String, Type>,
}

fn settle_var_type(
    decl: &mut VarDeclStmt,
    datatype: DataType,
    position: &Position,
) -> Result<(), Error> {
    if decl.explicit_type.is_concrete() && !datatype.is_pending() && decl.explicit_type != datatype
    {
        return Err(Error::new(
            ErrorImpl::TypeMismatch {
                expected: decl.explicit_type.to_string(),
                received: datatype.to_string(),
            },
            position.clone(),
        ));
    }

    decl.var_type = datatype;
    Ok(())
}

impl TypeChecker {
    pub fn new(options: TypeCheckerOptions) -> Self {
        let mut closures = Closures::new();
        let root = closures.create(None, ClosureOptions::block());

        TypeChecker {
            closures,
            root,
            options,
            queued_hooks: VecDeque::new(),
            firing: false,
        }
    }

    pub fn run_hooks(&mut self, hooks: Vec<Hook>) -> Result<(), Error> {
        if !hooks.is_empty() {
            trace!("queueing {} hooks", hooks.len());
        }
        self.queued_hooks.extend(hooks);
        if self.firing {
            return Ok(());
        }

        self.firing = true;
        let result = self.drain_hooks();
        self.firing = false;
        if result.is_err() {
            self.queued_hooks.clear();
        }
        result
    }

    fn drain_hooks(&mut self) -> Result<(), Error> {
        while let Some(hook) = self.queued_hooks.pop_front() {
            hook(self)?;
        }
        Ok(())
    }

    pub fn define_variable(
        &mut self,
        closure: ClosureId,
        variable: Variable,
        position: &Position,
    ) -> Result<(), Error> {
        let hooks = self.closures.define(closure, variable, position)?;
        self.run_hooks(hooks)
    }

    pub fn update_variable(
        &mut self,
        closure: ClosureId,
        variable: Variable,
        position: &Position,
    ) -> Result<(), Error> {
        let hooks = self.closures.update(closure, variable, position)?;
        self.run_hooks(hooks)
    }

    fn set_function_return_type(
        &mut self,
        closure: ClosureId,
        return_type: DataType,
        position: &Position,
    ) -> Result<(), Error> {
        let hooks = self
            .closures
            .set_function_return_type(closure, return_type, position)?;
        self.run_hooks(hooks)
    }

    /// Picks the scope a hook waiting on `dependency` belongs to.
    ///
    /// `declared` is the name the waiting statement itself declares; a
    /// dependency with that name refers to an outer binding.
    pub fn hook_target(
        &self,
        closure: ClosureId,
        dependency: &str,
        declared: Option<&str>,
    ) -> HookTarget {
        let start = if declared == Some(dependency) {
            self.closures.parent(closure)
        } else {
            Some(closure)
        };

        match start.and_then(|start| self.closures.closure_with_variable(start, dependency)) {
            Some(owner) => HookTarget::Bound(owner),
            None => HookTarget::Root(self.closures.top(closure)),
        }
    }

    pub fn install_hook<F>(
        &mut self,
        target: HookTarget,
        dependency: &str,
        position: Position,
        hook: F,
    ) where
        F: FnOnce(&mut TypeChecker) -> Result<(), Error> + 'static,
    {
        match target {
            HookTarget::Bound(owner) => {
                self.closures
                    .add_variable_hook(owner, dependency, position, Box::new(hook))
            }
            HookTarget::Root(root) => {
                let name = dependency.to_string();
                let verify_position = position.clone();
                self.closures.add_variable_hook(
                    root,
                    dependency,
                    position,
                    Box::new(move |checker: &mut TypeChecker| {
                        checker.verify_hoisting(root, &name, &verify_position)?;
                        hook(checker)
                    }),
                );
            }
        }
    }

    /// Only functions may be used before their declaration.
    fn verify_hoisting(&self, root: ClosureId, name: &str, position: &Position) -> Result<(), Error> {
        match self.closures.lookup_local(root, name) {
            Some(variable) if variable.datatype.is_function() => Ok(()),
            _ => Err(Error::new(
                ErrorImpl::InvalidForwardReference {
                    variable: name.to_string(),
                },
                position.clone(),
            )),
        }
    }

    pub fn check_stmts(
        &mut self,
        closure: ClosureId,
        stmts: Vec<Stmt>,
        importer: &mut dyn DepImporter,
    ) -> Result<Vec<AnalyzedStmt>, Error> {
        let mut cursor = stmts.into_iter().peekable();
        let mut analyzed = Vec::new();

        while let Some(stmt) = cursor.next() {
            let node = match stmt {
                Stmt::VarDecl(decl) => self.check_var_decl(closure, decl)?,
                Stmt::ReAssignment(stmt) => {
                    let node = share(stmt);
                    self.check_reassignment(closure, &node, &share(HashSet::new()))?;
                    AnalyzedStmt::ReAssignment(node)
                }
                Stmt::If(block) => self.check_if(closure, block, &mut cursor, importer)?,
                Stmt::ElseIf(CondBlock { span, .. }) | Stmt::Else(ElseStmt { span, .. }) => {
                    return Err(Error::new(ErrorImpl::UnexpectedElse, span.start))
                }
                Stmt::While(stmt) => self.check_while(closure, stmt, importer)?,
                Stmt::Break(span) => {
                    self.check_loop_control(closure, "break", &span)?;
                    AnalyzedStmt::Break(span)
                }
                Stmt::Continue(span) => {
                    self.check_loop_control(closure, "continue", &span)?;
                    AnalyzedStmt::Continue(span)
                }
                Stmt::FnDecl(decl) => self.check_fn_decl(closure, decl, importer)?,
                Stmt::Return(stmt) => {
                    let node = share(stmt);
                    self.check_return(closure, &node)?;
                    AnalyzedStmt::Return(node)
                }
                Stmt::Import(stmt) => self.check_import(closure, stmt, importer)?,
                Stmt::Expression(stmt) => {
                    let node = share(stmt);
                    self.check_expression(closure, &node)?;
                    AnalyzedStmt::Expression(node)
                }
                Stmt::Eof => AnalyzedStmt::Eof,
            };
            analyzed.push(node);
        }

        Ok(analyzed)
    }

    fn check_var_decl(
        &mut self,
        closure: ClosureId,
        mut decl: VarDeclStmt,
    ) -> Result<AnalyzedStmt, Error> {
        let position = decl.span.start.clone();
        if decl.export && !self.closures.is_top_level(closure) {
            return Err(Error::new(
                ErrorImpl::ExportNotTopLevel {
                    variable: decl.identifier,
                },
                position,
            ));
        }

        let datatype = DatatypeResolver::new(&self.closures, closure, &position)
            .resolve(&mut decl.assigned_value)?;
        settle_var_type(&mut decl, datatype.clone(), &position)?;

        self.define_variable(closure, decl.as_variable(), &position)?;

        let node = share(decl);
        if let Some(dependency) = datatype.pending_on() {
            self.defer_var_decl(closure, &node, dependency, position);
        }

        Ok(AnalyzedStmt::VarDecl(node))
    }

    fn defer_var_decl(
        &mut self,
        closure: ClosureId,
        node: &Shared<VarDeclStmt>,
        dependency: &str,
        position: Position,
    ) {
        let identifier = node.borrow().identifier.clone();
        let target = self.hook_target(closure, dependency, Some(&identifier));
        let node = Rc::clone(node);

        self.install_hook(target, dependency, position, move |checker| {
            checker.resume_var_decl(closure, node)
        });
    }

    fn resume_var_decl(&mut self, closure: ClosureId, node: Shared<VarDeclStmt>) -> Result<(), Error> {
        let position = node.borrow().span.start.clone();
        let datatype = {
            let mut decl = node.borrow_mut();
            let datatype = DatatypeResolver::new(&self.closures, closure, &position)
                .resolve(&mut decl.assigned_value)?;
            settle_var_type(&mut decl, datatype.clone(), &position)?;
            datatype
        };

        if let Some(dependency) = datatype.pending_on() {
            self.defer_var_decl(closure, &node, dependency, position.clone());
        }

        let variable = node.borrow().as_variable();
        self.update_variable(closure, variable, &position)
    }

    fn check_reassignment(
        &mut self,
        closure: ClosureId,
        node: &Shared<ReAssignmentStmt>,
        waiting: &Waiting,
    ) -> Result<(), Error> {
        let position = node.borrow().span.start.clone();
        let dependencies = {
            let mut stmt = node.borrow_mut();
            let stmt = &mut *stmt;

            let root = stmt.path.root();
            match self.closures.lookup(closure, root) {
                None => {
                    return Err(Error::new(
                        ErrorImpl::UnknownSymbol {
                            variable: root.to_string(),
                        },
                        position,
                    ))
                }
                Some(variable)
                    if variable.is_constant && matches!(stmt.path, AssignmentPath::Symbol(_)) =>
                {
                    return Err(Error::new(
                        ErrorImpl::ReassignToConst {
                            variable: root.to_string(),
                        },
                        position,
                    ))
                }
                Some(_) => {}
            }

            let resolver = DatatypeResolver::new(&self.closures, closure, &position);
            let path_type = resolver.resolve_path(&mut stmt.path)?;
            let value_type = resolver.resolve(&mut stmt.assigned_value)?;

            if stmt.operator != AssignmentOperator::Assign
                && !path_type.is_pending()
                && path_type != DataType::Number
            {
                return Err(Error::new(
                    ErrorImpl::TypeMismatch {
                        expected: DataType::Number.to_string(),
                        received: path_type.to_string(),
                    },
                    position,
                ));
            }

            if !path_type.is_pending() && !value_type.is_pending() && path_type != value_type {
                return Err(Error::new(
                    ErrorImpl::TypeMismatch {
                        expected: path_type.to_string(),
                        received: value_type.to_string(),
                    },
                    position,
                ));
            }

            let dependencies: Vec<String> = [path_type, value_type]
                .iter()
                .filter_map(|datatype| datatype.pending_on().map(str::to_string))
                .collect();
            dependencies
        };

        for dependency in dependencies {
            // Already covered by a hook that has not fired yet.
            if !waiting.borrow_mut().insert(dependency.clone()) {
                continue;
            }

            let target = self.hook_target(closure, &dependency, None);
            let node = Rc::clone(node);
            let waiting = Rc::clone(waiting);
            let fired = dependency.clone();
            self.install_hook(target, &dependency, position.clone(), move |checker| {
                waiting.borrow_mut().remove(&fired);
                checker.check_reassignment(closure, &node, &waiting)
            });
        }

        Ok(())
    }

    fn check_if(
        &mut self,
        closure: ClosureId,
        block: CondBlock,
        cursor: &mut Cursor,
        importer: &mut dyn DepImporter,
    ) -> Result<AnalyzedStmt, Error> {
        let if_block = self.check_cond_block(closure, block, importer)?;

        let mut else_if_blocks = Vec::new();
        while let Some(Stmt::ElseIf(block)) = cursor.next_if(|stmt| matches!(stmt, Stmt::ElseIf(_)))
        {
            else_if_blocks.push(self.check_cond_block(closure, block, importer)?);
        }

        let else_block = match cursor.next_if(|stmt| matches!(stmt, Stmt::Else(_))) {
            Some(Stmt::Else(ElseStmt { body, span })) => {
                let child = self.closures.create(Some(closure), ClosureOptions::block());
                Some(AnalyzedElseBlock {
                    body: self.check_stmts(child, body, importer)?,
                    span,
                })
            }
            _ => None,
        };

        debug!(
            "folded if chain with {} else if blocks, else block: {}",
            else_if_blocks.len(),
            else_block.is_some()
        );

        Ok(AnalyzedStmt::If {
            if_block,
            else_if_blocks,
            else_block,
        })
    }

    fn check_cond_block(
        &mut self,
        closure: ClosureId,
        block: CondBlock,
        importer: &mut dyn DepImporter,
    ) -> Result<AnalyzedCondBlock, Error> {
        let CondBlock {
            mut condition,
            body,
            span,
        } = block;
        let position = span.start.clone();

        let datatype =
            DatatypeResolver::new(&self.closures, closure, &position).resolve(&mut condition)?;
        if datatype != DataType::Boolean {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: DataType::Boolean.to_string(),
                    received: datatype.to_string(),
                },
                position,
            ));
        }

        let child = self.closures.create(Some(closure), ClosureOptions::block());
        let body = self.check_stmts(child, body, importer)?;

        Ok(AnalyzedCondBlock {
            condition: TypedExpr::from_expr(condition, &position)?,
            body,
            span,
        })
    }

    fn check_while(
        &mut self,
        closure: ClosureId,
        stmt: WhileStmt,
        importer: &mut dyn DepImporter,
    ) -> Result<AnalyzedStmt, Error> {
        let WhileStmt {
            mut condition,
            body,
            span,
        } = stmt;
        let position = span.start.clone();

        let datatype =
            DatatypeResolver::new(&self.closures, closure, &position).resolve(&mut condition)?;
        match self.options.loop_condition {
            LoopCondition::LiteralTrue => {
                if !matches!(condition, Expr::Boolean(BooleanExpr { value: true })) {
                    return Err(Error::new(ErrorImpl::InvalidLoopCondition, position));
                }
            }
            LoopCondition::Boolean => {
                if datatype != DataType::Boolean {
                    return Err(Error::new(
                        ErrorImpl::TypeMismatch {
                            expected: DataType::Boolean.to_string(),
                            received: datatype.to_string(),
                        },
                        position,
                    ));
                }
            }
        }

        let child = self.closures.create(Some(closure), ClosureOptions::loop_body());
        let body = self.check_stmts(child, body, importer)?;

        Ok(AnalyzedStmt::While {
            condition: TypedExpr::from_expr(condition, &position)?,
            body,
            span,
        })
    }

    fn check_loop_control(
        &self,
        closure: ClosureId,
        statement: &str,
        span: &Span,
    ) -> Result<(), Error> {
        if self.closures.is_inside_loop(closure) {
            Ok(())
        } else {
            Err(Error::new(
                ErrorImpl::ControlOutsideLoop {
                    statement: statement.to_string(),
                },
                span.start.clone(),
            ))
        }
    }

    fn check_fn_decl(
        &mut self,
        closure: ClosureId,
        decl: FnDeclStmt,
        importer: &mut dyn DepImporter,
    ) -> Result<AnalyzedStmt, Error> {
        let FnDeclStmt {
            identifier,
            parameters,
            return_type,
            body,
            export,
            span,
        } = decl;
        let position = span.start.clone();

        if !self.closures.is_top_level(closure) {
            return Err(Error::new(
                ErrorImpl::FunctionNotTopLevel {
                    function: identifier,
                },
                position,
            ));
        }

        let mut seen = HashSet::new();
        for (name, datatype) in &parameters {
            if !seen.insert(name.as_str()) {
                return Err(Error::new(
                    ErrorImpl::DuplicateParameter {
                        parameter: name.clone(),
                    },
                    position,
                ));
            }
            if !datatype.is_concrete() {
                return Err(Error::new(
                    ErrorImpl::MissingTypeAnnotation {
                        parameter: name.clone(),
                    },
                    position,
                ));
            }
        }

        let function_closure = self
            .closures
            .create(Some(closure), ClosureOptions::function(return_type));
        for (name, datatype) in &parameters {
            self.define_variable(
                function_closure,
                Variable::new(name, datatype.clone(), false, false),
                &position,
            )?;
        }

        let body = self.check_stmts(function_closure, body, importer)?;

        let return_type = match self.closures.function_return_type(function_closure) {
            Some(DataType::NotCalculated) | None => DataType::Void,
            Some(return_type) => return_type.clone(),
        };
        let pending = return_type.is_pending();
        let header = share(FnHeader {
            identifier,
            parameters,
            return_type,
            export,
            span,
        });

        if pending {
            self.defer_fn_return(closure, function_closure, &header, position.clone())?;
        }

        let variable = header.borrow().as_variable();
        self.define_variable(closure, variable, &position)?;

        Ok(AnalyzedStmt::FnDecl { header, body })
    }

    fn defer_fn_return(
        &mut self,
        closure: ClosureId,
        function_closure: ClosureId,
        header: &Shared<FnHeader>,
        position: Position,
    ) -> Result<(), Error> {
        let header = Rc::clone(header);
        self.closures.add_return_type_hook(
            function_closure,
            Box::new(move |checker: &mut TypeChecker| {
                checker.resume_fn_return(closure, function_closure, header)
            }),
            &position,
        )
    }

    fn resume_fn_return(
        &mut self,
        closure: ClosureId,
        function_closure: ClosureId,
        header: Shared<FnHeader>,
    ) -> Result<(), Error> {
        let return_type = self
            .closures
            .function_return_type(function_closure)
            .cloned()
            .unwrap_or(DataType::Void);
        let position = header.borrow().span.start.clone();
        header.borrow_mut().return_type = return_type.clone();

        if return_type.is_pending() {
            return self.defer_fn_return(closure, function_closure, &header, position);
        }

        let variable = header.borrow().as_variable();
        self.update_variable(closure, variable, &position)
    }

    fn check_return(&mut self, closure: ClosureId, node: &Shared<ReturnStmt>) -> Result<(), Error> {
        let position = node.borrow().span.start.clone();
        let Some(current) = self.closures.function_return_type(closure).cloned() else {
            return Err(Error::new(ErrorImpl::ReturnOutsideFunction, position));
        };

        let datatype = {
            let mut stmt = node.borrow_mut();
            let datatype = match stmt.value.as_mut() {
                Some(value) => {
                    DatatypeResolver::new(&self.closures, closure, &position).resolve(value)?
                }
                None => DataType::Void,
            };
            datatype
        };

        if let Some(dependency) = datatype.pending_on() {
            let target = self.hook_target(closure, dependency, None);
            let hook_node = Rc::clone(node);
            self.install_hook(target, dependency, position.clone(), move |checker| {
                checker.check_return(closure, &hook_node)
            });

            if !current.is_concrete() {
                self.set_function_return_type(closure, datatype, &position)?;
            }
            return Ok(());
        }

        if !current.is_concrete() {
            self.set_function_return_type(closure, datatype, &position)
        } else if current != datatype {
            Err(Error::new(
                ErrorImpl::ReturnTypeMismatch {
                    expected: current.to_string(),
                    received: datatype.to_string(),
                },
                position,
            ))
        } else {
            Ok(())
        }
    }

    fn check_import(
        &mut self,
        closure: ClosureId,
        stmt: ImportStmt,
        importer: &mut dyn DepImporter,
    ) -> Result<AnalyzedStmt, Error> {
        let position = stmt.span.start.clone();
        if !self.closures.is_top_level(closure) {
            return Err(Error::new(ErrorImpl::ImportNotTopLevel, position));
        }

        let mut identifiers = Vec::with_capacity(stmt.identifiers.len());
        for name in stmt.identifiers {
            let datatype = importer.get_datatype_from(&name, &stmt.from, &position)?;
            let imported = Type::from_datatype(datatype.clone(), &position)?;
            self.define_variable(closure, Variable::new(&name, datatype, true, false), &position)?;
            identifiers.push((name, imported));
        }

        Ok(AnalyzedStmt::Import {
            identifiers,
            from: stmt.from,
            span: stmt.span,
        })
    }

    fn check_expression(
        &mut self,
        closure: ClosureId,
        node: &Shared<ExpressionStmt>,
    ) -> Result<(), Error> {
        let position = node.borrow().span.start.clone();
        let datatype = {
            let mut stmt = node.borrow_mut();
            let datatype = DatatypeResolver::new(&self.closures, closure, &position)
                .resolve(&mut stmt.expression)?;
            datatype
        };

        if let Some(dependency) = datatype.pending_on() {
            let target = self.hook_target(closure, dependency, None);
            let node = Rc::clone(node);
            self.install_hook(target, dependency, position, move |checker| {
                checker.check_expression(closure, &node)
            });
        }

        Ok(())
    }

    /// Fails on the first symbol that hooks are still waiting on.
    pub fn check_unresolved(&self) -> Result<(), Error> {
        match self.closures.first_unresolved() {
            Some((name, position)) => Err(Error::new(
                ErrorImpl::UnresolvedReference {
                    variable: name.to_string(),
                },
                position.clone(),
            )),
            None => Ok(()),
        }
    }
}

/// Exported top-level declarations, in declaration order.
pub fn collect_exports(typed_ast: &[TypedStmt]) -> IndexMap<String, Type> {
    typed_ast
        .iter()
        .filter_map(|stmt| match stmt {
            TypedStmt::VarDecl(decl) if decl.export => {
                Some((decl.identifier.clone(), decl.var_type.clone()))
            }
            TypedStmt::FnDecl(decl) if decl.export => Some((
                decl.identifier.clone(),
                Type::Function {
                    arguments: decl.parameters.clone(),
                    return_type: Box::new(decl.return_type.clone()),
                },
            )),
            _ => None,
        })
        .collect()
}

/// Checks a whole file, resolving imports through the built-in module
/// registry.
pub fn type_check(ast: Vec<Stmt>, options: TypeCheckerOptions) -> Result<TypeCheckOutput, Error> {
    type_check_with_importer(ast, &mut ModuleRegistry::new(), options)
}

pub fn type_check_with_importer(
    ast: Vec<Stmt>,
    importer: &mut dyn DepImporter,
    options: TypeCheckerOptions,
) -> Result<TypeCheckOutput, Error> {
    debug!("type checking {} top level statements", ast.len());

    let mut type_checker = TypeChecker::new(options);
    let root = type_checker.root;
    let analyzed = type_checker.check_stmts(root, ast, importer)?;

    if type_checker.options.report_unresolved_references {
        type_checker.check_unresolved()?;
    }
    debug!(
        "analysis finished with {} closures",
        type_checker.closures.len()
    );
    drop(type_checker);

    let typed_ast = into_typed(analyzed)?;
    let exported_variables = collect_exports(&typed_ast);

    Ok(TypeCheckOutput {
        typed_ast,
        exported_variables,
    })
}
