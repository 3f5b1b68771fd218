//! Options controlling how strict the type checker is.

/// What a `while` condition may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCondition {
    /// Only the literal `true`.
    #[default]
    LiteralTrue,
    /// Any expression of type boolean.
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckerOptions {
    pub loop_condition: LoopCondition,
    /// Fail with `UnresolvedReference` when a deferred lookup is still
    /// waiting at the end of the file.
    pub report_unresolved_references: bool,
}

impl Default for TypeCheckerOptions {
    fn default() -> Self {
        TypeCheckerOptions {
            loop_condition: LoopCondition::default(),
            report_unresolved_references: true,
        }
    }
}

impl TypeCheckerOptions {
    pub fn with_loop_condition(mut self, loop_condition: LoopCondition) -> Self {
        self.loop_condition = loop_condition;
        self
    }

    pub fn with_report_unresolved_references(mut self, report: bool) -> Self {
        self.report_unresolved_references = report;
        self
    }
}
