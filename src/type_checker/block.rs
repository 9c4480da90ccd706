use crate::{
    ast::ast::NodeId,
    errors::errors::{CheckError, CheckResult, InternalError},
    types::types::Type,
};

use super::{scope::ScopeKind, type_checker::Checker};

impl<'a> Checker<'a> {
    /// Checks `{ ... }` in a fresh scope nested in the current one.
    ///
    /// The block's type is the type of its last statement, unit when that
    /// statement is a declaration or the block is empty.
    pub(crate) fn check_block(&mut self, items: &[NodeId]) -> CheckResult<Type> {
        let scope = self.module.new_scope(ScopeKind::Block, self.scope);

        let saved = self.enter_scope(scope);
        let result = self.check_statements(items);
        self.leave_scope(saved);

        match result? {
            Some(ty) => Ok(ty),
            None => Err(CheckError::Reported),
        }
    }

    /// Checks statements top-down in the current scope.
    ///
    /// Function, alias, struct and enum declarations are declared up front
    /// so that earlier statements can refer to them. A failing statement is
    /// recorded and checking carries on with the next one.
    ///
    /// # Returns
    ///
    /// The running type after the last statement, or `None` if the last
    /// statement failed.
    pub(crate) fn check_statements(
        &mut self,
        items: &[NodeId],
    ) -> Result<Option<Type>, InternalError> {
        self.predeclare(items)?;

        let ast = self.ast;
        let mut running = Some(Type::unit());

        for &item in items {
            if ast.kind(item).is_decl() {
                if let Err(error) = self.check_decl(item) {
                    self.report(error)?;
                }
                running = Some(Type::unit());
                continue;
            }

            match self.type_of(item) {
                Ok(ty) => running = Some(ty),
                Err(error) => {
                    self.report(error)?;
                    running = None;
                }
            }
        }

        Ok(running)
    }
}
