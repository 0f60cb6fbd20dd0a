/*
 * Export tables
 *
 * While a unit is lowered, exports are recorded by *binding*: a variable
 * whose final value is read at end-of-unit, or a value known at once.
 * `UnitContext::resolve` turns the bindings into the immutable `ExportTable`
 * the built unit answers queries from.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::ssa::domain::{ValueId, VariableId};
use crate::features::type_resolution::domain::Type;

/// Export name under which `export default` is recorded
pub const DEFAULT_EXPORT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportBinding {
    /// Read the variable's reaching value at end-of-unit
    Variable(VariableId),
    Value(ValueId),
}

/// Per-unit export bookkeeping
#[derive(Debug, Clone, Default)]
pub struct UnitContext {
    pub named_value_exports: BTreeMap<String, ExportBinding>,
    pub named_type_exports: BTreeMap<String, Type>,
    /// `export = value`
    pub cjs_export: Option<ValueId>,
}

impl UnitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export_value(&mut self, name: impl Into<String>, binding: ExportBinding) {
        self.named_value_exports.insert(name.into(), binding);
    }

    pub fn export_type(&mut self, name: impl Into<String>, ty: Type) {
        self.named_type_exports.insert(name.into(), ty);
    }

    /// Resolve every binding through `read`
    pub fn resolve(&self, mut read: impl FnMut(VariableId) -> ValueId) -> ExportTable {
        let values = self
            .named_value_exports
            .iter()
            .map(|(name, binding)| {
                let value = match *binding {
                    ExportBinding::Variable(var) => read(var),
                    ExportBinding::Value(value) => value,
                };
                (name.clone(), value)
            })
            .collect();
        ExportTable {
            values,
            types: self.named_type_exports.clone(),
            cjs: self.cjs_export,
        }
    }
}

/// Resolved exports of a built unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub values: BTreeMap<String, ValueId>,
    pub types: BTreeMap<String, Type>,
    pub cjs: Option<ValueId>,
}

impl ExportTable {
    /// Named export, falling back to the CommonJS export for `default`
    pub fn value(&self, name: &str) -> Option<ValueId> {
        self.values.get(name).copied().or_else(|| match name {
            DEFAULT_EXPORT => self.cjs,
            _ => None,
        })
    }

    pub fn ty(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty() && self.cjs.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reads_variables_at_the_end() {
        let mut ctx = UnitContext::new();
        ctx.export_value("a", ExportBinding::Variable(VariableId(3)));
        ctx.export_value("b", ExportBinding::Value(ValueId(9)));
        ctx.export_type("T", Type::number());

        let table = ctx.resolve(|var| ValueId(var.0 + 100));
        assert_eq!(table.value("a"), Some(ValueId(103)));
        assert_eq!(table.value("b"), Some(ValueId(9)));
        assert_eq!(table.ty("T"), Some(&Type::number()));
        assert_eq!(table.value("missing"), None);
    }

    #[test]
    fn test_cjs_export_answers_default() {
        let ctx = UnitContext {
            cjs_export: Some(ValueId(7)),
            ..UnitContext::default()
        };
        let table = ctx.resolve(|_| ValueId(0));
        assert_eq!(table.value(DEFAULT_EXPORT), Some(ValueId(7)));
        assert!(!table.is_empty());
    }
}
