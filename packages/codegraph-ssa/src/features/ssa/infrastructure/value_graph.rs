/*
 * Value Graph
 *
 * Arena owning every SSA value of one unit. Other structures hold `ValueId`s.
 *
 * Constants are interned: identical literals are the same value, which lets
 * trivial-phi removal collapse `phi[1, 1]` to `1`.
 *
 * Collapsed phis stay in the arena as `Forward` entries; `resolve` follows
 * the chain so readers never observe a removed phi.
 */

use ahash::AHashMap as HashMap;

use crate::features::ssa::domain::{ConstValue, Value, ValueId, ValueKind};
use crate::features::type_resolution::domain::Type;
use crate::shared::models::Span;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Number(u64),
    String(String),
    Boolean(bool),
    Null,
}

impl ConstKey {
    fn of(value: &ConstValue) -> Self {
        match value {
            // -0.0 and 0.0 intern separately; NaN payloads collapse
            ConstValue::Number(n) if n.is_nan() => Self::Number(f64::NAN.to_bits()),
            ConstValue::Number(n) => Self::Number(n.to_bits()),
            ConstValue::String(s) => Self::String(s.clone()),
            ConstValue::Boolean(b) => Self::Boolean(*b),
            ConstValue::Null => Self::Null,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ValueGraph {
    values: Vec<Value>,
    constants: HashMap<ConstKey, ValueId>,
}

impl ValueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: Value) -> ValueId {
        let id = ValueId::from_index(self.values.len());
        self.values.push(value);
        id
    }

    /// Interned constant
    pub fn constant(&mut self, value: ConstValue, range: Span) -> ValueId {
        let key = ConstKey::of(&value);
        if let Some(&id) = self.constants.get(&key) {
            return id;
        }
        let ty = match &value {
            ConstValue::Number(_) => Type::number(),
            ConstValue::String(_) => Type::string(),
            ConstValue::Boolean(_) => Type::boolean(),
            ConstValue::Null => Type::null(),
        };
        let id = self.add(Value::new(ValueKind::Const(value), range).with_type(Some(ty)));
        self.constants.insert(key, id);
        id
    }

    /// Follow forwarding entries to the live value
    pub fn resolve(&self, mut id: ValueId) -> ValueId {
        while let Some(Value {
            kind: ValueKind::Forward(target),
            ..
        }) = self.values.get(id.index())
        {
            id = *target;
        }
        id
    }

    /// Raw entry, possibly a forward
    pub fn raw(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.index())
    }

    /// Live value behind `id`
    pub fn get(&self, id: ValueId) -> Option<&Value> {
        self.values.get(self.resolve(id).index())
    }

    pub fn get_mut(&mut self, id: ValueId) -> Option<&mut Value> {
        let id = self.resolve(id);
        self.values.get_mut(id.index())
    }

    /// Replace `from` by `to` for every reader
    pub fn forward(&mut self, from: ValueId, to: ValueId) {
        if self.resolve(to) == from {
            return;
        }
        if let Some(value) = self.values.get_mut(from.index()) {
            value.kind = ValueKind::Forward(to);
        }
    }

    pub fn ty(&self, id: ValueId) -> Option<&Type> {
        self.get(id).and_then(Value::ty)
    }

    /// Refine the type of a value
    pub fn set_type(&mut self, id: ValueId, ty: Option<Type>) {
        if let Some(value) = self.get_mut(id) {
            value.ty = ty;
        }
    }

    /// Record the first variable name a value is bound to
    pub fn name_if_unnamed(&mut self, id: ValueId, name: &str) {
        if let Some(value) = self.get_mut(id) {
            if value.name.is_none() && !matches!(value.kind, ValueKind::Const(_)) {
                value.name = Some(name.to_string());
            }
        }
    }

    /// Resolved operands of `id`
    pub fn operands(&self, id: ValueId) -> Vec<ValueId> {
        self.get(id)
            .map(|value| value.operands().into_iter().map(|op| self.resolve(op)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Live (non-forwarded) values
    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &Value)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !matches!(v.kind, ValueKind::Forward(_)))
            .map(|(i, v)| (ValueId::from_index(i), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::UndefinedKind;

    #[test]
    fn test_constants_are_interned() {
        let mut graph = ValueGraph::new();
        let a = graph.constant(ConstValue::Number(1.0), Span::zero());
        let b = graph.constant(ConstValue::Number(1.0), Span::new(3, 0, 3, 1));
        let c = graph.constant(ConstValue::String("1".into()), Span::zero());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.ty(a), Some(&Type::number()));
    }

    #[test]
    fn test_forward_chain_resolves() {
        let mut graph = ValueGraph::new();
        let target = graph.constant(ConstValue::Boolean(true), Span::zero());
        let first = graph.add(Value::new(
            ValueKind::Undefined(UndefinedKind::Default),
            Span::zero(),
        ));
        let second = graph.add(Value::new(
            ValueKind::Undefined(UndefinedKind::Default),
            Span::zero(),
        ));
        graph.forward(second, first);
        graph.forward(first, target);
        assert_eq!(graph.resolve(second), target);
        assert_eq!(graph.iter().count(), 1);
    }

    #[test]
    fn test_forward_to_self_is_ignored() {
        let mut graph = ValueGraph::new();
        let v = graph.add(Value::new(
            ValueKind::Undefined(UndefinedKind::Default),
            Span::zero(),
        ));
        graph.forward(v, v);
        assert_eq!(graph.resolve(v), v);
    }

    #[test]
    fn test_constants_keep_no_name() {
        let mut graph = ValueGraph::new();
        let c = graph.constant(ConstValue::Number(2.0), Span::zero());
        graph.name_if_unnamed(c, "a");
        assert_eq!(graph.get(c).and_then(|v| v.name.clone()), None);
    }
}
