/*
 * On-demand phi construction (Braun et al., 2013)
 *
 * "Simple and Efficient Construction of Static Single Assignment Form"
 *
 * ```text
 * read_variable(var, block):
 *     if current_def[var][block] exists  → return it
 *     if block not sealed               → incomplete phi, completed on seal
 *     elif no predecessors              → undefined / captured value
 *     elif one predecessor              → read_variable(var, pred)
 *     else                              → phi; write it first (breaks
 *                                          cycles); add operands; try to
 *                                          remove it if trivial
 * ```
 *
 * A phi is trivial when every operand, ignoring self references, resolves
 * to the same value. It is replaced by that value (a `Forward` entry) and
 * every phi that used it is re-checked, recursively.
 */

use crate::features::ssa::domain::{BlockId, Phi, UndefinedKind, Value, ValueId, ValueKind, VariableId};
use crate::shared::models::Span;

use super::program::Program;

impl Program {
    pub fn write_variable(&mut self, var: VariableId, block: BlockId, value: ValueId) {
        self.current_def.insert((var, block), value);
    }

    /// Definition of `var` reaching the end of `block`
    pub fn read_variable(&mut self, var: VariableId, block: BlockId) -> ValueId {
        if let Some(&value) = self.current_def.get(&(var, block)) {
            return self.graph.resolve(value);
        }
        let value = self.read_variable_recursive(var, block);
        self.graph.resolve(value)
    }

    /// Whether any definition of `var` is recorded in `block` itself
    pub fn has_local_definition(&self, var: VariableId, block: BlockId) -> bool {
        self.current_def.contains_key(&(var, block))
    }

    fn read_variable_recursive(&mut self, var: VariableId, block: BlockId) -> ValueId {
        let (sealed, preds) = match self.block(block) {
            Some(b) => (b.sealed, b.preds.clone()),
            None => return self.entry_value(var, block),
        };

        let value = if !sealed {
            let phi = self.new_phi(var, block);
            self.incomplete_phis
                .entry(block)
                .or_default()
                .push((var, phi));
            phi
        } else if preds.is_empty() {
            self.entry_value(var, block)
        } else if preds.len() == 1 {
            self.read_variable(var, preds[0])
        } else {
            let phi = self.new_phi(var, block);
            self.write_variable(var, block, phi);
            self.add_phi_operands(var, phi)
        };
        self.write_variable(var, block, value);
        value
    }

    fn new_phi(&mut self, var: VariableId, block: BlockId) -> ValueId {
        let name = self.scopes.variable_name(var).to_string();
        let phi = self.graph.add(
            Value::new(
                ValueKind::Phi(Phi {
                    variable: var,
                    block,
                    operands: Vec::new(),
                    witness: [None, None],
                }),
                Span::zero(),
            )
            .with_name(name),
        );
        if let Some(b) = self.block_mut(block) {
            b.phis.push(phi);
        }
        if let Some(v) = self.graph.get_mut(phi) {
            v.block = Some(block);
        }
        phi
    }

    fn add_phi_operands(&mut self, var: VariableId, phi: ValueId) -> ValueId {
        let Some(block) = self
            .graph
            .get(phi)
            .and_then(Value::as_phi)
            .map(|p| p.block)
        else {
            return self.graph.resolve(phi);
        };
        let preds = self.predecessors(block).to_vec();

        self.filling.insert(phi);
        let mut operands = Vec::with_capacity(preds.len());
        for pred in preds {
            let operand = self.read_variable(var, pred);
            if operand != phi && self.graph.get(operand).map(Value::is_phi).unwrap_or(false) {
                self.phi_users.entry(operand).or_default().push(phi);
            }
            operands.push(operand);
        }
        self.filling.remove(&phi);

        let ty = operands
            .iter()
            .filter(|&&op| op != phi)
            .find_map(|&op| self.graph.ty(op).cloned());
        if let Some(ValueKind::Phi(p)) = self.graph.get_mut(phi).map(|v| &mut v.kind) {
            p.operands = operands;
        }
        if ty.is_some() {
            self.graph.set_type(phi, ty);
        }

        self.try_remove_trivial_phi(phi)
    }

    /// Collapse `phi` if all operands agree; returns the surviving value
    pub fn try_remove_trivial_phi(&mut self, phi: ValueId) -> ValueId {
        let phi = self.graph.resolve(phi);
        if self.filling.contains(&phi) {
            return phi;
        }
        let (operands, variable, block, witness) = match self.graph.get(phi).map(|v| &v.kind) {
            Some(ValueKind::Phi(p)) => (p.operands.clone(), p.variable, p.block, p.witness),
            _ => return phi,
        };

        // Two distinct live witnesses prove the phi non-trivial
        if let [Some(a), Some(b)] = witness {
            let (a, b) = (self.graph.resolve(a), self.graph.resolve(b));
            if a != b && a != phi && b != phi {
                return phi;
            }
        }

        let mut same: Option<ValueId> = None;
        let mut different: Option<ValueId> = None;
        for operand in operands {
            let operand = self.graph.resolve(operand);
            if Some(operand) == same || operand == phi {
                continue;
            }
            if same.is_some() {
                different = Some(operand);
                break;
            }
            same = Some(operand);
        }

        if let Some(ValueKind::Phi(p)) = self.graph.get_mut(phi).map(|v| &mut v.kind) {
            p.witness = [same, different];
        }
        if different.is_some() {
            return phi;
        }

        let replacement = match same {
            Some(value) => value,
            // unreachable or self-referential only
            None => {
                let name = self.scopes.variable_name(variable).to_string();
                self.undefined(UndefinedKind::Default, &name, Span::zero())
            }
        };

        if let Some(b) = self.block_mut(block) {
            b.phis.retain(|&p| p != phi);
        }
        self.graph.forward(phi, replacement);

        #[cfg(feature = "trace")]
        tracing::trace!(phi = %phi, replacement = %replacement, "Removed trivial phi");

        let users = self.phi_users.remove(&phi).unwrap_or_default();
        for user in users {
            if self.graph.resolve(user) != replacement {
                self.try_remove_trivial_phi(user);
            }
        }
        self.graph.resolve(replacement)
    }

    /// Mark all predecessors of `block` known and complete its pending phis
    pub fn seal_block(&mut self, block: BlockId) {
        if self.block(block).map(|b| b.sealed).unwrap_or(true) {
            return;
        }
        let pending = self.incomplete_phis.remove(&block).unwrap_or_default();
        for (var, phi) in pending {
            self.add_phi_operands(var, phi);
        }
        if let Some(b) = self.block_mut(block) {
            b.sealed = true;
        }
    }

    pub fn is_sealed(&self, block: BlockId) -> bool {
        self.block(block).map(|b| b.sealed).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::features::ssa::domain::{ConstValue, FunctionId, ValueKind};
    use crate::features::ssa::infrastructure::program::Program;
    use crate::shared::models::Span;

    fn setup() -> (Program, FunctionId) {
        let mut program = Program::new();
        let main = program.create_function("main", None, None, Span::zero());
        (program, main)
    }

    fn number(program: &mut Program, n: f64) -> crate::features::ssa::domain::ValueId {
        program.graph.constant(ConstValue::Number(n), Span::zero())
    }

    #[test]
    fn test_diamond_creates_phi_in_predecessor_order() {
        let (mut p, main) = setup();
        let scope = p.function(main).unwrap().root_scope;
        let var = p.scopes.declare(scope, "a");
        let entry = p.function(main).unwrap().entry;
        let then_b = p.new_block(main, "then");
        let else_b = p.new_block(main, "else");
        let exit = p.new_block(main, "exit");
        p.add_edge(entry, then_b);
        p.add_edge(entry, else_b);
        p.add_edge(then_b, exit);
        p.add_edge(else_b, exit);
        for b in [then_b, else_b] {
            p.seal_block(b);
        }

        let one = number(&mut p, 1.0);
        let two = number(&mut p, 2.0);
        p.write_variable(var, entry, one);
        p.write_variable(var, then_b, two);
        p.seal_block(exit);

        let merged = p.read_variable(var, exit);
        let phi = p.graph.get(merged).and_then(|v| v.as_phi()).cloned().unwrap();
        assert_eq!(phi.operands, vec![two, one]);
        assert_eq!(p.block_phis(exit), vec![merged]);
    }

    #[test]
    fn test_same_value_on_both_edges_collapses() {
        let (mut p, main) = setup();
        let scope = p.function(main).unwrap().root_scope;
        let var = p.scopes.declare(scope, "a");
        let entry = p.function(main).unwrap().entry;
        let left = p.new_block(main, "left");
        let right = p.new_block(main, "right");
        let exit = p.new_block(main, "exit");
        p.add_edge(entry, left);
        p.add_edge(entry, right);
        p.add_edge(left, exit);
        p.add_edge(right, exit);
        p.seal_block(left);
        p.seal_block(right);
        p.seal_block(exit);

        let a = number(&mut p, 5.0);
        let b = number(&mut p, 5.0);
        p.write_variable(var, left, a);
        p.write_variable(var, right, b);

        assert_eq!(p.read_variable(var, exit), a);
        assert!(p.block_phis(exit).is_empty());
    }

    #[test]
    fn test_unsealed_loop_header_phi() {
        let (mut p, main) = setup();
        let scope = p.function(main).unwrap().root_scope;
        let var = p.scopes.declare(scope, "i");
        let entry = p.function(main).unwrap().entry;
        let header = p.new_block(main, "header");
        let latch = p.new_block(main, "latch");
        p.add_edge(entry, header);

        let zero = number(&mut p, 0.0);
        p.write_variable(var, entry, zero);
        let in_header = p.read_variable(var, header);
        assert!(p.graph.get(in_header).unwrap().is_phi());

        p.add_edge(header, latch);
        p.seal_block(latch);
        let one = number(&mut p, 1.0);
        let next = p.graph.add(crate::features::ssa::domain::Value::new(
            ValueKind::BinOp {
                op: crate::features::syntax::domain::operators::BinaryOperator::Add,
                lhs: in_header,
                rhs: one,
            },
            Span::zero(),
        ));
        p.write_variable(var, latch, next);
        p.add_edge(latch, header);
        p.seal_block(header);

        let phi = p.graph.get(in_header).and_then(|v| v.as_phi()).cloned().unwrap();
        assert_eq!(phi.operands, vec![zero, next]);
    }

    #[test]
    fn test_loop_without_writes_collapses_to_preheader_value() {
        let (mut p, main) = setup();
        let scope = p.function(main).unwrap().root_scope;
        let var = p.scopes.declare(scope, "x");
        let entry = p.function(main).unwrap().entry;
        let header = p.new_block(main, "header");
        let body = p.new_block(main, "body");
        p.add_edge(entry, header);

        let seven = number(&mut p, 7.0);
        p.write_variable(var, entry, seven);
        let in_header = p.read_variable(var, header);

        p.add_edge(header, body);
        p.seal_block(body);
        let in_body = p.read_variable(var, body);
        p.add_edge(body, header);
        p.seal_block(header);

        assert_eq!(p.graph.resolve(in_header), seven);
        assert_eq!(p.graph.resolve(in_body), seven);
        assert_eq!(p.read_variable(var, body), seven);
    }

    #[test]
    fn test_read_without_definition_is_named_undefined() {
        let (mut p, main) = setup();
        let scope = p.function(main).unwrap().root_scope;
        let var = p.scopes.declare(scope, "ghost");
        let entry = p.function(main).unwrap().entry;
        let value = p.read_variable(var, entry);
        let v = p.graph.get(value).unwrap();
        assert!(v.is_undefined());
        assert_eq!(v.name.as_deref(), Some("ghost"));
        // memoized
        assert_eq!(p.read_variable(var, entry), value);
    }
}
