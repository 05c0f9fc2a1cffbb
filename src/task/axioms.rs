use crate::task::operator::Operator;
use crate::task::variable::VarValue;
use std::collections::HashSet;

/// Assigns each axiom a stratum number so that applying axioms in
/// non-decreasing stratum order and iterating to a fixpoint within that
/// order reaches the same fixpoint as an unordered derivation would.
///
/// An axiom's stratum is one more than the highest stratum of any *derived*
/// variable (i.e. a variable that is the postcondition of some axiom)
/// appearing in its conditions; axioms that only depend on non-derived
/// variables get stratum 0.
pub fn compute_axiom_layers(axioms: &[Operator]) -> Vec<usize> {
    let derived_vars: HashSet<_> = axioms
        .iter()
        .flat_map(|axiom| axiom.effects.iter().map(|e| e.postcondition.var))
        .collect();

    let mut layer_of_var: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
    let mut layers = vec![0usize; axioms.len()];

    // Iterate until the assignment stabilises; with n axioms this converges
    // in at most n passes since each pass can only raise a layer.
    for _ in 0..=axioms.len() {
        let mut changed = false;
        for (index, axiom) in axioms.iter().enumerate() {
            let mut layer = 0usize;
            for effect in &axiom.effects {
                for condition in &effect.conditions {
                    if derived_vars.contains(&condition.var) {
                        let dep_layer = layer_of_var.get(&condition.var).copied().unwrap_or(0);
                        layer = layer.max(dep_layer + 1);
                    }
                }
                let current = layer_of_var.entry(effect.postcondition.var).or_insert(0);
                if layer > *current {
                    *current = layer;
                    changed = true;
                }
            }
            layers[index] = layer;
        }
        if !changed {
            break;
        }
    }

    layers
}

/// Applies all axioms to a state until a fixpoint is reached, iterating in
/// non-decreasing stratum order on every pass. `layers[i]` is the stratum of
/// `axioms[i]` as computed by [`compute_axiom_layers`].
pub fn apply_axioms(state: &mut [VarValue], axioms: &[Operator], layers: &[usize]) {
    let mut order: Vec<usize> = (0..axioms.len()).collect();
    order.sort_by_key(|&i| layers[i]);

    loop {
        let mut changed = false;
        for &index in &order {
            let axiom = &axioms[index];
            for effect in &axiom.effects {
                if effect.is_enabled(state) && state[effect.postcondition.var] != effect.postcondition.value {
                    state[effect.postcondition.var] = effect.postcondition.value;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}
