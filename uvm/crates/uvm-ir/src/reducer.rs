//! PHI elimination: lower a CFG with φ-instructions into an equivalent
//! CFG with none, by duplicating φ-bearing blocks once per predecessor
//! edge ("fork blocks") and remapping operands and successor labels.
//!
//! See spec.md §4.5 for the four-step algorithm this follows directly:
//! classify blocks, create forks, remap edges, preserve the entry.

use crate::cfg::{BasicBlock, Cfg};
use crate::error::{ReducerError, Result};
use crate::ids::{BlockId, ValueId};
use crate::instr::Instruction;
use crate::transition::Transition;
use uvm_util::{FxHashMap, Symbol};

/// Metadata about a block in the *output* CFG: which original block it
/// impersonates when its own outgoing edges are remapped in step 3. For
/// a plain copy this is the block itself; for every fork of `B` it is
/// also `B` (not the predecessor the fork was created for) — both
/// represent `B` as far as `B`'s downstream successors are concerned.
struct Origin {
    id: BlockId,
    name: Symbol,
}

/// Lower `cfg` into a φ-free CFG. Pure function: no global state, safe
/// to call concurrently on distinct inputs.
pub fn reduce(cfg: &Cfg) -> Result<Cfg> {
    let entry = cfg.entry_block().ok_or_else(|| ReducerError::InvalidIr {
        function: cfg.function,
        reason: "entry block id not present in CFG".to_string(),
    })?;
    if entry.has_phi() {
        return Err(ReducerError::IllegalEntryPhi { function: cfg.function });
    }

    let predecessors = cfg.predecessors();
    let mut next_fork_id = cfg.max_block_id().map(|m| m + 1).unwrap_or(0);

    let mut output = Cfg::new(cfg.function, cfg.entry);
    let mut origins: FxHashMap<BlockId, Origin> = FxHashMap::default();
    let mut fork_map: FxHashMap<Transition, BlockId> = FxHashMap::default();

    for block in cfg.blocks.values() {
        let valid_preds = ordered_phi_predecessors(block, &predecessors);

        if valid_preds.is_empty() {
            let mut copy = block.clone();
            copy.instructions.retain(|i| !i.is_phi());
            origins.insert(copy.id, Origin { id: block.id, name: block.name });
            output.insert(copy);
            continue;
        }

        for (i, pred) in valid_preds.iter().enumerate() {
            let remap = phi_remap_for_predecessor(block, *pred);
            let fork_id = BlockId(next_fork_id);
            next_fork_id += 1;

            let fork_name = Symbol::intern(&format!("{}__phi__{}", block.name, i));
            let instructions: Vec<Instruction> = block
                .instructions
                .iter()
                .filter(|i| !i.is_phi())
                .map(|i| i.clone_with_remap(&remap))
                .collect();

            let fork = BasicBlock {
                id: fork_id,
                name: fork_name,
                params: block.params.clone(),
                instructions,
            };
            origins.insert(fork_id, Origin { id: block.id, name: block.name });

            let pred_name = cfg.block(*pred).map(|b| b.name).unwrap_or(block.name);
            fork_map.insert(Transition::new(*pred, pred_name, block.id, block.name), fork_id);

            output.insert(fork);
        }
    }

    // Step 3: rewrite every successor label through the fork map, keyed
    // on the impersonated origin of the block doing the branching.
    let target_name = |id: BlockId| cfg.block(id).map(|b| b.name).unwrap_or(Symbol::intern(""));
    let new_ids: Vec<BlockId> = output.blocks.keys().copied().collect();
    for id in new_ids {
        let origin = &origins[&id];
        let (origin_id, origin_name) = (origin.id, origin.name);
        let block = output.blocks.get_mut(&id).unwrap();
        for instr in block.instructions.iter_mut() {
            instr.remap_successors(|target| {
                let key = Transition::new(origin_id, origin_name, target, target_name(target));
                fork_map.get(&key).copied().unwrap_or(target)
            });
        }
    }

    Ok(output)
}

/// Predecessors with at least one valid (reachable) φ entry into `block`,
/// in first-appearance order across the block's φ-instructions. A
/// predecessor named in a φ's value-map that isn't an actual CFG
/// predecessor of this block is silently dropped (spec.md §4.5).
fn ordered_phi_predecessors(block: &BasicBlock, predecessors: &FxHashMap<BlockId, Vec<BlockId>>) -> Vec<BlockId> {
    let real_preds = predecessors.get(&block.id).cloned().unwrap_or_default();
    let mut ordered = Vec::new();
    for phi in block.phis() {
        for (pred, _) in &phi.incoming {
            if real_preds.contains(pred) && !ordered.contains(pred) {
                ordered.push(*pred);
            }
        }
    }
    ordered
}

/// Build the `ValueId -> ValueId` substitution for cloning `block`'s
/// non-φ instructions when forking for `predecessor`: every φ result is
/// replaced by the value that predecessor supplied.
fn phi_remap_for_predecessor(block: &BasicBlock, predecessor: BlockId) -> FxHashMap<ValueId, ValueId> {
    let mut remap = FxHashMap::default();
    for phi in block.phis() {
        if let Some((_, use_box)) = phi.incoming.iter().find(|(p, _)| *p == predecessor) {
            remap.insert(phi.result, use_box.get());
        }
    }
    remap
}
