use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::ai::simulation::AgentId;
use crate::ai::targeting::TargetId;

/// Agents sharing one target, with lazily recomputed slot indices.
///
/// Every membership change bumps `generation`; slot indices are only
/// trusted when `indexed_generation` matches it.
#[derive(Debug, Clone, Default)]
pub struct Squad {
    members: Vec<AgentId>,
    slots: BTreeMap<AgentId, usize>,
    generation: u64,
    indexed_generation: Option<u64>,
}

impl Squad {
    pub fn members(&self) -> &[AgentId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.members.contains(&agent)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.indexed_generation != Some(self.generation)
    }

    /// Slot from the last reindex; `None` while dirty.
    pub fn indexed_slot(&self, agent: AgentId) -> Option<usize> {
        if self.is_dirty() {
            return None;
        }
        self.slots.get(&agent).copied()
    }

    fn join(&mut self, agent: AgentId) -> bool {
        if self.contains(agent) {
            return false;
        }
        self.members.push(agent);
        self.generation += 1;
        true
    }

    fn leave(&mut self, agent: AgentId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != agent);
        let left = self.members.len() != before;
        if left {
            self.slots.remove(&agent);
            self.generation += 1;
        }
        left
    }

    /// Filter destroyed members, sort by id and number 0..N-1.
    /// Returns the members that were filtered out.
    fn reindex(&mut self, destroyed: &BTreeSet<AgentId>) -> Vec<AgentId> {
        let mut purged = Vec::new();
        self.members.retain(|m| {
            let keep = !destroyed.contains(m);
            if !keep {
                purged.push(*m);
            }
            keep
        });
        self.members.sort_unstable();
        self.slots.clear();
        for (index, agent) in self.members.iter().enumerate() {
            self.slots.insert(*agent, index);
        }
        self.indexed_generation = Some(self.generation);
        purged
    }
}

/// All squads, keyed by the target they surround.
#[derive(Resource, Debug, Default)]
pub struct SquadRegistry {
    squads: BTreeMap<TargetId, Squad>,
    destroyed: BTreeSet<AgentId>,
}

impl SquadRegistry {
    /// Register `agent` around `target`. Re-joining is a no-op.
    pub fn join(&mut self, target: TargetId, agent: AgentId) -> bool {
        self.destroyed.remove(&agent);
        let joined = self.squads.entry(target).or_default().join(agent);
        if joined {
            debug!("[SQUAD] {:?} joined squad of {:?}", agent, target);
        }
        joined
    }

    pub fn leave(&mut self, target: TargetId, agent: AgentId) -> bool {
        let Some(squad) = self.squads.get_mut(&target) else {
            return false;
        };
        let left = squad.leave(agent);
        if squad.is_empty() {
            self.squads.remove(&target);
        }
        left
    }

    /// Slot index of `agent` around `target`, reindexing first if needed.
    ///
    /// Asking for a non-member re-adds it rather than failing, so a
    /// desynchronised caller costs one reindex instead of a stalled tick.
    pub fn slot_of(&mut self, target: TargetId, agent: AgentId) -> usize {
        self.destroyed.remove(&agent);
        let squad = self.squads.entry(target).or_default();
        if !squad.contains(agent) {
            warn!("[SQUAD] {:?} asked for a slot around {:?} without membership; re-adding", agent, target);
            squad.join(agent);
        }
        self.reindex_if_dirty(target);
        self.squads
            .get(&target)
            .and_then(|squad| squad.indexed_slot(agent))
            .unwrap_or(0)
    }

    /// Member count after filtering destroyed agents.
    pub fn squad_size(&mut self, target: TargetId) -> usize {
        self.reindex_if_dirty(target);
        self.squads.get(&target).map_or(0, |squad| squad.len())
    }

    fn reindex_if_dirty(&mut self, target: TargetId) {
        let Some(squad) = self.squads.get_mut(&target) else {
            return;
        };
        if squad.is_dirty() && !squad.reindex(&self.destroyed).is_empty() {
            self.prune_destroyed();
        }
    }

    /// Keep only destroyed agents that some squad still lists.
    fn prune_destroyed(&mut self) {
        let squads = &self.squads;
        self.destroyed
            .retain(|agent| squads.values().any(|squad| squad.contains(*agent)));
    }

    /// Forget the whole squad around a target that no longer exists.
    pub fn target_destroyed(&mut self, target: TargetId) -> Vec<AgentId> {
        let members = self
            .squads
            .remove(&target)
            .map(|squad| squad.members)
            .unwrap_or_default();
        if !members.is_empty() {
            info!("[SQUAD] Target {:?} destroyed; disbanded {} members", target, members.len());
            self.prune_destroyed();
        }
        members
    }

    /// Mark `agent` destroyed; its squad drops it at the next reindex.
    ///
    /// A squad whose members are all destroyed has nobody left to trigger
    /// that reindex, so it is dropped here.
    pub fn agent_destroyed(&mut self, agent: AgentId) {
        let mut member = false;
        for squad in self.squads.values_mut() {
            if squad.contains(agent) {
                squad.generation += 1;
                member = true;
            }
        }
        if !member {
            return;
        }
        self.destroyed.insert(agent);

        let destroyed = &self.destroyed;
        self.squads.retain(|target, squad| {
            let alive = squad.members.iter().any(|m| !destroyed.contains(m));
            if !alive {
                debug!("[SQUAD] Squad around {:?} lost its last member", target);
            }
            alive
        });
        self.prune_destroyed();
    }

    /// Agents marked destroyed but not yet purged by a reindex.
    pub fn pending_destroyed(&self) -> usize {
        self.destroyed.len()
    }

    pub fn squad(&self, target: TargetId) -> Option<&Squad> {
        self.squads.get(&target)
    }

    /// Read-only slot lookup for telemetry. Never reindexes.
    pub fn peek_slot(&self, target: TargetId, agent: AgentId) -> Option<usize> {
        self.squads.get(&target).and_then(|s| s.indexed_slot(agent))
    }

    pub fn membership_of(&self, agent: AgentId) -> Option<TargetId> {
        if self.destroyed.contains(&agent) {
            return None;
        }
        self.squads
            .iter()
            .find(|(_, squad)| squad.contains(agent))
            .map(|(target, _)| *target)
    }

    pub fn squad_count(&self) -> usize {
        self.squads.len()
    }
}
