//! Simulation-wide resources.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::components::AgentId;

/// Number of fixed ticks simulated so far.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Seeded generator for every random choice the AI makes
/// (wander points, avoidance side picks, orbit direction).
#[derive(Resource, Debug, Clone)]
pub struct AiRng(pub StdRng);

impl AiRng {
    pub const DEFAULT_SEED: u64 = 0x5eed;

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for AiRng {
    fn default() -> Self {
        Self::seeded(Self::DEFAULT_SEED)
    }
}

/// Hands out [`AgentId`]s in spawn order.
#[derive(Resource, Debug, Default)]
pub struct AgentIdAllocator {
    next: u32,
}

impl AgentIdAllocator {
    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }
}
