use serde::{Deserialize, Serialize};

use crate::ai::fixed_math::FixedNum;

/// Coarse range to the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DistanceBand {
    Near,
    Mid,
    #[default]
    Far,
}

/// Upper bounds of the near and mid bands; anything beyond `mid` is far.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceBands {
    pub near: FixedNum,
    pub mid: FixedNum,
}

impl Default for DistanceBands {
    fn default() -> Self {
        Self {
            near: FixedNum::from_num(1.8),
            mid: FixedNum::from_num(4),
        }
    }
}

impl DistanceBands {
    pub fn classify(&self, distance: FixedNum) -> DistanceBand {
        if distance <= self.near {
            DistanceBand::Near
        } else if distance <= self.mid {
            DistanceBand::Mid
        } else {
            DistanceBand::Far
        }
    }
}

/// Facts the planner reasons over. Recomputed from sensing every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldState {
    pub has_line_of_sight: bool,
    pub weapon_ready: bool,
    pub low_health: bool,
    pub distance_band: DistanceBand,
    pub did_attack: bool,
}

impl WorldState {
    /// Goal facts still missing: line of sight, not far, weapon ready, attacked.
    pub fn unsatisfied_goal_facts(&self) -> u32 {
        [
            self.has_line_of_sight,
            self.distance_band != DistanceBand::Far,
            self.weapon_ready,
            self.did_attack,
        ]
        .into_iter()
        .filter(|fact| !fact)
        .count() as u32
    }

    pub fn satisfies_goal(&self) -> bool {
        self.unsatisfied_goal_facts() == 0
    }
}
