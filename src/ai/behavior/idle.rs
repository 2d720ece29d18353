use rand::Rng;

use crate::ai::fixed_math::{FixedNum, FixedVec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WanderSettings {
    /// Half-width of the square around home that wander points are drawn from.
    pub range: FixedNum,
    pub speed: FixedNum,
    pub arrive_distance: FixedNum,
}

impl Default for WanderSettings {
    fn default() -> Self {
        Self {
            range: FixedNum::from_num(0.5),
            speed: FixedNum::from_num(1),
            arrive_distance: FixedNum::from_num(0.1),
        }
    }
}

/// What an agent does with no one to fight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdleStrategy {
    StandStill,
    RandomWander {
        settings: WanderSettings,
        point: Option<FixedVec2>,
    },
}

impl IdleStrategy {
    pub fn wander(settings: WanderSettings) -> Self {
        Self::RandomWander { settings, point: None }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StandStill => "Idle",
            Self::RandomWander { .. } => "Wander",
        }
    }

    pub fn enter(&mut self) {
        if let Self::RandomWander { point, .. } = self {
            *point = None;
        }
    }

    pub fn tick<R: Rng>(&mut self, position: FixedVec2, home: FixedVec2, rng: &mut R) -> FixedVec2 {
        match self {
            Self::StandStill => FixedVec2::ZERO,
            Self::RandomWander { settings, point } => {
                let reached = point.is_none_or(|p| position.distance(p) <= settings.arrive_distance);
                if reached {
                    let range = settings.range.to_num::<f64>().max(0.0);
                    let offset = FixedVec2::new(
                        FixedNum::from_num(rng.random_range(-range..=range)),
                        FixedNum::from_num(rng.random_range(-range..=range)),
                    );
                    *point = Some(home + offset);
                }
                match point {
                    Some(p) => (*p - position).normalize() * settings.speed,
                    None => FixedVec2::ZERO,
                }
            }
        }
    }
}
