//! Pursuit strategies.

use crate::ai::fixed_math::{clamp01, FixedNum, FixedVec2};
use crate::ai::spatial::Occupancy;
use crate::ai::targeting::{TargetId, TargetSnapshot};

use super::BrainContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LosChaseSettings {
    pub view_distance: FixedNum,
    /// A remembered position closer than this is considered searched.
    pub forget_distance: FixedNum,
}

impl Default for LosChaseSettings {
    fn default() -> Self {
        Self {
            view_distance: FixedNum::from_num(10),
            forget_distance: FixedNum::from_num(0.5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DotGridSettings {
    pub view_distance: FixedNum,
    /// Fraction of the attack range to stop short of the target.
    pub inner_factor: FixedNum,
    pub min_inner_distance: FixedNum,
    pub dot_reach_threshold: FixedNum,
    pub repath_interval: FixedNum,
    pub weight_player: FixedNum,
    pub weight_enemy: FixedNum,
    pub grid_radius: FixedNum,
    pub grid_spacing: FixedNum,
}

impl Default for DotGridSettings {
    fn default() -> Self {
        Self {
            view_distance: FixedNum::from_num(8),
            inner_factor: FixedNum::from_num(0.35),
            min_inner_distance: FixedNum::from_num(0.05),
            dot_reach_threshold: FixedNum::from_num(0.35),
            repath_interval: FixedNum::from_num(0.2),
            weight_player: FixedNum::from_num(1),
            weight_enemy: FixedNum::from_num(0.15),
            grid_radius: FixedNum::from_num(3),
            grid_spacing: FixedNum::from_num(1),
        }
    }
}

/// How an agent closes the distance to its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChaseStrategy {
    /// Straight at the target, ignoring obstacles.
    Direct { speed: FixedNum },
    /// Path to the target while it is visible, then to where it was last
    /// seen, then home.
    PathLineOfSight {
        settings: LosChaseSettings,
        last_known: Option<FixedVec2>,
    },
    /// Breadcrumb through visible cells around the target.
    PathDotGrid {
        settings: DotGridSettings,
        dot: Option<FixedVec2>,
        since_pick: FixedNum,
        at_inner_point: bool,
    },
    /// Backs straight away from a target inside striking distance and
    /// holds still otherwise. Never hands over to the attack state.
    Runaway { speed: FixedNum },
}

impl ChaseStrategy {
    pub fn direct(speed: FixedNum) -> Self {
        Self::Direct { speed }
    }

    pub fn line_of_sight(settings: LosChaseSettings) -> Self {
        Self::PathLineOfSight {
            settings,
            last_known: None,
        }
    }

    pub fn dot_grid(settings: DotGridSettings) -> Self {
        Self::PathDotGrid {
            settings,
            dot: None,
            since_pick: FixedNum::ZERO,
            at_inner_point: false,
        }
    }

    pub fn runaway(speed: FixedNum) -> Self {
        Self::Runaway { speed }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "Chase",
            Self::PathLineOfSight { .. } => "ChaseLineOfSight",
            Self::PathDotGrid { .. } => "ChaseDotGrid",
            Self::Runaway { .. } => "Runaway",
        }
    }

    /// Whether reaching attack range should end the chase.
    pub fn yields_to_attack(&self) -> bool {
        !matches!(self, Self::Runaway { .. })
    }

    /// Whether the strategy has brought the agent close enough to strike
    /// even outside the plain attack range.
    pub fn can_strike(&self) -> bool {
        matches!(self, Self::PathDotGrid { at_inner_point: true, .. })
    }

    /// Current breadcrumb, for overlays.
    pub fn current_dot(&self) -> Option<FixedVec2> {
        match self {
            Self::PathDotGrid { dot, .. } => *dot,
            _ => None,
        }
    }

    pub fn enter(&mut self, ctx: &mut BrainContext) {
        ctx.follower.set_fallback_goal(ctx.home);
        self.reset();
    }

    pub fn exit(&mut self, ctx: &mut BrainContext) {
        ctx.follower.clear_goal();
        self.reset();
    }

    fn reset(&mut self) {
        match self {
            Self::Direct { .. } | Self::Runaway { .. } => {}
            Self::PathLineOfSight { last_known, .. } => *last_known = None,
            Self::PathDotGrid {
                dot,
                since_pick,
                at_inner_point,
                ..
            } => {
                *dot = None;
                *since_pick = FixedNum::ZERO;
                *at_inner_point = false;
            }
        }
    }

    pub fn target_destroyed(&mut self, _target: TargetId) {
        self.reset();
    }

    pub fn tick(&mut self, ctx: &mut BrainContext) -> FixedVec2 {
        match self {
            Self::Direct { speed } => match ctx.perception.target {
                Some(target) => (target.position - ctx.position).normalize() * *speed,
                None => FixedVec2::ZERO,
            },
            Self::Runaway { speed } => match ctx.perception.target {
                Some(target) if ctx.perception.distance <= ctx.ranges.attack_range() => {
                    (ctx.position - target.position).normalize() * *speed
                }
                _ => FixedVec2::ZERO,
            },
            Self::PathLineOfSight { settings, last_known } => {
                let goal = line_of_sight_goal(ctx, settings, last_known);
                steer_to(ctx, goal)
            }
            Self::PathDotGrid {
                settings,
                dot,
                since_pick,
                at_inner_point,
            } => {
                *at_inner_point = false;
                let target = ctx.perception.target;
                let goal = match target {
                    Some(target) if ctx.perception.distance <= ctx.ranges.aggro_range() => {
                        *dot = None;
                        let inner = inner_point(ctx, settings, &target);
                        *at_inner_point = ctx.position.distance(inner) <= settings.dot_reach_threshold;
                        Some(inner)
                    }
                    Some(target) => {
                        *since_pick += ctx.dt;
                        let reached = dot.is_none_or(|d| ctx.position.distance(d) <= settings.dot_reach_threshold);
                        if reached || *since_pick >= settings.repath_interval {
                            *dot = pick_dot(ctx, settings, &target);
                            *since_pick = FixedNum::ZERO;
                        }
                        dot.or(ctx.home)
                    }
                    None => ctx.home,
                };
                steer_to(ctx, goal)
            }
        }
    }
}

fn line_of_sight_goal(
    ctx: &BrainContext,
    settings: &LosChaseSettings,
    last_known: &mut Option<FixedVec2>,
) -> Option<FixedVec2> {
    if let Some(target) = ctx.perception.target {
        if ctx.perception.line_of_sight && ctx.perception.distance <= settings.view_distance {
            *last_known = Some(target.position);
            return Some(target.position);
        }
    }
    if let Some(remembered) = *last_known {
        if ctx.position.distance(remembered) > settings.forget_distance {
            return Some(remembered);
        }
        *last_known = None;
    }
    ctx.home
}

/// Point on the target's near side, a fraction of the attack range out.
fn inner_point(ctx: &BrainContext, settings: &DotGridSettings, target: &TargetSnapshot) -> FixedVec2 {
    let mut away = (ctx.position - target.position).normalize();
    if away.is_zero() {
        away = FixedVec2::new(FixedNum::from_num(1), FixedNum::ZERO);
    }
    let reach = (ctx.ranges.attack_range() * clamp01(settings.inner_factor)).max(settings.min_inner_distance);
    target.position + away * reach
}

/// Visible dot that best trades closeness to the target against the
/// detour from the agent.
fn pick_dot(ctx: &mut BrainContext, settings: &DotGridSettings, target: &TargetSnapshot) -> Option<FixedVec2> {
    let grid = ctx.visibility.get_or_build(
        target.id,
        target.position,
        settings.grid_radius,
        settings.grid_spacing,
        ctx.tick,
        ctx.obstacles,
    );
    let view_sq = settings.view_distance * settings.view_distance;
    let position = ctx.position;
    let obstacles = ctx.obstacles;
    grid.visible_dots()
        .filter(|dot| dot.distance_squared(position) <= view_sq)
        .filter(|dot| !obstacles.segment_blocked(position, *dot))
        .min_by_key(|dot| {
            dot.distance_squared(target.position) * settings.weight_player
                + dot.distance_squared(position) * settings.weight_enemy
        })
}

/// Path toward `goal`, or stop when there is none.
fn steer_to(ctx: &mut BrainContext, goal: Option<FixedVec2>) -> FixedVec2 {
    match goal {
        Some(goal) => {
            ctx.follower.set_goal(goal);
            ctx.follower.tick(ctx.position, ctx.dt, ctx.obstacles, &mut *ctx.rng)
        }
        None => {
            ctx.follower.clear_goal();
            FixedVec2::ZERO
        }
    }
}
