//! Tunables for threat assessment, targeting and the strategy cascade.
//!
//! Distances are Manhattan cells, durations are ticks. Scores are unitless
//! and only meaningful relative to each other.

use maze_core::MotionConfig;

use crate::search::CostProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreatConfig {
    /// An adversary this close is about to make contact.
    pub critical_radius: u32,
    pub elevated_radius: u32,
    pub detection_radius: u32,
    /// Multiplier for each adversary's contribution to the threat level.
    pub level_weight: u32,
    /// Cells of adversary movement to predict.
    pub lookahead: u32,
    /// Expansion cap of the per-adversary pursuit search.
    pub prediction_cap: usize,
}

impl ThreatConfig {
    pub const fn new() -> Self {
        Self {
            critical_radius: 2,
            elevated_radius: 4,
            detection_radius: 8,
            level_weight: 10,
            lookahead: 8,
            prediction_cap: 50,
        }
    }
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Base value of each target kind. Power pellets outrank adversaries, which
/// outrank regular pellets.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetWeights {
    pub pellet: f32,
    pub power_pellet: f32,
    pub adversary: f32,
    /// Numerator of the bonus for candidates in rarely visited areas.
    pub exploration: f32,
}

impl TargetWeights {
    pub const fn new() -> Self {
        Self {
            pellet: 10.0,
            power_pellet: 50.0,
            adversary: 30.0,
            exploration: 5.0,
        }
    }

    /// Every collectible weighs the same and nothing else matters, so the
    /// selector degenerates to "nearest collectible".
    pub const fn nearest() -> Self {
        Self {
            pellet: 10.0,
            power_pellet: 10.0,
            adversary: 0.0,
            exploration: 0.0,
        }
    }
}

impl Default for TargetWeights {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring terms of the escape search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EscapeConfig {
    /// Depth of the breadth-first escape scan.
    pub lookahead: u32,
    pub distance_weight: i32,
    pub predicted_penalty: i32,
    pub intersection_penalty: i32,
    pub dead_end_bonus: i32,
    pub corridor_bonus: i32,
    pub depth_penalty: i32,
    /// Bonus for ending near a power pellet, decaying by 2 per cell.
    pub power_bonus: i32,
    /// Power bonus applies only while the nearest adversary is this close.
    pub power_bonus_range: u32,
    /// Bonus for ending near a pellet, decaying by 1 per cell.
    pub pellet_bonus: i32,
    /// Neighbors with every adversary farther than this count as safe.
    pub safe_distance: u32,
}

impl EscapeConfig {
    pub const fn new() -> Self {
        Self {
            lookahead: 8,
            distance_weight: 4,
            predicted_penalty: 150,
            intersection_penalty: 20,
            dead_end_bonus: 10,
            corridor_bonus: 5,
            depth_penalty: 3,
            power_bonus: 20,
            power_bonus_range: 4,
            pellet_bonus: 15,
            safe_distance: 2,
        }
    }
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of a [`crate::StrategyEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrategyConfig {
    /// Ticks between cascade evaluations.
    pub decision_interval: u32,
    /// Ticks on one cell before the anti-stuck override fires.
    pub stuck_threshold: u32,
    /// Expansion cap for exploratory scans (least-visited cell search).
    pub exploration_cap: usize,
    /// Targets tried per collect decision before giving up.
    pub collect_retries: usize,
    /// Remaining collectibles at or below which the endgame starts.
    pub endgame_remaining: usize,
    pub hunting_range: u32,
    /// Spare power ticks required on top of the estimated chase time.
    pub hunt_margin: u32,
    /// Power time above which the agent hunts at full range.
    pub aggressive_power: u32,
    /// Power time at or below which the agent stops relying on it.
    pub cautious_power: u32,
    /// Adversary-aware cost for UCS/A* routing.
    pub cost: CostProfile,
    pub threat: ThreatConfig,
    pub weights: TargetWeights,
    pub escape: EscapeConfig,
    pub motion: MotionConfig,
    pub adversary_motion: MotionConfig,
}

impl StrategyConfig {
    pub const DEFAULT_DECISION_INTERVAL: u32 = 8;
    pub const DEFAULT_EXPLORATION_CAP: usize = 500;
    pub const DEFAULT_COLLECT_RETRIES: usize = 3;
    pub const DEFAULT_ENDGAME_REMAINING: usize = 10;
    pub const DEFAULT_HUNTING_RANGE: u32 = 8;
    pub const DEFAULT_HUNT_MARGIN: u32 = 30;
    pub const DEFAULT_AGGRESSIVE_POWER: u32 = 180;
    pub const DEFAULT_CAUTIOUS_POWER: u32 = 60;

    pub const fn new() -> Self {
        Self {
            decision_interval: Self::DEFAULT_DECISION_INTERVAL,
            stuck_threshold: MotionConfig::DEFAULT_STUCK_THRESHOLD,
            exploration_cap: Self::DEFAULT_EXPLORATION_CAP,
            collect_retries: Self::DEFAULT_COLLECT_RETRIES,
            endgame_remaining: Self::DEFAULT_ENDGAME_REMAINING,
            hunting_range: Self::DEFAULT_HUNTING_RANGE,
            hunt_margin: Self::DEFAULT_HUNT_MARGIN,
            aggressive_power: Self::DEFAULT_AGGRESSIVE_POWER,
            cautious_power: Self::DEFAULT_CAUTIOUS_POWER,
            cost: CostProfile::adversarial(),
            threat: ThreatConfig::new(),
            weights: TargetWeights::new(),
            escape: EscapeConfig::new(),
            motion: MotionConfig::new(),
            adversary_motion: MotionConfig::adversary(),
        }
    }

    #[must_use]
    pub const fn with_decision_interval(mut self, ticks: u32) -> Self {
        self.decision_interval = ticks;
        self
    }

    #[must_use]
    pub const fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self.stuck_threshold = motion.stuck_threshold;
        self
    }

    /// Stuck threshold never shorter than the time needed to cross a cell.
    pub fn effective_stuck_threshold(&self) -> u32 {
        let crossing = self.motion.ticks_per_cell();
        if crossing.is_finite() {
            self.stuck_threshold.max(crossing.ceil() as u32 + 1)
        } else {
            self.stuck_threshold
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stuck_threshold_covers_a_cell_crossing() {
        let config = StrategyConfig::new();
        assert_eq!(config.effective_stuck_threshold(), 30);

        let slow = StrategyConfig::new().with_motion(MotionConfig::new().with_speed(0.5));
        assert!(slow.effective_stuck_threshold() > 80);
    }
}
