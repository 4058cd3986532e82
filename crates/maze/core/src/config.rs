/// Movement and timer tunables for agents.
///
/// Speeds are expressed in layout units per tick; a cell spans `cell_size`
/// units, so an agent advances `speed / cell_size` of a cell every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    pub speed: f32,
    pub cell_size: f32,
    /// A pending direction may replace the active one only while progress
    /// through the current cell is below this fraction.
    pub commit_threshold: f32,
    /// Ticks spent on the same cell before the agent counts as stuck.
    pub stuck_threshold: u32,
    pub power_duration: u32,
    pub invincibility_duration: u32,
    pub lives: u8,
}

impl MotionConfig {
    /// Capacity of the recent-position ring buffer.
    pub const RECENT_CAPACITY: usize = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SPEED: f32 = 1.5;
    pub const DEFAULT_ADVERSARY_SPEED: f32 = 1.0;
    pub const DEFAULT_CELL_SIZE: f32 = 40.0;
    pub const DEFAULT_COMMIT_THRESHOLD: f32 = 0.3;
    pub const DEFAULT_STUCK_THRESHOLD: u32 = 30;
    pub const DEFAULT_POWER_DURATION: u32 = 300;
    pub const DEFAULT_INVINCIBILITY_DURATION: u32 = 180;
    pub const DEFAULT_LIVES: u8 = 3;

    pub const fn new() -> Self {
        Self {
            speed: Self::DEFAULT_SPEED,
            cell_size: Self::DEFAULT_CELL_SIZE,
            commit_threshold: Self::DEFAULT_COMMIT_THRESHOLD,
            stuck_threshold: Self::DEFAULT_STUCK_THRESHOLD,
            power_duration: Self::DEFAULT_POWER_DURATION,
            invincibility_duration: Self::DEFAULT_INVINCIBILITY_DURATION,
            lives: Self::DEFAULT_LIVES,
        }
    }

    /// Motion profile for pursuers: slower, otherwise identical.
    pub const fn adversary() -> Self {
        let mut config = Self::new();
        config.speed = Self::DEFAULT_ADVERSARY_SPEED;
        config
    }

    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub const fn with_stuck_threshold(mut self, ticks: u32) -> Self {
        self.stuck_threshold = ticks;
        self
    }

    /// Fraction of a cell covered per tick.
    #[inline]
    pub fn step_fraction(&self) -> f32 {
        if self.cell_size <= 0.0 {
            1.0
        } else {
            (self.speed / self.cell_size).clamp(0.0, 1.0)
        }
    }

    /// Ticks needed to cross one cell.
    pub fn ticks_per_cell(&self) -> f32 {
        let fraction = self.step_fraction();
        if fraction <= 0.0 { f32::INFINITY } else { 1.0 / fraction }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Points awarded per collectible and per eaten adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreTable {
    pub pellet: u32,
    pub power_pellet: u32,
    pub adversary: u32,
}

impl ScoreTable {
    pub const DEFAULT_PELLET: u32 = 10;
    pub const DEFAULT_POWER_PELLET: u32 = 32;
    pub const DEFAULT_ADVERSARY: u32 = 200;

    pub const fn new() -> Self {
        Self {
            pellet: Self::DEFAULT_PELLET,
            power_pellet: Self::DEFAULT_POWER_PELLET,
            adversary: Self::DEFAULT_ADVERSARY,
        }
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::new()
    }
}
