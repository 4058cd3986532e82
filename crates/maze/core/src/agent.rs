//! Per-agent mutable state.
//!
//! One [`AgentState`] exists per controlled agent. The motion controller
//! mutates it every tick, the strategy engine on decision ticks. Everything
//! that belongs to a single life (path, timers, blacklist, visit history) is
//! cleared by [`AgentState::reset`]; score, lives and move count survive.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::cell::{Cell, Direction};
use crate::config::MotionConfig;

/// Bounded history of recently entered cells, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentCells {
    cells: ArrayVec<Cell, { MotionConfig::RECENT_CAPACITY }>,
}

impl RecentCells {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `cell`, evicting the oldest entry when full.
    pub fn push(&mut self, cell: Cell) {
        if self.cells.is_full() {
            self.cells.remove(0);
        }
        self.cells.push(cell);
    }

    /// How many of the remembered entries equal `cell`.
    pub fn occurrences(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    pub fn last(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub spawn: Cell,
    pub position: Cell,
    /// Fraction of the way from `position` to the next cell, in `[0, 1)`.
    pub progress: f32,
    pub direction: Option<Direction>,
    pub pending: Option<Direction>,
    path: Vec<Cell>,
    cursor: usize,
    pub recent: RecentCells,
    visits: BTreeMap<Cell, u32>,
    /// Ticks since the last decision.
    pub decision_timer: u32,
    pub power_timer: u32,
    pub invincibility_timer: u32,
    /// Ticks spent without entering a new cell.
    pub stuck_ticks: u32,
    blacklist: Vec<Cell>,
    pub target: Option<Cell>,
    pub score: u32,
    pub lives: u8,
    pub moves: u32,
}

impl AgentState {
    pub fn new(spawn: Cell, lives: u8) -> Self {
        let mut state = Self {
            spawn,
            position: spawn,
            progress: 0.0,
            direction: None,
            pending: None,
            path: Vec::new(),
            cursor: 0,
            recent: RecentCells::new(),
            visits: BTreeMap::new(),
            decision_timer: 0,
            power_timer: 0,
            invincibility_timer: 0,
            stuck_ticks: 0,
            blacklist: Vec::new(),
            target: None,
            score: 0,
            lives,
            moves: 0,
        };
        state.note_visit(spawn);
        state
    }

    /// Returns the agent to its spawn and clears per-life state.
    pub fn reset(&mut self) {
        tracing::debug!(spawn = %self.spawn, "agent reset");
        self.position = self.spawn;
        self.progress = 0.0;
        self.direction = None;
        self.pending = None;
        self.clear_path();
        self.recent.clear();
        self.visits.clear();
        self.decision_timer = 0;
        self.power_timer = 0;
        self.invincibility_timer = 0;
        self.stuck_ticks = 0;
        self.blacklist.clear();
        self.target = None;
        self.note_visit(self.spawn);
    }

    pub fn is_empowered(&self) -> bool {
        self.power_timer > 0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0
    }

    /// Adversary contact cannot hurt the agent.
    pub fn is_protected(&self) -> bool {
        self.is_empowered() || self.is_invincible()
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Decrements the power and invincibility counters.
    pub fn tick_timers(&mut self) {
        self.power_timer = self.power_timer.saturating_sub(1);
        self.invincibility_timer = self.invincibility_timer.saturating_sub(1);
    }

    /// Removes a life and grants invincibility. Returns true while lives remain.
    pub fn lose_life(&mut self, invincibility: u32) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.invincibility_timer = invincibility;
        self.is_alive()
    }

    // ===== path following =====

    /// Replaces the active path. `path` excludes the current cell.
    pub fn set_path(&mut self, path: Vec<Cell>) {
        self.path = path;
        self.cursor = 0;
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
        self.cursor = 0;
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    /// Waypoints not reached yet.
    pub fn remaining_path(&self) -> &[Cell] {
        &self.path[self.cursor.min(self.path.len())..]
    }

    pub fn next_waypoint(&self) -> Option<Cell> {
        self.path.get(self.cursor).copied()
    }

    /// Consumes the next waypoint if the agent just reached it.
    pub fn advance_waypoint(&mut self, reached: Cell) -> bool {
        if self.next_waypoint() == Some(reached) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    // ===== visit history =====

    /// Records entry into `cell`.
    pub fn record_arrival(&mut self, cell: Cell) {
        self.position = cell;
        self.stuck_ticks = 0;
        self.moves += 1;
        self.note_visit(cell);
    }

    fn note_visit(&mut self, cell: Cell) {
        *self.visits.entry(cell).or_insert(0) += 1;
        self.recent.push(cell);
    }

    pub fn visit_count(&self, cell: Cell) -> u32 {
        self.visits.get(&cell).copied().unwrap_or(0)
    }

    pub fn visits(&self) -> &BTreeMap<Cell, u32> {
        &self.visits
    }

    // ===== unreachable targets =====

    /// Marks `cell` unreachable. Re-blacklisting moves it to the most recent slot.
    pub fn blacklist(&mut self, cell: Cell) {
        self.blacklist.retain(|c| *c != cell);
        self.blacklist.push(cell);
        tracing::debug!(%cell, total = self.blacklist.len(), "target blacklisted");
    }

    pub fn is_blacklisted(&self, cell: Cell) -> bool {
        self.blacklist.contains(&cell)
    }

    /// Blacklisted cells in insertion order (oldest first).
    pub fn blacklisted(&self) -> &[Cell] {
        &self.blacklist
    }

    /// Drops entries for which `live` is false (e.g. already collected).
    pub fn prune_blacklist(&mut self, live: impl Fn(Cell) -> bool) {
        self.blacklist.retain(|c| live(*c));
    }
}
