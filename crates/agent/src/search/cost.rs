use std::collections::BTreeMap;

use maze_core::{Cell, GridIndex};

/// Cost of one plain step. Costs are integers in tenths of a step so that
/// fractional discounts keep the priority order exact.
pub const UNIT: u32 = 10;

/// Floor applied after the pellet discount; a step is never free.
pub const MIN_STEP: u32 = 1;

/// Step-cost shaping for the uniform-cost and A* searches.
///
/// `step = UNIT + danger + visits - pellet_discount`, where
/// - `danger` sums `(radius - d) * weight` steps over avoidance entries
///   closer than `danger_radius` to the destination cell,
/// - `visits` adds `visit_penalty` tenths per recorded visit, capped,
/// - `pellet_discount` is subtracted when the destination holds a collectible.
///
/// The discount can push a step below the Manhattan heuristic's assumption of
/// `UNIT` per step, so A* with a discount trades strict optimality for
/// pellet coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostProfile {
    pub danger_radius: u32,
    pub danger_weight: u32,
    pub visit_penalty: u32,
    pub visit_penalty_cap: u32,
    pub pellet_discount: u32,
    /// Avoidance entries whose snapshot distance exceeds this are ignored.
    pub ignore_beyond: Option<u32>,
}

impl CostProfile {
    /// Every step costs exactly [`UNIT`].
    pub const UNIFORM: Self = Self {
        danger_radius: 0,
        danger_weight: 0,
        visit_penalty: 0,
        visit_penalty_cap: 0,
        pellet_discount: 0,
        ignore_beyond: None,
    };

    pub const DEFAULT_DANGER_RADIUS: u32 = 4;
    pub const DEFAULT_DANGER_WEIGHT: u32 = 5;
    pub const DEFAULT_PELLET_DISCOUNT: u32 = 3;

    /// Danger surcharge around adversaries, no visit or pellet shaping.
    pub const fn adversarial() -> Self {
        Self {
            danger_radius: Self::DEFAULT_DANGER_RADIUS,
            danger_weight: Self::DEFAULT_DANGER_WEIGHT,
            ..Self::UNIFORM
        }
    }

    #[must_use]
    pub const fn with_pellet_discount(mut self, tenths: u32) -> Self {
        self.pellet_discount = tenths;
        self
    }

    #[must_use]
    pub const fn with_visit_penalty(mut self, tenths: u32, cap: u32) -> Self {
        self.visit_penalty = tenths;
        self.visit_penalty_cap = cap;
        self
    }

    #[must_use]
    pub const fn with_danger(mut self, radius: u32, weight: u32) -> Self {
        self.danger_radius = radius;
        self.danger_weight = weight;
        self
    }

    pub fn is_uniform(&self) -> bool {
        (self.danger_radius == 0 || self.danger_weight == 0)
            && self.visit_penalty == 0
            && self.pellet_discount == 0
    }

    /// Surcharge in tenths for standing on `cell`.
    pub fn danger(&self, cell: Cell, avoidance: &[(Cell, u32)]) -> u32 {
        avoidance
            .iter()
            .filter(|(_, known)| self.ignore_beyond.is_none_or(|limit| *known <= limit))
            .map(|(adversary, _)| {
                let d = cell.manhattan(*adversary);
                self.danger_radius.saturating_sub(d) * self.danger_weight * UNIT
            })
            .sum()
    }

    /// Cost in tenths of stepping onto `to`.
    pub fn step_cost<G: GridIndex + ?Sized>(
        &self,
        grid: &G,
        to: Cell,
        avoidance: &[(Cell, u32)],
        visits: Option<&BTreeMap<Cell, u32>>,
    ) -> u32 {
        let mut cost = UNIT + self.danger(to, avoidance);

        if self.visit_penalty > 0
            && let Some(count) = visits.and_then(|v| v.get(&to))
        {
            let penalty = count.saturating_mul(self.visit_penalty);
            cost += if self.visit_penalty_cap > 0 {
                penalty.min(self.visit_penalty_cap)
            } else {
                penalty
            };
        }

        if self.pellet_discount > 0 && grid.collectible_at(to).is_some() {
            let discount = self.pellet_discount.min(UNIT - MIN_STEP);
            cost = cost.saturating_sub(discount).max(MIN_STEP);
        }

        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::Layout;

    #[test]
    fn danger_surcharge_decays_with_distance() {
        let profile = CostProfile::adversarial();
        let adversary = [(Cell::new(5, 5), 3)];
        assert_eq!(profile.danger(Cell::new(5, 5), &adversary), 4 * 5 * UNIT);
        assert_eq!(profile.danger(Cell::new(5, 6), &adversary), 3 * 5 * UNIT);
        assert_eq!(profile.danger(Cell::new(5, 9), &adversary), 0);
    }

    #[test]
    fn far_entries_can_be_ignored() {
        let profile = CostProfile {
            ignore_beyond: Some(6),
            ..CostProfile::adversarial()
        };
        let adversary = [(Cell::new(5, 5), 7)];
        assert_eq!(profile.danger(Cell::new(5, 5), &adversary), 0);
    }

    #[test]
    fn pellet_discount_never_makes_a_step_free() {
        let layout = Layout::from_rows(&["#####", "#. .#", "#####"]).unwrap();
        let profile = CostProfile::UNIFORM.with_pellet_discount(50);
        assert_eq!(profile.step_cost(&layout.grid, Cell::new(1, 1), &[], None), MIN_STEP);
        assert_eq!(profile.step_cost(&layout.grid, Cell::new(2, 1), &[], None), UNIT);
    }

    #[test]
    fn visit_penalty_is_capped() {
        let layout = Layout::from_rows(&["#####", "#   #", "#####"]).unwrap();
        let visits = BTreeMap::from([(Cell::new(1, 1), 40)]);
        let profile = CostProfile::UNIFORM.with_visit_penalty(2, 25);
        assert_eq!(
            profile.step_cost(&layout.grid, Cell::new(1, 1), &[], Some(&visits)),
            UNIT + 25
        );
        assert!(CostProfile::UNIFORM.is_uniform());
        assert!(!profile.is_uniform());
    }
}
