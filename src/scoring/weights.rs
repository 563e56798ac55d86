//! Penalty weights for the constraint evaluator.
//!
//! Hard-constraint weights sit at the 10^4 magnitude so that any hard
//! violation dwarfs every soft term: a schedule with one conflict can
//! never outscore a conflict-free one on soft quality alone.

use serde::{Deserialize, Serialize};

/// Weighted penalty configuration.
///
/// Soft weights are per unit: per slot, per idle period, per excess
/// hour, or per standard-deviation point for the balance terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintWeights {
    /// A teacher booked twice at one (day, period). Hard.
    pub teacher_conflict: f64,
    /// A class slot holding two lessons. Hard.
    pub class_conflict: f64,
    /// A teacher scheduled on a hard-blocked slot. Hard.
    pub blocked_slot: f64,
    /// Two blocks of a distributed lesson sharing a day. Hard.
    pub same_day_clash: f64,
    /// Blocks closer than the pattern's minimum day gap. Hard.
    pub day_gap: f64,
    /// A block with no slots in the grid. Hard.
    pub missing_block: f64,
    /// A block occupying the wrong number of slots. Hard.
    pub size_mismatch: f64,
    /// A block torn apart: non-contiguous or spread over days. Hard.
    pub broken_block: f64,
    /// Slot position indices out of order within a block.
    pub position_mismatch: f64,
    /// A lesson's day-span far exceeding its filled slots.
    pub fragmentation: f64,
    /// Day-span / filled-slots ratio above which fragmentation is flagged.
    pub fragmentation_tolerance: f64,
    /// A teacher scheduled on a soft-closed slot, per slot.
    pub closed_slot: f64,
    /// Teaching on the preferred off-day, per period.
    pub off_day: f64,
    /// Wideable distributed blocks on adjacent days, per pair.
    pub adjacent_days: f64,
    /// Load imbalance, per standard-deviation point of daily loads.
    pub load_balance: f64,
    /// Idle period between lessons on one day, per period.
    pub idle_gap: f64,
    /// Periods above a teacher's daily maximum, per period.
    pub over_daily_max: f64,
    /// Shortfall below a teacher's daily minimum on active days, per period.
    pub under_daily_min: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        Self {
            teacher_conflict: 10_000.0,
            class_conflict: 10_000.0,
            blocked_slot: 10_000.0,
            same_day_clash: 10_000.0,
            day_gap: 10_000.0,
            missing_block: 10_000.0,
            size_mismatch: 8_000.0,
            broken_block: 6_000.0,
            position_mismatch: 1_000.0,
            fragmentation: 250.0,
            fragmentation_tolerance: 1.5,
            closed_slot: 30.0,
            off_day: 60.0,
            adjacent_days: 40.0,
            load_balance: 15.0,
            idle_gap: 10.0,
            over_daily_max: 200.0,
            under_daily_min: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_weights_dwarf_soft() {
        let w = ConstraintWeights::default();
        let soft_max = w
            .closed_slot
            .max(w.off_day)
            .max(w.adjacent_days)
            .max(w.load_balance)
            .max(w.idle_gap)
            .max(w.over_daily_max)
            .max(w.under_daily_min);
        assert!(w.teacher_conflict >= 10.0 * soft_max);
        assert!(w.missing_block >= w.size_mismatch);
        assert!(w.size_mismatch >= w.broken_block);
        assert!(w.broken_block >= w.position_mismatch);
        assert!(w.position_mismatch >= w.fragmentation);
    }

    #[test]
    fn test_serde_round_trip() {
        let w = ConstraintWeights::default();
        let json = serde_json::to_string(&w).unwrap();
        let back: ConstraintWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
    }
}
