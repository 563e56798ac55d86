//! Constraint violation taxonomy.
//!
//! A violation records one broken rule: which kind, which entity
//! (lesson, teacher, or class), and the penalty it contributes to the
//! schedule score. Hard violations make a schedule invalid regardless
//! of score; soft violations only reduce quality.

use serde::{Deserialize, Serialize};

/// Classification of constraint violations.
///
/// Matching on this enum is exhaustive by design: every consumer that
/// handles violations must decide what each kind means for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A teacher is booked in two places at the same (day, period).
    TeacherConflict,
    /// A class slot would hold two lessons at once.
    ClassConflict,
    /// A teacher is scheduled on a hard-blocked slot.
    BlockedSlot,
    /// Two blocks of one lesson share a day although the pattern
    /// distributes them.
    SameDayClash,
    /// Two blocks of one lesson are closer than the pattern's minimum
    /// day gap.
    DayGapTooSmall,
    /// A block of the lesson has no slots in the grid.
    MissingBlock,
    /// A block occupies a different number of slots than its declared size.
    BlockSizeMismatch,
    /// A block's slots are not a contiguous run.
    NonConsecutiveBlock,
    /// A block's slots are spread over more than one day.
    SplitBlock,
    /// A block's slot position indices disagree with the slot order.
    PositionMismatch,
    /// A lesson's slots on one day span far more periods than they fill.
    FragmentedDay,
    /// A teacher is scheduled on a soft-closed slot.
    ClosedSlot,
    /// A teacher teaches on their preferred off-day.
    OffDayTeaching,
    /// Blocks of a wide-gap lesson landed on adjacent days.
    AdjacentDays,
    /// Daily or weekly load is unevenly spread.
    LoadImbalance,
    /// Idle periods between lessons on one day.
    IdleGap,
    /// A teacher exceeds their daily maximum.
    OverDailyMaximum,
    /// A teacher teaches fewer periods than their daily minimum on a
    /// day they teach at all.
    UnderDailyMinimum,
}

impl ViolationKind {
    /// Whether this kind invalidates the schedule.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            ViolationKind::TeacherConflict
                | ViolationKind::ClassConflict
                | ViolationKind::BlockedSlot
                | ViolationKind::SameDayClash
                | ViolationKind::DayGapTooSmall
                | ViolationKind::MissingBlock
                | ViolationKind::BlockSizeMismatch
                | ViolationKind::NonConsecutiveBlock
                | ViolationKind::SplitBlock
        )
    }
}

/// A single broken rule with its penalty contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub kind: ViolationKind,
    /// Offending entity ID (lesson, teacher, or class).
    pub entity: String,
    /// Offending block index within the lesson's pattern, if applicable.
    pub block: Option<usize>,
    /// Human-readable description.
    pub message: String,
    /// Penalty contribution to the schedule score.
    pub penalty: f64,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        kind: ViolationKind,
        entity: impl Into<String>,
        message: impl Into<String>,
        penalty: f64,
    ) -> Self {
        Self {
            kind,
            entity: entity.into(),
            block: None,
            message: message.into(),
            penalty,
        }
    }

    /// Attaches the offending block index.
    pub fn with_block(mut self, block: usize) -> Self {
        self.block = Some(block);
        self
    }

    /// Whether this violation invalidates the schedule.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.kind.is_hard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_soft_split() {
        assert!(ViolationKind::TeacherConflict.is_hard());
        assert!(ViolationKind::MissingBlock.is_hard());
        assert!(ViolationKind::SameDayClash.is_hard());
        assert!(!ViolationKind::ClosedSlot.is_hard());
        assert!(!ViolationKind::IdleGap.is_hard());
        assert!(!ViolationKind::PositionMismatch.is_hard());
        assert!(!ViolationKind::FragmentedDay.is_hard());
    }

    #[test]
    fn test_violation_builder() {
        let v = Violation::new(
            ViolationKind::NonConsecutiveBlock,
            "L1",
            "block torn apart",
            6000.0,
        )
        .with_block(1);

        assert_eq!(v.entity, "L1");
        assert_eq!(v.block, Some(1));
        assert!(v.is_hard());
        assert_eq!(v.penalty, 6000.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let v = Violation::new(ViolationKind::IdleGap, "smith", "2 idle periods", 20.0);
        let json = serde_json::to_string(&v).unwrap();
        let back: Violation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
