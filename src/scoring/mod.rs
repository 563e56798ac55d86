//! Constraint evaluation and schedule quality metrics.
//!
//! The [`Evaluator`] applies the hard-veto + weighted-soft scoring
//! model over a schedule state; [`TimetableKpi`] condenses a finished
//! schedule into reporting numbers.
//!
//! Hard violations carry fixed penalties around the 10^4 magnitude so
//! that a single one dominates any accumulation of soft terms; the
//! soft side is continuous (standard deviations, gap lengths).

mod evaluator;
mod kpi;
mod weights;

pub use evaluator::{Evaluator, ScoreReport};
pub use kpi::TimetableKpi;
pub use weights::ConstraintWeights;
