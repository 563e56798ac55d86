//! Scheduling context: explicit dependency bundle.
//!
//! Every component receives its collaborators through this bundle at
//! construction instead of reaching into shared globals: the compiled
//! problem (registries, lessons, grid), the pattern catalog, and the
//! constraint weights. A component that needs the context does not
//! construct without it.

use crate::models::PatternCatalog;
use crate::problem::Problem;
use crate::scoring::{ConstraintWeights, Evaluator};

/// Shared, read-only dependencies for one scheduling run.
///
/// Mutable state ([`ScheduleState`](crate::schedule::ScheduleState))
/// stays outside: each search attempt and population member owns its
/// own pair, borrowing this context immutably.
#[derive(Debug, Clone)]
pub struct SchedulingContext {
    /// Compiled problem tables.
    pub problem: Problem,
    /// Block pattern catalog used at ingestion.
    pub catalog: PatternCatalog,
    /// Penalty weights for the evaluator.
    pub weights: ConstraintWeights,
}

impl SchedulingContext {
    /// Creates a context with the standard catalog and default weights.
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            catalog: PatternCatalog::standard(),
            weights: ConstraintWeights::default(),
        }
    }

    /// Replaces the constraint weights.
    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }

    /// An evaluator borrowing this context.
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(self)
    }
}
