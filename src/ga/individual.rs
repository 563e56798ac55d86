//! Population member: an independently owned schedule/index pair.

use crate::schedule::ScheduleState;
use crate::scoring::Evaluator;

/// One member of the genetic population.
///
/// Owns its schedule and conflict index outright, so members can be
/// mutated and evaluated without any shared state. Lower fitness is
/// better (penalty minimization).
#[derive(Debug, Clone)]
pub struct Individual {
    /// The member's schedule/index pair.
    pub state: ScheduleState,
    /// Cached penalty. `INFINITY` until evaluated.
    pub fitness: f64,
}

impl Individual {
    /// Wraps a state with unevaluated fitness.
    pub fn new(state: ScheduleState) -> Self {
        Self {
            state,
            fitness: f64::INFINITY,
        }
    }

    /// Computes and caches the fitness.
    pub fn evaluate(&mut self, evaluator: &Evaluator<'_>) {
        self.fitness = evaluator.penalty(&self.state);
    }
}
