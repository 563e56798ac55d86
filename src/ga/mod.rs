//! Genetic optimization over complete schedules.
//!
//! Every population member owns an independent schedule/index pair;
//! the direct (slot-grid) encoding means crossover and mutation work
//! on placements themselves, with the block-integrity repairer
//! restoring torn blocks after every operator.
//!
//! # Submodules
//!
//! - [`operators`]: crossover, block-aware swap, fallback mutations
//!
//! # Reference
//! - Colorni et al. (1998), "Metaheuristics for High School Timetabling"
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing"

mod individual;
pub mod operators;
mod runner;

pub use individual::Individual;
pub use runner::{GaConfig, GaResult, GeneticOptimizer, TerminationReason};
