//! Constructive placement search.
//!
//! Produces an initial schedule by difficulty-ordered backtracking.
//! Partial placement is an expected outcome, reported in the
//! [`SearchOutcome`], never an error.

mod constructive;

pub use constructive::{ConstructiveSearch, SearchConfig, SearchOutcome, UnplacedBlock};
