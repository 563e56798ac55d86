//! Weekly school timetabling engine.
//!
//! Assigns lesson requirements (subject + teacher(s) + class, split
//! into contiguous blocks) to a fixed weekly (day, period) grid under
//! hard constraints (no double-booking, block contiguity and day
//! separation) and soft constraints (teacher preferences, load
//! balance, idle-gap minimization).
//!
//! # Modules
//!
//! - **`models`**: Domain types — `LessonRequirement`, `Teacher`,
//!   `SchoolClass`, `BlockPattern`, `Violation`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, hour/pattern consistency)
//! - **`problem`**: Validated input compiled to dense-index tables
//! - **`schedule`**: The assignment grid and its conflict/load index
//! - **`scoring`**: Hard-veto + weighted soft evaluation, KPIs
//! - **`search`**: Constructive backtracking placement
//! - **`ga`**: Genetic optimization over complete schedules
//! - **`integrity`**: Block validation and repair
//!
//! # Usage
//!
//! Compile a [`problem::Problem`] from input records, wrap it in a
//! [`context::SchedulingContext`], build an initial schedule with
//! [`search::ConstructiveSearch`], then improve it with
//! [`ga::GeneticOptimizer`]. The workload is CPU-bound: all input is
//! materialized before a run, and population evaluation can fan out
//! over a worker pool.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Colorni et al. (1998), "Metaheuristics for High School Timetabling"

pub mod context;
pub mod ga;
pub mod integrity;
pub mod models;
pub mod problem;
pub mod schedule;
pub mod scoring;
pub mod search;
pub mod validation;
