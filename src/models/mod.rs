//! Timetabling domain models.
//!
//! Core data types for representing weekly timetabling problems:
//! lesson requirements, teachers and classes, block patterns, and
//! constraint violations.
//!
//! # Domain Mappings
//!
//! | timetabler | School | University |
//! |------------|--------|------------|
//! | LessonRequirement | Subject × class | Course section |
//! | Teacher | Teacher | Lecturer |
//! | SchoolClass | Class | Cohort |
//! | BlockPattern | Hour split (e.g. 2+2+2) | Session split |

mod lesson;
mod pattern;
mod violation;

pub use lesson::{LessonRequirement, SchoolClass, Teacher};
pub use pattern::{parse_pattern, BlockPattern, PatternCatalog, PlacementRule, SpecialRule};
pub use violation::{Violation, ViolationKind};
