//! Input validation for timetabling problems.
//!
//! Checks structural integrity of lesson requirements, teachers, and
//! classes before any search begins. Detects:
//! - Duplicate IDs
//! - Unknown teacher/class references
//! - Requirements without teachers or subject
//! - Zero or negative weekly hours
//! - Explicit patterns that do not sum to the weekly hours
//! - Constraint slots outside the time grid
//!
//! Invalid input fails fast here; the tolerant defaults of the pattern
//! parser never apply to identifiers.

use std::collections::HashSet;

use crate::models::{parse_pattern, LessonRequirement, SchoolClass, Teacher};
use crate::schedule::TimeGrid;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A requirement references a teacher that doesn't exist.
    UnknownTeacher,
    /// A requirement references a class that doesn't exist.
    UnknownClass,
    /// A requirement has no subject or no teachers.
    IncompleteRequirement,
    /// Weekly hours are zero or negative.
    InvalidHours,
    /// An explicit pattern does not sum to the weekly hours.
    PatternMismatch,
    /// A constraint slot or off-day lies outside the time grid.
    OutOfGrid,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a timetabling problem.
///
/// Checks:
/// 1. No duplicate teacher, class, or requirement IDs
/// 2. Every requirement has a subject and at least one teacher
/// 3. All teacher/class references point to existing registry entries
/// 4. Weekly hours are positive
/// 5. Explicit patterns sum to the weekly hours and fit a single day
/// 6. Teacher constraint slots lie within the grid
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    grid: TimeGrid,
    teachers: &[Teacher],
    classes: &[SchoolClass],
    requirements: &[LessonRequirement],
) -> ValidationResult {
    let mut errors = Vec::new();

    // Collect teacher IDs
    let mut teacher_ids = HashSet::new();
    for t in teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
        if let Some(day) = t.off_day {
            if day >= grid.days {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfGrid,
                    format!(
                        "Teacher '{}' off-day {day} outside the {}-day grid",
                        t.id, grid.days
                    ),
                ));
            }
        }
        for &(day, period) in t.blocked_slots.iter().chain(&t.closed_slots) {
            if day >= grid.days || period >= grid.periods {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfGrid,
                    format!(
                        "Teacher '{}' constraint slot ({day}, {period}) outside the grid",
                        t.id
                    ),
                ));
            }
        }
    }

    // Collect class IDs
    let mut class_ids = HashSet::new();
    for c in classes {
        if !class_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {}", c.id),
            ));
        }
    }

    // Check requirements
    let mut requirement_ids = HashSet::new();
    for req in requirements {
        if !requirement_ids.insert(req.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate requirement ID: {}", req.id),
            ));
        }

        if req.subject.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::IncompleteRequirement,
                format!("Requirement '{}' has no subject", req.id),
            ));
        }

        if req.teachers.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::IncompleteRequirement,
                format!("Requirement '{}' has no teachers", req.id),
            ));
        }

        for teacher in &req.teachers {
            if !teacher_ids.contains(teacher.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeacher,
                    format!(
                        "Requirement '{}' references unknown teacher '{teacher}'",
                        req.id
                    ),
                ));
            }
        }

        if !class_ids.contains(req.class.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownClass,
                format!(
                    "Requirement '{}' references unknown class '{}'",
                    req.id, req.class
                ),
            ));
        }

        if req.weekly_hours <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHours,
                format!(
                    "Requirement '{}' has non-positive weekly hours ({})",
                    req.id, req.weekly_hours
                ),
            ));
        } else if let Some(text) = &req.pattern {
            let sizes = parse_pattern(text);
            let total: usize = sizes.iter().sum();
            if total != req.weekly_hours as usize {
                errors.push(ValidationError::new(
                    ValidationErrorKind::PatternMismatch,
                    format!(
                        "Requirement '{}' pattern '{text}' sums to {total}, expected {}",
                        req.id, req.weekly_hours
                    ),
                ));
            }
            if sizes.iter().any(|&s| s > grid.periods) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OutOfGrid,
                    format!(
                        "Requirement '{}' has a block longer than the {}-period day",
                        req.id, grid.periods
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> TimeGrid {
        TimeGrid::new(5, 8)
    }

    fn sample_teachers() -> Vec<Teacher> {
        vec![
            Teacher::new("smith").with_name("A. Smith"),
            Teacher::new("jones").with_name("B. Jones"),
        ]
    }

    fn sample_classes() -> Vec<SchoolClass> {
        vec![SchoolClass::new("7a"), SchoolClass::new("7b")]
    }

    #[test]
    fn test_valid_input() {
        let reqs = vec![
            LessonRequirement::new("L1", "math", "7a")
                .with_teacher("smith")
                .with_weekly_hours(4)
                .with_pattern("2+2"),
            LessonRequirement::new("L2", "art", "7b")
                .with_teacher("jones")
                .with_weekly_hours(1),
        ];
        assert!(
            validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs).is_ok()
        );
    }

    #[test]
    fn test_duplicate_teacher_id() {
        let teachers = vec![Teacher::new("smith"), Teacher::new("smith")];
        let errors = validate_input(sample_grid(), &teachers, &sample_classes(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("teacher")));
    }

    #[test]
    fn test_unknown_teacher() {
        let reqs = vec![LessonRequirement::new("L1", "math", "7a")
            .with_teacher("NONEXISTENT")
            .with_weekly_hours(2)];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownTeacher));
    }

    #[test]
    fn test_unknown_class() {
        let reqs = vec![LessonRequirement::new("L1", "math", "9z")
            .with_teacher("smith")
            .with_weekly_hours(2)];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownClass));
    }

    #[test]
    fn test_non_positive_hours() {
        let reqs = vec![
            LessonRequirement::new("L1", "math", "7a")
                .with_teacher("smith")
                .with_weekly_hours(0),
            LessonRequirement::new("L2", "art", "7a")
                .with_teacher("smith")
                .with_weekly_hours(-3),
        ];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        let hour_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidHours)
            .count();
        assert_eq!(hour_errors, 2);
    }

    #[test]
    fn test_pattern_hours_mismatch() {
        let reqs = vec![LessonRequirement::new("L1", "math", "7a")
            .with_teacher("smith")
            .with_weekly_hours(5)
            .with_pattern("2+2")];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::PatternMismatch));
    }

    #[test]
    fn test_no_teachers() {
        let reqs = vec![LessonRequirement::new("L1", "math", "7a").with_weekly_hours(2)];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::IncompleteRequirement));
    }

    #[test]
    fn test_out_of_grid_slots() {
        let teachers = vec![Teacher::new("smith")
            .with_off_day(9)
            .with_blocked_slot(0, 99)];
        let errors = validate_input(sample_grid(), &teachers, &sample_classes(), &[]).unwrap_err();
        let grid_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::OutOfGrid)
            .count();
        assert_eq!(grid_errors, 2);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let reqs = vec![LessonRequirement::new("L1", "", "9z").with_weekly_hours(0)];
        let errors = validate_input(sample_grid(), &sample_teachers(), &sample_classes(), &reqs)
            .unwrap_err();
        // no subject, no teachers, unknown class, bad hours
        assert!(errors.len() >= 3);
    }
}
