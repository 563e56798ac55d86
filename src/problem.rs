//! Compiled problem tables.
//!
//! Ingestion compiles the string-keyed input records into dense-index
//! tables: teachers, classes, and lessons with classified block
//! patterns. All search and scoring code works on these indices; the
//! original identifiers are kept for reporting.
//!
//! Compilation validates first ([`crate::validation`]) and fails fast
//! with an [`InputError`] — no search ever runs on bad input.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{BlockPattern, LessonRequirement, PatternCatalog, SchoolClass, Teacher};
use crate::schedule::TimeGrid;
use crate::validation::{validate_input, ValidationError};

/// Rejected input data. Carries every detected issue.
#[derive(Debug, Error)]
#[error("invalid scheduling input: {} ({} error(s))",
    .errors.first().map(|e| e.message.as_str()).unwrap_or("unknown"),
    .errors.len())]
pub struct InputError {
    /// All validation errors, in detection order.
    pub errors: Vec<ValidationError>,
}

/// A teacher compiled to dense indices and slot bitmaps.
#[derive(Debug, Clone)]
pub struct TeacherInfo {
    /// Original teacher ID.
    pub id: String,
    /// Preferred free day.
    pub off_day: Option<usize>,
    /// Maximum teaching periods per day.
    pub max_daily: Option<usize>,
    /// Minimum teaching periods on active days.
    pub min_daily: Option<usize>,
    /// Hard-unavailable slots, indexed by `TimeGrid::slot_index`.
    pub blocked: Vec<bool>,
    /// Soft-undesired slots, indexed by `TimeGrid::slot_index`.
    pub closed: Vec<bool>,
}

impl TeacherInfo {
    /// Whether the (day, period) slot is hard-blocked.
    #[inline]
    pub fn is_blocked(&self, grid: TimeGrid, day: usize, period: usize) -> bool {
        self.blocked[grid.slot_index(day, period)]
    }

    /// Whether the (day, period) slot is soft-closed.
    #[inline]
    pub fn is_closed(&self, grid: TimeGrid, day: usize, period: usize) -> bool {
        self.closed[grid.slot_index(day, period)]
    }
}

/// A lesson requirement compiled to dense indices.
#[derive(Debug, Clone)]
pub struct LessonInfo {
    /// Original requirement ID.
    pub id: String,
    /// Subject identifier.
    pub subject: String,
    /// Class index.
    pub class: usize,
    /// Teacher indices. Co-taught lessons list several.
    pub teachers: Vec<usize>,
    /// Periods per week.
    pub weekly_hours: usize,
    /// Classified block pattern.
    pub pattern: BlockPattern,
}

/// The compiled timetabling problem: grid, registries, lessons.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Grid dimensions.
    pub grid: TimeGrid,
    /// Compiled teachers; index = teacher index.
    pub teachers: Vec<TeacherInfo>,
    /// Class IDs; index = class index.
    pub classes: Vec<String>,
    /// Compiled lessons; index = lesson index.
    pub lessons: Vec<LessonInfo>,
    teacher_lookup: HashMap<String, usize>,
    class_lookup: HashMap<String, usize>,
}

impl Problem {
    /// Validates and compiles raw input records.
    ///
    /// Pattern strings are classified through `catalog`; requirements
    /// without an explicit pattern get an inferred split.
    pub fn compile(
        grid: TimeGrid,
        teachers: &[Teacher],
        classes: &[SchoolClass],
        requirements: &[LessonRequirement],
        catalog: &PatternCatalog,
    ) -> Result<Self, InputError> {
        validate_input(grid, teachers, classes, requirements)
            .map_err(|errors| InputError { errors })?;

        let teacher_lookup: HashMap<String, usize> = teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let class_lookup: HashMap<String, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let per_week = grid.slots_per_week();
        let compiled_teachers: Vec<TeacherInfo> = teachers
            .iter()
            .map(|t| {
                let mut blocked = vec![false; per_week];
                for &(day, period) in &t.blocked_slots {
                    blocked[grid.slot_index(day, period)] = true;
                }
                let mut closed = vec![false; per_week];
                for &(day, period) in &t.closed_slots {
                    closed[grid.slot_index(day, period)] = true;
                }
                TeacherInfo {
                    id: t.id.clone(),
                    off_day: t.off_day,
                    max_daily: t.max_daily,
                    min_daily: t.min_daily,
                    blocked,
                    closed,
                }
            })
            .collect();

        let lessons: Vec<LessonInfo> = requirements
            .iter()
            .map(|req| {
                let pattern = match &req.pattern {
                    Some(text) => catalog.classify_text(text),
                    None => catalog.infer(req.weekly_hours as usize),
                };
                LessonInfo {
                    id: req.id.clone(),
                    subject: req.subject.clone(),
                    class: class_lookup[&req.class],
                    teachers: req
                        .teachers
                        .iter()
                        .map(|t| teacher_lookup[t])
                        .collect(),
                    weekly_hours: req.weekly_hours as usize,
                    pattern,
                }
            })
            .collect();

        Ok(Self {
            grid,
            teachers: compiled_teachers,
            classes: classes.iter().map(|c| c.id.clone()).collect(),
            lessons,
            teacher_lookup,
            class_lookup,
        })
    }

    /// Teacher index for an ID.
    pub fn teacher_idx(&self, id: &str) -> Option<usize> {
        self.teacher_lookup.get(id).copied()
    }

    /// Class index for an ID.
    pub fn class_idx(&self, id: &str) -> Option<usize> {
        self.class_lookup.get(id).copied()
    }

    /// Total requested periods across all lessons.
    pub fn total_hours(&self) -> usize {
        self.lessons.iter().map(|l| l.weekly_hours).sum()
    }

    /// Number of teachers.
    #[inline]
    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    /// Number of classes.
    #[inline]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_problem() -> Problem {
        let teachers = vec![
            Teacher::new("smith").with_off_day(4).with_blocked_slot(0, 0),
            Teacher::new("jones"),
        ];
        let classes = vec![SchoolClass::new("7a"), SchoolClass::new("7b")];
        let requirements = vec![
            LessonRequirement::new("L1", "math", "7a")
                .with_teacher("smith")
                .with_weekly_hours(6)
                .with_pattern("2+2+2"),
            LessonRequirement::new("L2", "art", "7b")
                .with_teacher("jones")
                .with_teacher("smith")
                .with_weekly_hours(3),
        ];
        Problem::compile(
            TimeGrid::new(5, 8),
            &teachers,
            &classes,
            &requirements,
            &PatternCatalog::standard(),
        )
        .unwrap()
    }

    #[test]
    fn test_compile_interning() {
        let p = sample_problem();
        assert_eq!(p.teacher_count(), 2);
        assert_eq!(p.class_count(), 2);
        assert_eq!(p.teacher_idx("smith"), Some(0));
        assert_eq!(p.class_idx("7b"), Some(1));
        assert_eq!(p.teacher_idx("nobody"), None);

        assert_eq!(p.lessons[0].class, 0);
        assert_eq!(p.lessons[1].teachers, vec![1, 0]);
    }

    #[test]
    fn test_compile_patterns() {
        let p = sample_problem();
        assert_eq!(p.lessons[0].pattern.sizes, vec![2, 2, 2]);
        // L2 has no explicit pattern: 3 hours infer to 2+1
        assert_eq!(p.lessons[1].pattern.sizes, vec![2, 1]);
        assert_eq!(p.total_hours(), 9);
    }

    #[test]
    fn test_compile_teacher_bitmaps() {
        let p = sample_problem();
        let smith = &p.teachers[0];
        assert!(smith.is_blocked(p.grid, 0, 0));
        assert!(!smith.is_blocked(p.grid, 0, 1));
        assert_eq!(smith.off_day, Some(4));
    }

    #[test]
    fn test_compile_rejects_bad_input() {
        let err = Problem::compile(
            TimeGrid::new(5, 8),
            &[],
            &[],
            &[LessonRequirement::new("L1", "math", "7a")
                .with_teacher("ghost")
                .with_weekly_hours(2)],
            &PatternCatalog::standard(),
        )
        .unwrap_err();

        assert!(!err.errors.is_empty());
        let text = err.to_string();
        assert!(text.contains("invalid scheduling input"));
    }
}
