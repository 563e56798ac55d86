//! Lesson requirement, teacher, and class models.
//!
//! These are the immutable input records the scheduler consumes. They
//! arrive fully formed from an external ETL boundary; this crate only
//! validates and compiles them (see [`crate::problem`]).
//!
//! # Time Representation
//! The week is a fixed grid of (day, period) slots, both zero-based.
//! The consumer defines what day 0 and period 0 mean.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A weekly lesson requirement: a subject taught to one class by one
/// or more teachers, for a fixed number of periods per week.
///
/// The weekly hours are split into blocks according to the pattern
/// string (see [`crate::models::parse_pattern`]); when no pattern is
/// given, a conventional split is inferred from the hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonRequirement {
    /// Unique requirement identifier.
    pub id: String,
    /// Subject identifier (e.g. "math").
    pub subject: String,
    /// Assigned teacher identifiers. Co-taught lessons list several.
    pub teachers: Vec<String>,
    /// Class identifier.
    pub class: String,
    /// Periods per week. Must be positive.
    pub weekly_hours: i32,
    /// Block pattern in textual notation (`"2+2+2"`). `None` = inferred.
    pub pattern: Option<String>,
    /// Domain-specific key-value metadata.
    pub attributes: HashMap<String, String>,
}

impl LessonRequirement {
    /// Creates a new requirement.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            teachers: Vec::new(),
            class: class.into(),
            weekly_hours: 1,
            pattern: None,
            attributes: HashMap::new(),
        }
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teachers.push(teacher.into());
        self
    }

    /// Sets the weekly hours.
    pub fn with_weekly_hours(mut self, hours: i32) -> Self {
        self.weekly_hours = hours;
        self
    }

    /// Sets the block pattern in textual notation.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A teacher, with hard availability constraints and soft preferences.
///
/// Blocked slots are hard: the teacher cannot teach there. Closed slots
/// and the off-day are preferences: scheduling over them only lowers the
/// quality score (the constructive search additionally avoids the
/// off-day when enumerating candidate days).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Preferred free day (zero-based).
    pub off_day: Option<usize>,
    /// Maximum teaching periods per day.
    pub max_daily: Option<usize>,
    /// Minimum teaching periods on days the teacher teaches at all.
    pub min_daily: Option<usize>,
    /// Hard-unavailable (day, period) slots.
    pub blocked_slots: Vec<(usize, usize)>,
    /// Soft-undesired (day, period) slots.
    pub closed_slots: Vec<(usize, usize)>,
}

impl Teacher {
    /// Creates a new teacher.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            off_day: None,
            max_daily: None,
            min_daily: None,
            blocked_slots: Vec::new(),
            closed_slots: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the preferred free day.
    pub fn with_off_day(mut self, day: usize) -> Self {
        self.off_day = Some(day);
        self
    }

    /// Sets the daily teaching maximum.
    pub fn with_max_daily(mut self, periods: usize) -> Self {
        self.max_daily = Some(periods);
        self
    }

    /// Sets the daily teaching minimum.
    pub fn with_min_daily(mut self, periods: usize) -> Self {
        self.min_daily = Some(periods);
        self
    }

    /// Adds a hard-blocked slot.
    pub fn with_blocked_slot(mut self, day: usize, period: usize) -> Self {
        self.blocked_slots.push((day, period));
        self
    }

    /// Adds a soft-closed slot.
    pub fn with_closed_slot(mut self, day: usize, period: usize) -> Self {
        self.closed_slots.push((day, period));
        self
    }
}

/// A class (student group) with one timetable row per week slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Unique class identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl SchoolClass {
    /// Creates a new class.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_builder() {
        let req = LessonRequirement::new("L1", "math", "7a")
            .with_teacher("smith")
            .with_teacher("jones")
            .with_weekly_hours(6)
            .with_pattern("2+2+2")
            .with_attribute("room", "lab");

        assert_eq!(req.id, "L1");
        assert_eq!(req.subject, "math");
        assert_eq!(req.class, "7a");
        assert_eq!(req.teachers, vec!["smith", "jones"]);
        assert_eq!(req.weekly_hours, 6);
        assert_eq!(req.pattern.as_deref(), Some("2+2+2"));
        assert_eq!(req.attributes.get("room"), Some(&"lab".to_string()));
    }

    #[test]
    fn test_teacher_builder() {
        let t = Teacher::new("smith")
            .with_name("A. Smith")
            .with_off_day(4)
            .with_max_daily(6)
            .with_min_daily(2)
            .with_blocked_slot(0, 0)
            .with_closed_slot(2, 7);

        assert_eq!(t.off_day, Some(4));
        assert_eq!(t.max_daily, Some(6));
        assert_eq!(t.min_daily, Some(2));
        assert_eq!(t.blocked_slots, vec![(0, 0)]);
        assert_eq!(t.closed_slots, vec![(2, 7)]);
    }

    #[test]
    fn test_serde_round_trip() {
        let req = LessonRequirement::new("L1", "math", "7a")
            .with_teacher("smith")
            .with_weekly_hours(2);
        let json = serde_json::to_string(&req).unwrap();
        let back: LessonRequirement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, req.id);
        assert_eq!(back.weekly_hours, 2);
    }
}
