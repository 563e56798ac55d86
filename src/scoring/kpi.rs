//! Timetable quality metrics.
//!
//! Summarizes a schedule for reporting layers: placement rate, load
//! tables, idle time, and the penalty split between hard and soft
//! violations.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | placed periods / requested periods |
//! | Weekly Loads | periods per teacher / class |
//! | Idle Periods | holes between first and last lesson per day |
//! | Hard Violations | count of validity-breaking rules |
//! | Soft Penalty | summed penalty of quality-only rules |

use std::collections::HashMap;

use crate::context::SchedulingContext;
use crate::schedule::ScheduleState;

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Periods placed in the grid.
    pub placed_hours: usize,
    /// Periods requested by all lessons.
    pub total_hours: usize,
    /// placed / total (1.0 when everything is placed).
    pub placement_rate: f64,
    /// Weekly teaching periods per teacher ID.
    pub teacher_weekly_loads: HashMap<String, usize>,
    /// Weekly occupied periods per class ID.
    pub class_weekly_loads: HashMap<String, usize>,
    /// Idle periods across all teachers.
    pub teacher_idle_periods: usize,
    /// Number of hard violations.
    pub hard_violations: usize,
    /// Summed penalty of soft violations.
    pub soft_penalty: f64,
}

impl TimetableKpi {
    /// Computes KPIs from a schedule state.
    pub fn calculate(state: &ScheduleState, ctx: &SchedulingContext) -> Self {
        let problem = &ctx.problem;
        let report = ctx.evaluator().score(state);

        let teacher_weekly_loads: HashMap<String, usize> = problem
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), state.index.teacher_weekly_load(i)))
            .collect();
        let class_weekly_loads: HashMap<String, usize> = problem
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), state.index.class_weekly_load(i)))
            .collect();

        let mut teacher_idle_periods = 0;
        for teacher in 0..problem.teacher_count() {
            for day in 0..problem.grid.days {
                let mut busy = 0usize;
                let mut first = None;
                let mut last = 0usize;
                for period in 0..problem.grid.periods {
                    if state.index.is_teacher_busy(teacher, day, period) {
                        busy += 1;
                        first.get_or_insert(period);
                        last = period;
                    }
                }
                if let Some(first) = first {
                    teacher_idle_periods += (last - first + 1) - busy;
                }
            }
        }

        let placed_hours = state.placed_hours();
        let total_hours = problem.total_hours();
        Self {
            placed_hours,
            total_hours,
            placement_rate: if total_hours == 0 {
                1.0
            } else {
                placed_hours as f64 / total_hours as f64
            },
            teacher_weekly_loads,
            class_weekly_loads,
            teacher_idle_periods,
            hard_violations: report.violations.iter().filter(|v| v.is_hard()).count(),
            soft_penalty: report
                .violations
                .iter()
                .filter(|v| !v.is_hard())
                .map(|v| v.penalty)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonRequirement, PatternCatalog, SchoolClass, Teacher};
    use crate::problem::Problem;
    use crate::schedule::TimeGrid;

    fn sample_ctx() -> SchedulingContext {
        let problem = Problem::compile(
            TimeGrid::new(5, 8),
            &[Teacher::new("smith")],
            &[SchoolClass::new("7a")],
            &[LessonRequirement::new("L1", "math", "7a")
                .with_teacher("smith")
                .with_weekly_hours(2)
                .with_pattern("2")],
            &PatternCatalog::standard(),
        )
        .unwrap();
        SchedulingContext::new(problem)
    }

    #[test]
    fn test_kpi_full_placement() {
        let ctx = sample_ctx();
        let mut state = ScheduleState::empty(&ctx.problem);
        state.place(&ctx.problem, 0, 0, 0, 0);

        let kpi = TimetableKpi::calculate(&state, &ctx);
        assert_eq!(kpi.placed_hours, 2);
        assert_eq!(kpi.total_hours, 2);
        assert_eq!(kpi.placement_rate, 1.0);
        assert_eq!(kpi.teacher_weekly_loads["smith"], 2);
        assert_eq!(kpi.class_weekly_loads["7a"], 2);
        assert_eq!(kpi.teacher_idle_periods, 0);
        assert_eq!(kpi.hard_violations, 0);
    }

    #[test]
    fn test_kpi_empty_schedule() {
        let ctx = sample_ctx();
        let state = ScheduleState::empty(&ctx.problem);

        let kpi = TimetableKpi::calculate(&state, &ctx);
        assert_eq!(kpi.placed_hours, 0);
        assert_eq!(kpi.placement_rate, 0.0);
        // The missing block counts as a hard violation
        assert_eq!(kpi.hard_violations, 1);
    }
}
