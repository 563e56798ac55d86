//! Hard-veto and weighted soft scoring over a schedule.
//!
//! The evaluator consumes the conflict/load index for O(1) occupancy
//! queries and decomposes the total penalty per lesson and per
//! teacher/class, so a caller can rescore only the affected portion
//! after a local mutation.
//!
//! [`Evaluator::penalty`] is the hot path used as GA fitness: it
//! computes the identical total as [`Evaluator::score`] but skips all
//! diagnostic formatting.

use crate::context::SchedulingContext;
use crate::integrity;
use crate::models::{Violation, ViolationKind};
use crate::schedule::ScheduleState;

/// Scoring result: validity, total penalty, and the broken rules.
///
/// `penalty` always equals the sum of the violations' penalties.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    /// No hard violations present.
    pub valid: bool,
    /// Total weighted penalty (lower is better).
    pub penalty: f64,
    /// Every broken rule with its contribution.
    pub violations: Vec<Violation>,
}

/// Constraint evaluator bound to a scheduling context.
pub struct Evaluator<'a> {
    ctx: &'a SchedulingContext,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator borrowing `ctx`.
    pub fn new(ctx: &'a SchedulingContext) -> Self {
        Self { ctx }
    }

    /// Total penalty of a schedule. Hot path: no allocation for
    /// diagnostics.
    pub fn penalty(&self, state: &ScheduleState) -> f64 {
        let mut total = integrity::quick_validate(state, self.ctx).penalty;
        for lesson in 0..self.ctx.problem.lessons.len() {
            total += self.lesson_day_rules(state, lesson, None);
        }
        for teacher in 0..self.ctx.problem.teacher_count() {
            total += self.teacher_terms(state, teacher, None);
        }
        for class in 0..self.ctx.problem.class_count() {
            total += self.class_terms(state, class, None);
        }
        total
    }

    /// Full scoring with diagnostics.
    pub fn score(&self, state: &ScheduleState) -> ScoreReport {
        let mut violations = integrity::validate(state, self.ctx);
        for lesson in 0..self.ctx.problem.lessons.len() {
            self.lesson_day_rules(state, lesson, Some(&mut violations));
        }
        for teacher in 0..self.ctx.problem.teacher_count() {
            self.teacher_terms(state, teacher, Some(&mut violations));
        }
        for class in 0..self.ctx.problem.class_count() {
            self.class_terms(state, class, Some(&mut violations));
        }

        let penalty = violations.iter().map(|v| v.penalty).sum();
        ScoreReport {
            valid: !violations.iter().any(Violation::is_hard),
            penalty,
            violations,
        }
    }

    /// Penalty attributable to one lesson: block integrity plus the
    /// pattern's day-distribution rules.
    pub fn lesson_penalty(&self, state: &ScheduleState, lesson: usize) -> f64 {
        integrity::check_lesson(state, self.ctx, lesson, None).0
            + self.lesson_day_rules(state, lesson, None)
    }

    /// Penalty attributable to one teacher: conflicts, blocked/closed
    /// slots, off-day, daily bounds, idle gaps, load balance.
    pub fn teacher_penalty(&self, state: &ScheduleState, teacher: usize) -> f64 {
        self.teacher_terms(state, teacher, None)
    }

    /// Penalty attributable to one class: idle gaps and load balance.
    pub fn class_penalty(&self, state: &ScheduleState, class: usize) -> f64 {
        self.class_terms(state, class, None)
    }

    /// Hard feasibility check for placing one block at (day, start).
    ///
    /// Verifies: the span fits the day, the class row and every
    /// assigned teacher are free for the whole span, no teacher is
    /// hard-blocked there or has the day off, the teacher's daily
    /// maximum is respected, and the pattern's day-distribution rules
    /// hold against the lesson's other placed blocks.
    pub fn check_placement(
        &self,
        state: &ScheduleState,
        lesson: usize,
        block: usize,
        day: usize,
        start: usize,
    ) -> bool {
        let problem = &self.ctx.problem;
        let info = &problem.lessons[lesson];
        let rule = info.pattern.placement_rule(block);

        if start + rule.size > problem.grid.periods {
            return false;
        }

        for period in start..start + rule.size {
            if state.is_class_busy(info.class, day, period) {
                return false;
            }
        }

        for &teacher in &info.teachers {
            let t = &problem.teachers[teacher];
            if t.off_day == Some(day) {
                return false;
            }
            if let Some(max) = t.max_daily {
                if state.index.teacher_daily_load(teacher, day) + rule.size > max {
                    return false;
                }
            }
            for period in start..start + rule.size {
                if state.is_teacher_busy(teacher, day, period)
                    || t.is_blocked(problem.grid, day, period)
                {
                    return false;
                }
            }
        }

        for (other, other_day) in state.schedule.block_days(info.class, lesson as u32) {
            if other as usize == block {
                continue;
            }
            if other_day == day {
                if rule.must_differ_day {
                    return false;
                }
            } else if other_day.abs_diff(day) - 1 < rule.min_day_gap {
                return false;
            }
        }

        true
    }

    /// Day-distribution rules between the blocks of one lesson.
    fn lesson_day_rules(
        &self,
        state: &ScheduleState,
        lesson: usize,
        mut out: Option<&mut Vec<Violation>>,
    ) -> f64 {
        let info = &self.ctx.problem.lessons[lesson];
        let weights = &self.ctx.weights;
        let pattern = &info.pattern;
        let days = state.schedule.block_days(info.class, lesson as u32);
        let mut penalty = 0.0;

        for i in 0..days.len() {
            for j in i + 1..days.len() {
                let (block_a, day_a) = days[i];
                let (block_b, day_b) = days[j];
                if day_a == day_b {
                    if pattern.is_distributed() {
                        penalty += weights.same_day_clash;
                        if let Some(out) = out.as_deref_mut() {
                            out.push(
                                Violation::new(
                                    ViolationKind::SameDayClash,
                                    &info.id,
                                    format!(
                                        "blocks {block_a} and {block_b} of '{}' share day {day_a}",
                                        info.id
                                    ),
                                    weights.same_day_clash,
                                )
                                .with_block(block_b as usize),
                            );
                        }
                    }
                    continue;
                }

                let distance = day_a.abs_diff(day_b);
                if distance - 1 < pattern.min_day_gap {
                    penalty += weights.day_gap;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(
                            Violation::new(
                                ViolationKind::DayGapTooSmall,
                                &info.id,
                                format!(
                                    "blocks {block_a} and {block_b} of '{}' on days {day_a} and {day_b} need {} free day(s) between",
                                    info.id, pattern.min_day_gap
                                ),
                                weights.day_gap,
                            )
                            .with_block(block_b as usize),
                        );
                    }
                } else if pattern.is_distributed() && pattern.min_day_gap == 0 && distance == 1 {
                    penalty += weights.adjacent_days;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(Violation::new(
                            ViolationKind::AdjacentDays,
                            &info.id,
                            format!("blocks of '{}' sit on adjacent days {day_a} and {day_b}", info.id),
                            weights.adjacent_days,
                        ));
                    }
                }
            }
        }

        penalty
    }

    fn teacher_terms(
        &self,
        state: &ScheduleState,
        teacher: usize,
        mut out: Option<&mut Vec<Violation>>,
    ) -> f64 {
        let problem = &self.ctx.problem;
        let weights = &self.ctx.weights;
        let grid = problem.grid;
        let t = &problem.teachers[teacher];
        let mut penalty = 0.0;
        let mut total_gaps = 0usize;
        let mut daily_loads = Vec::with_capacity(grid.days);

        for day in 0..grid.days {
            let mut busy_periods = 0usize;
            let mut first_busy = None;
            let mut last_busy = 0usize;

            for period in 0..grid.periods {
                let occupancy = state.index.teacher_occupancy(teacher, day, period);
                if occupancy == 0 {
                    continue;
                }
                busy_periods += 1;
                first_busy.get_or_insert(period);
                last_busy = period;

                if occupancy > 1 {
                    let extra = (occupancy - 1) as f64;
                    penalty += extra * weights.teacher_conflict;
                    if let Some(out) = out.as_deref_mut() {
                        for _ in 1..occupancy {
                            out.push(Violation::new(
                                ViolationKind::TeacherConflict,
                                &t.id,
                                format!(
                                    "teacher '{}' is double-booked at day {day}, period {period}",
                                    t.id
                                ),
                                weights.teacher_conflict,
                            ));
                        }
                    }
                }

                if t.is_blocked(grid, day, period) {
                    penalty += weights.blocked_slot;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(Violation::new(
                            ViolationKind::BlockedSlot,
                            &t.id,
                            format!(
                                "teacher '{}' is scheduled on blocked slot (day {day}, period {period})",
                                t.id
                            ),
                            weights.blocked_slot,
                        ));
                    }
                } else if t.is_closed(grid, day, period) {
                    penalty += weights.closed_slot;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(Violation::new(
                            ViolationKind::ClosedSlot,
                            &t.id,
                            format!(
                                "teacher '{}' is scheduled on closed slot (day {day}, period {period})",
                                t.id
                            ),
                            weights.closed_slot,
                        ));
                    }
                }
            }

            if let Some(first) = first_busy {
                total_gaps += (last_busy - first + 1) - busy_periods;
            }

            let load = state.index.teacher_daily_load(teacher, day);
            daily_loads.push(load);

            if let Some(max) = t.max_daily {
                if load > max {
                    let excess = (load - max) as f64;
                    penalty += excess * weights.over_daily_max;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(Violation::new(
                            ViolationKind::OverDailyMaximum,
                            &t.id,
                            format!(
                                "teacher '{}' teaches {load} periods on day {day}, maximum {max}",
                                t.id
                            ),
                            excess * weights.over_daily_max,
                        ));
                    }
                }
            }
            if let Some(min) = t.min_daily {
                if load > 0 && load < min {
                    let shortfall = (min - load) as f64;
                    penalty += shortfall * weights.under_daily_min;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(Violation::new(
                            ViolationKind::UnderDailyMinimum,
                            &t.id,
                            format!(
                                "teacher '{}' teaches only {load} period(s) on day {day}, minimum {min}",
                                t.id
                            ),
                            shortfall * weights.under_daily_min,
                        ));
                    }
                }
            }
        }

        if let Some(off) = t.off_day {
            let load = state.index.teacher_daily_load(teacher, off);
            if load > 0 {
                let contribution = load as f64 * weights.off_day;
                penalty += contribution;
                if let Some(out) = out.as_deref_mut() {
                    out.push(Violation::new(
                        ViolationKind::OffDayTeaching,
                        &t.id,
                        format!("teacher '{}' teaches {load} period(s) on off-day {off}", t.id),
                        contribution,
                    ));
                }
            }
        }

        if total_gaps > 0 {
            let contribution = total_gaps as f64 * weights.idle_gap;
            penalty += contribution;
            if let Some(out) = out.as_deref_mut() {
                out.push(Violation::new(
                    ViolationKind::IdleGap,
                    &t.id,
                    format!("teacher '{}' has {total_gaps} idle period(s)", t.id),
                    contribution,
                ));
            }
        }

        let spread = std_dev(&daily_loads);
        if spread > 0.0 {
            let contribution = spread * weights.load_balance;
            penalty += contribution;
            if let Some(out) = out.as_deref_mut() {
                out.push(Violation::new(
                    ViolationKind::LoadImbalance,
                    &t.id,
                    format!("teacher '{}' daily load spread {spread:.2}", t.id),
                    contribution,
                ));
            }
        }

        penalty
    }

    fn class_terms(
        &self,
        state: &ScheduleState,
        class: usize,
        mut out: Option<&mut Vec<Violation>>,
    ) -> f64 {
        let problem = &self.ctx.problem;
        let weights = &self.ctx.weights;
        let grid = problem.grid;
        let mut penalty = 0.0;
        let mut total_gaps = 0usize;
        let mut daily_loads = Vec::with_capacity(grid.days);

        for day in 0..grid.days {
            let mut busy = 0usize;
            let mut first_busy = None;
            let mut last_busy = 0usize;
            for period in 0..grid.periods {
                if state.is_class_busy(class, day, period) {
                    busy += 1;
                    first_busy.get_or_insert(period);
                    last_busy = period;
                }
            }
            if let Some(first) = first_busy {
                total_gaps += (last_busy - first + 1) - busy;
            }
            daily_loads.push(state.index.class_daily_load(class, day));
        }

        if total_gaps > 0 {
            let contribution = total_gaps as f64 * weights.idle_gap;
            penalty += contribution;
            if let Some(out) = out.as_deref_mut() {
                out.push(Violation::new(
                    ViolationKind::IdleGap,
                    &problem.classes[class],
                    format!(
                        "class '{}' has {total_gaps} idle period(s)",
                        problem.classes[class]
                    ),
                    contribution,
                ));
            }
        }

        let spread = std_dev(&daily_loads);
        if spread > 0.0 {
            let contribution = spread * weights.load_balance;
            penalty += contribution;
            if let Some(out) = out.as_deref_mut() {
                out.push(Violation::new(
                    ViolationKind::LoadImbalance,
                    &problem.classes[class],
                    format!(
                        "class '{}' daily load spread {spread:.2}",
                        problem.classes[class]
                    ),
                    contribution,
                ));
            }
        }

        penalty
    }
}

/// Population standard deviation.
fn std_dev(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<usize>() as f64 / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}
