//! Block integrity validation and repair.
//!
//! After any mutation — crossover in particular — a lesson-block may be
//! torn: slots missing, spread over days, or out of order. This module
//! detects broken blocks and, where possible, relocates them whole.
//!
//! Penalty taxonomy, most to least severe: missing block > size
//! mismatch > non-consecutive/wrong-day placement > position-index
//! mismatch > fragmentation (day-span/filled ratio above a tolerance).
//!
//! [`quick_validate`] is the hot path, called once per fitness
//! evaluation: it returns only a penalty and a violation count, with no
//! diagnostic formatting. [`validate`] produces full [`Violation`]s.

use tracing::debug;

use crate::context::SchedulingContext;
use crate::models::{Violation, ViolationKind};
use crate::schedule::{ScheduleState, Slot};

/// Penalty summary from [`quick_validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrityReport {
    /// Total integrity penalty.
    pub penalty: f64,
    /// Number of detected integrity violations.
    pub violation_count: u32,
}

/// Validates block integrity for one lesson.
///
/// When `out` is `Some`, diagnostic violations are appended; the quick
/// path passes `None` and skips all message formatting.
pub(crate) fn check_lesson(
    state: &ScheduleState,
    ctx: &SchedulingContext,
    lesson: usize,
    mut out: Option<&mut Vec<Violation>>,
) -> (f64, u32) {
    let info = &ctx.problem.lessons[lesson];
    let weights = &ctx.weights;
    let schedule = &state.schedule;
    let mut penalty = 0.0;
    let mut count = 0u32;

    for (block, &size) in info.pattern.sizes.iter().enumerate() {
        let cells = schedule.block_cells(info.class, lesson as u32, block as u16);

        if cells.is_empty() {
            penalty += weights.missing_block;
            count += 1;
            if let Some(out) = out.as_deref_mut() {
                out.push(
                    Violation::new(
                        ViolationKind::MissingBlock,
                        &info.id,
                        format!("block {block} of '{}' is not placed", info.id),
                        weights.missing_block,
                    )
                    .with_block(block),
                );
            }
            continue;
        }

        if cells.len() != size {
            penalty += weights.size_mismatch;
            count += 1;
            if let Some(out) = out.as_deref_mut() {
                out.push(
                    Violation::new(
                        ViolationKind::BlockSizeMismatch,
                        &info.id,
                        format!(
                            "block {block} of '{}' occupies {} slot(s), declared {size}",
                            info.id,
                            cells.len()
                        ),
                        weights.size_mismatch,
                    )
                    .with_block(block),
                );
            }
        }

        let same_day = cells.windows(2).all(|w| w[0].0 == w[1].0);
        if info.pattern.must_be_consecutive {
            if !same_day {
                penalty += weights.broken_block;
                count += 1;
                if let Some(out) = out.as_deref_mut() {
                    out.push(
                        Violation::new(
                            ViolationKind::SplitBlock,
                            &info.id,
                            format!("block {block} of '{}' is spread over several days", info.id),
                            weights.broken_block,
                        )
                        .with_block(block),
                    );
                }
            } else if !cells.windows(2).all(|w| w[1].1 == w[0].1 + 1) {
                penalty += weights.broken_block;
                count += 1;
                if let Some(out) = out.as_deref_mut() {
                    out.push(
                        Violation::new(
                            ViolationKind::NonConsecutiveBlock,
                            &info.id,
                            format!("block {block} of '{}' has holes in its run", info.id),
                            weights.broken_block,
                        )
                        .with_block(block),
                    );
                }
            }
        }

        let positions_ok = cells.iter().enumerate().all(|(i, &(day, period))| {
            schedule
                .cell(info.class, day, period)
                .is_some_and(|slot| slot.offset as usize == i)
        });
        if !positions_ok {
            penalty += weights.position_mismatch;
            count += 1;
            if let Some(out) = out.as_deref_mut() {
                out.push(
                    Violation::new(
                        ViolationKind::PositionMismatch,
                        &info.id,
                        format!("block {block} of '{}' has misordered slot positions", info.id),
                        weights.position_mismatch,
                    )
                    .with_block(block),
                );
            }
        }
    }

    // Fragmentation: the lesson's slots on one day spanning far more
    // periods than they fill.
    for day in 0..ctx.problem.grid.days {
        let mut filled = 0usize;
        let mut first = None;
        let mut last = 0usize;
        for period in 0..ctx.problem.grid.periods {
            if let Some(slot) = schedule.cell(info.class, day, period) {
                if slot.lesson == lesson as u32 {
                    filled += 1;
                    first.get_or_insert(period);
                    last = period;
                }
            }
        }
        if let Some(first) = first {
            let span = last - first + 1;
            let ratio = span as f64 / filled as f64;
            if ratio > weights.fragmentation_tolerance {
                penalty += weights.fragmentation;
                count += 1;
                if let Some(out) = out.as_deref_mut() {
                    out.push(Violation::new(
                        ViolationKind::FragmentedDay,
                        &info.id,
                        format!(
                            "'{}' spans {span} periods for {filled} slot(s) on day {day}",
                            info.id
                        ),
                        weights.fragmentation,
                    ));
                }
            }
        }
    }

    (penalty, count)
}

/// Fast integrity check over the whole schedule: penalty and count
/// only, no diagnostics. Calling it twice without an intervening
/// mutation returns an identical report.
pub fn quick_validate(state: &ScheduleState, ctx: &SchedulingContext) -> IntegrityReport {
    let mut penalty = 0.0;
    let mut violation_count = 0;
    for lesson in 0..ctx.problem.lessons.len() {
        let (p, c) = check_lesson(state, ctx, lesson, None);
        penalty += p;
        violation_count += c;
    }
    IntegrityReport {
        penalty,
        violation_count,
    }
}

/// Full diagnostic integrity check over the whole schedule.
pub fn validate(state: &ScheduleState, ctx: &SchedulingContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for lesson in 0..ctx.problem.lessons.len() {
        check_lesson(state, ctx, lesson, Some(&mut violations));
    }
    violations
}

/// Whether one (lesson, block) is placed whole and well-formed.
pub fn block_is_intact(state: &ScheduleState, ctx: &SchedulingContext, lesson: usize, block: usize) -> bool {
    let info = &ctx.problem.lessons[lesson];
    let cells = state
        .schedule
        .block_cells(info.class, lesson as u32, block as u16);
    if cells.len() != info.pattern.sizes[block] {
        return false;
    }
    let shape_ok = !info.pattern.must_be_consecutive
        || cells
            .windows(2)
            .all(|w| w[0].0 == w[1].0 && w[1].1 == w[0].1 + 1);
    shape_ok
        && cells.iter().enumerate().all(|(i, &(day, period))| {
            state
                .schedule
                .cell(info.class, day, period)
                .is_some_and(|slot| slot.offset as usize == i)
        })
}

/// Repairs one broken block by relocating it whole.
///
/// Removes all slots of the block, then searches for a placement that
/// passes the hard-constraint check: first on the block's current day,
/// then on every other day. On failure the original slots are restored
/// verbatim — the schedule is never left partially removed.
///
/// Returns `true` when the block was re-placed.
pub fn repair_block(
    state: &mut ScheduleState,
    ctx: &SchedulingContext,
    lesson: usize,
    block: usize,
) -> bool {
    let problem = &ctx.problem;
    let info = &problem.lessons[lesson];
    let size = info.pattern.sizes[block];
    let evaluator = ctx.evaluator();

    let removed = state.remove_block(problem, lesson, block);

    let current_day = removed.first().map(|&(day, _, _)| day);
    let mut day_order: Vec<usize> = Vec::with_capacity(problem.grid.days);
    if let Some(day) = current_day {
        day_order.push(day);
    }
    day_order.extend((0..problem.grid.days).filter(|&d| Some(d) != current_day));

    for day in day_order {
        for start in 0..=problem.grid.periods.saturating_sub(size) {
            if evaluator.check_placement(state, lesson, block, day, start) {
                state.place(problem, lesson, block, day, start);
                return true;
            }
        }
    }

    // Irreparable: restore the original placement exactly.
    for (day, period, offset) in removed {
        state.write_cell(
            problem,
            info.class,
            day,
            period,
            Slot {
                lesson: lesson as u32,
                block: block as u16,
                offset,
            },
        );
    }
    false
}

/// Repairs every broken block in the schedule.
///
/// Unrepaired blocks stay in place as penalized violations; this never
/// fails. Returns the number of blocks re-placed.
pub fn repair_all(state: &mut ScheduleState, ctx: &SchedulingContext) -> usize {
    let mut repaired = 0;
    for lesson in 0..ctx.problem.lessons.len() {
        for block in 0..ctx.problem.lessons[lesson].pattern.block_count() {
            if !block_is_intact(state, ctx, lesson, block)
                && repair_block(state, ctx, lesson, block)
            {
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        debug!(repaired, "block repair pass complete");
    }
    repaired
}
