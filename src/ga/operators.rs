//! Genetic operators over schedule states.
//!
//! Crossover copies parent slots cell-by-cell without enforcing block
//! validity — the integrity repairer restores torn blocks downstream.
//! Mutation is block-aware where possible: whole blocks of equal size
//! trade places, never splitting a block apart; single-period lessons
//! fall back to plain slot-swap, time-shift, or day-shift moves.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::context::SchedulingContext;
use crate::problem::Problem;
use crate::schedule::{PlacedBlock, ScheduleState};

/// Uniform per-slot crossover: clones `parent_a` and copies each cell
/// from `parent_b` with probability one half.
///
/// The offspring's index stays consistent throughout; block validity
/// is deliberately not enforced here.
pub fn uniform_crossover<R: Rng>(
    parent_a: &ScheduleState,
    parent_b: &ScheduleState,
    problem: &Problem,
    rng: &mut R,
) -> ScheduleState {
    let mut child = parent_a.clone();
    for class in 0..problem.class_count() {
        for day in 0..problem.grid.days {
            for period in 0..problem.grid.periods {
                if !rng.random_bool(0.5) {
                    continue;
                }
                let donor = parent_b.schedule.cell(class, day, period);
                if child.schedule.cell(class, day, period) == donor {
                    continue;
                }
                if child.schedule.cell(class, day, period).is_some() {
                    child.clear_cell(problem, class, day, period);
                }
                if let Some(slot) = donor {
                    child.write_cell(problem, class, day, period, slot);
                }
            }
        }
    }
    child
}

/// Block-aware mutation with fallbacks.
///
/// Prefers swapping two whole blocks of equal size; when no compatible
/// pair exists, applies one of the plain moves instead.
pub fn mutate<R: Rng>(state: &mut ScheduleState, ctx: &SchedulingContext, rng: &mut R) {
    if block_swap_mutation(state, &ctx.problem, rng) {
        return;
    }
    match rng.random_range(0..3) {
        0 => {
            slot_swap_mutation(state, &ctx.problem, rng);
        }
        1 => {
            time_shift_mutation(state, ctx, rng);
        }
        _ => {
            day_shift_mutation(state, ctx, rng);
        }
    }
}

/// Exchanges the placements of two same-class lesson-blocks of equal
/// total size, one of which is multi-period. Never splits a block.
///
/// Returns `false` when no compatible pair exists.
pub fn block_swap_mutation<R: Rng>(
    state: &mut ScheduleState,
    problem: &Problem,
    rng: &mut R,
) -> bool {
    let blocks = state.schedule.placed_blocks();
    let multi: Vec<&PlacedBlock> = blocks
        .iter()
        .filter(|b| b.size() > 1 && b.is_contiguous())
        .collect();
    let Some(&first) = multi.choose(rng) else {
        return false;
    };
    let partners: Vec<&PlacedBlock> = blocks
        .iter()
        .filter(|b| {
            b.class == first.class
                && b.size() == first.size()
                && (b.lesson, b.block) != (first.lesson, first.block)
                && b.is_contiguous()
        })
        .collect();
    let Some(&second) = partners.choose(rng) else {
        return false;
    };

    let (first_day, first_start) = first.cells[0];
    let (second_day, second_start) = second.cells[0];
    let (lesson_a, block_a) = (first.lesson as usize, first.block as usize);
    let (lesson_b, block_b) = (second.lesson as usize, second.block as usize);

    state.remove_block(problem, lesson_a, block_a);
    state.remove_block(problem, lesson_b, block_b);
    state.place(problem, lesson_a, block_a, second_day, second_start);
    state.place(problem, lesson_b, block_b, first_day, first_start);
    true
}

/// Swaps the contents of two random cells in one class row.
///
/// May tear blocks apart; the repairer cleans up downstream.
pub fn slot_swap_mutation<R: Rng>(
    state: &mut ScheduleState,
    problem: &Problem,
    rng: &mut R,
) -> bool {
    let class = rng.random_range(0..problem.class_count());
    let grid = problem.grid;
    let a = (
        rng.random_range(0..grid.days),
        rng.random_range(0..grid.periods),
    );
    let b = (
        rng.random_range(0..grid.days),
        rng.random_range(0..grid.periods),
    );
    if a == b {
        return false;
    }

    let cell_a = state.schedule.cell(class, a.0, a.1);
    let cell_b = state.schedule.cell(class, b.0, b.1);
    if cell_a.is_none() && cell_b.is_none() {
        return false;
    }

    if cell_a.is_some() {
        state.clear_cell(problem, class, a.0, a.1);
    }
    if cell_b.is_some() {
        state.clear_cell(problem, class, b.0, b.1);
    }
    if let Some(slot) = cell_a {
        state.write_cell(problem, class, b.0, b.1, slot);
    }
    if let Some(slot) = cell_b {
        state.write_cell(problem, class, a.0, a.1, slot);
    }
    true
}

/// Moves one whole block to a different start period on its day.
///
/// Only moves to placements passing the hard check; restores the
/// original position when none exists.
pub fn time_shift_mutation<R: Rng>(
    state: &mut ScheduleState,
    ctx: &SchedulingContext,
    rng: &mut R,
) -> bool {
    let problem = &ctx.problem;
    let evaluator = ctx.evaluator();
    let Some((lesson, block, day, start, size)) = random_intact_block(state, rng) else {
        return false;
    };

    state.remove_block(problem, lesson, block);
    let mut starts: Vec<usize> = (0..=problem.grid.periods - size)
        .filter(|&s| s != start)
        .collect();
    starts.shuffle(rng);
    for s in starts {
        if evaluator.check_placement(state, lesson, block, day, s) {
            state.place(problem, lesson, block, day, s);
            return true;
        }
    }
    state.place(problem, lesson, block, day, start);
    false
}

/// Moves one whole block to the same start period on a different day.
///
/// Only moves to placements passing the hard check; restores the
/// original position when none exists.
pub fn day_shift_mutation<R: Rng>(
    state: &mut ScheduleState,
    ctx: &SchedulingContext,
    rng: &mut R,
) -> bool {
    let problem = &ctx.problem;
    let evaluator = ctx.evaluator();
    let Some((lesson, block, day, start, _)) = random_intact_block(state, rng) else {
        return false;
    };

    state.remove_block(problem, lesson, block);
    let mut days: Vec<usize> = (0..problem.grid.days).filter(|&d| d != day).collect();
    days.shuffle(rng);
    for d in days {
        if evaluator.check_placement(state, lesson, block, d, start) {
            state.place(problem, lesson, block, d, start);
            return true;
        }
    }
    state.place(problem, lesson, block, day, start);
    false
}

/// Applies `k` random slot swaps. Used to diversify seed clones.
pub fn shuffle_variant<R: Rng>(
    state: &mut ScheduleState,
    problem: &Problem,
    k: usize,
    rng: &mut R,
) {
    for _ in 0..k {
        slot_swap_mutation(state, problem, rng);
    }
}

/// Picks a random contiguous placed block as
/// (lesson, block, day, start, size).
fn random_intact_block<R: Rng>(
    state: &ScheduleState,
    rng: &mut R,
) -> Option<(usize, usize, usize, usize, usize)> {
    let blocks = state.schedule.placed_blocks();
    let intact: Vec<&PlacedBlock> = blocks.iter().filter(|b| b.is_contiguous()).collect();
    let &chosen = intact.choose(rng)?;
    let (day, start) = chosen.cells[0];
    Some((
        chosen.lesson as usize,
        chosen.block as usize,
        day,
        start,
        chosen.size(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::models::{LessonRequirement, PatternCatalog, SchoolClass, Teacher};
    use crate::schedule::ConflictIndex;
    use crate::schedule::TimeGrid;

    fn sample_ctx() -> SchedulingContext {
        let problem = Problem::compile(
            TimeGrid::new(5, 8),
            &[Teacher::new("smith"), Teacher::new("jones")],
            &[SchoolClass::new("7a")],
            &[
                LessonRequirement::new("L1", "math", "7a")
                    .with_teacher("smith")
                    .with_weekly_hours(4)
                    .with_pattern("2+2"),
                LessonRequirement::new("L2", "physics", "7a")
                    .with_teacher("jones")
                    .with_weekly_hours(2)
                    .with_pattern("2"),
                LessonRequirement::new("L3", "art", "7a")
                    .with_teacher("jones")
                    .with_weekly_hours(1),
            ],
            &PatternCatalog::standard(),
        )
        .unwrap();
        SchedulingContext::new(problem)
    }

    fn full_state(ctx: &SchedulingContext) -> ScheduleState {
        let mut state = ScheduleState::empty(&ctx.problem);
        state.place(&ctx.problem, 0, 0, 0, 0);
        state.place(&ctx.problem, 0, 1, 2, 0);
        state.place(&ctx.problem, 1, 0, 1, 3);
        state.place(&ctx.problem, 2, 0, 3, 5);
        state
    }

    fn assert_index_consistent(state: &ScheduleState, ctx: &SchedulingContext) {
        let rebuilt = ConflictIndex::rebuild(
            &state.schedule,
            &ctx.problem.lessons,
            ctx.problem.teacher_count(),
        );
        assert_eq!(state.index, rebuilt);
    }

    #[test]
    fn test_crossover_mixes_parents() {
        let ctx = sample_ctx();
        let parent_a = full_state(&ctx);
        let mut parent_b = ScheduleState::empty(&ctx.problem);
        parent_b.place(&ctx.problem, 0, 0, 4, 0);
        parent_b.place(&ctx.problem, 0, 1, 1, 0);
        parent_b.place(&ctx.problem, 1, 0, 2, 3);
        parent_b.place(&ctx.problem, 2, 0, 0, 5);

        let mut rng = SmallRng::seed_from_u64(42);
        let child = uniform_crossover(&parent_a, &parent_b, &ctx.problem, &mut rng);

        // Every child cell comes from one of the parents
        for day in 0..5 {
            for period in 0..8 {
                let cell = child.schedule.cell(0, day, period);
                assert!(
                    cell == parent_a.schedule.cell(0, day, period)
                        || cell == parent_b.schedule.cell(0, day, period)
                );
            }
        }
        assert_index_consistent(&child, &ctx);
    }

    #[test]
    fn test_block_swap_preserves_blocks() {
        let ctx = sample_ctx();
        let mut state = full_state(&ctx);
        let before = state.placed_hours();
        let mut rng = SmallRng::seed_from_u64(42);

        // Three same-size double blocks exist: a swap partner is found
        assert!(block_swap_mutation(&mut state, &ctx.problem, &mut rng));
        assert_eq!(state.placed_hours(), before);
        assert_index_consistent(&state, &ctx);

        // No block was split apart
        for block in state.schedule.placed_blocks() {
            assert!(block.is_contiguous());
        }
    }

    #[test]
    fn test_block_swap_needs_multi_period_block() {
        let ctx = sample_ctx();
        let mut state = ScheduleState::empty(&ctx.problem);
        // Only the single-period lesson placed
        state.place(&ctx.problem, 2, 0, 3, 5);
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(!block_swap_mutation(&mut state, &ctx.problem, &mut rng));
    }

    #[test]
    fn test_slot_swap_keeps_hours() {
        let ctx = sample_ctx();
        let mut state = full_state(&ctx);
        let before = state.placed_hours();
        let mut rng = SmallRng::seed_from_u64(9);

        for _ in 0..20 {
            slot_swap_mutation(&mut state, &ctx.problem, &mut rng);
        }
        assert_eq!(state.placed_hours(), before);
        assert_index_consistent(&state, &ctx);
    }

    #[test]
    fn test_time_shift_keeps_validity() {
        let ctx = sample_ctx();
        let mut state = full_state(&ctx);
        let mut rng = SmallRng::seed_from_u64(13);

        time_shift_mutation(&mut state, &ctx, &mut rng);
        assert_index_consistent(&state, &ctx);
        for block in state.schedule.placed_blocks() {
            assert!(block.is_contiguous());
        }
    }

    #[test]
    fn test_day_shift_keeps_validity() {
        let ctx = sample_ctx();
        let mut state = full_state(&ctx);
        let mut rng = SmallRng::seed_from_u64(17);

        day_shift_mutation(&mut state, &ctx, &mut rng);
        assert_index_consistent(&state, &ctx);
        assert_eq!(state.placed_hours(), 7);
    }

    #[test]
    fn test_mutate_dispatches() {
        let ctx = sample_ctx();
        let mut state = full_state(&ctx);
        let mut rng = SmallRng::seed_from_u64(21);

        for _ in 0..10 {
            mutate(&mut state, &ctx, &mut rng);
        }
        assert_eq!(state.placed_hours(), 7);
        assert_index_consistent(&state, &ctx);
    }

    #[test]
    fn test_shuffle_variant_differs_from_seed() {
        let ctx = sample_ctx();
        let seed = full_state(&ctx);
        let mut variant = seed.clone();
        let mut rng = SmallRng::seed_from_u64(25);

        shuffle_variant(&mut variant, &ctx.problem, 3, &mut rng);
        assert_ne!(variant.schedule, seed.schedule);
        assert_eq!(variant.placed_hours(), seed.placed_hours());
        assert_index_consistent(&variant, &ctx);
    }
}
