//! Constructive placement search.
//!
//! Builds an initial schedule by placing lesson-blocks one at a time,
//! hardest first, backtracking over earlier placements when a block
//! runs out of candidates. The search is bounded twice: a backtrack
//! ceiling and an optional wall-clock deadline, both checked at the
//! top of each unit of work. Exhaustion is not a failure — the result
//! reports the un-placed remainder.
//!
//! Candidate days are enumerated in randomized order (injectable RNG),
//! excluding each teacher's declared off-day; candidate start periods
//! are filtered by the hard-constraint check.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::SchedulingContext;
use crate::models::Violation;
use crate::schedule::ScheduleState;
use crate::scoring::Evaluator;

/// Configuration for the constructive search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hard ceiling on undone placements before the search stops.
    pub max_backtracks: u32,
    /// Independent randomized attempts; the best result wins.
    pub restarts: usize,
    /// Optional wall-clock budget per attempt, in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Run restarts on a worker pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_backtracks: 10_000,
            restarts: 1,
            time_limit_ms: None,
            parallel: false,
        }
    }
}

impl SearchConfig {
    /// Sets the backtrack ceiling.
    pub fn with_max_backtracks(mut self, max: u32) -> Self {
        self.max_backtracks = max;
        self
    }

    /// Sets the number of independent restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Sets the wall-clock budget per attempt.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables parallel restarts.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// A lesson-block the search could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedBlock {
    /// Requirement ID of the lesson.
    pub lesson_id: String,
    /// Block index within the lesson's pattern.
    pub block: usize,
}

/// Structured result of a constructive run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Every block was placed.
    pub success: bool,
    /// Periods placed in the grid.
    pub placed_hours: usize,
    /// Periods requested by all lessons.
    pub total_hours: usize,
    /// Placements undone during the run.
    pub backtrack_count: u32,
    /// Blocks left unplaced when the search stopped.
    pub unplaced: Vec<UnplacedBlock>,
    /// Violations found by the post-construction scoring pass,
    /// including day-level rules (e.g. teacher daily minimum) that
    /// only make sense once full days are fixed.
    pub violations: Vec<Violation>,
}

/// One block to place, with its precomputed difficulty ordering key.
#[derive(Debug, Clone, Copy)]
struct BlockItem {
    lesson: usize,
    block: usize,
    size: usize,
}

/// Candidate-enumeration state for one placed block.
struct Frame {
    item: usize,
    days: Vec<usize>,
    day_pos: usize,
    next_start: usize,
    placed: (usize, usize),
}

/// Backtracking builder producing an initial (possibly partial) schedule.
pub struct ConstructiveSearch<'a> {
    ctx: &'a SchedulingContext,
    config: SearchConfig,
}

impl<'a> ConstructiveSearch<'a> {
    /// Creates a search with default configuration.
    pub fn new(ctx: &'a SchedulingContext) -> Self {
        Self {
            ctx,
            config: SearchConfig::default(),
        }
    }

    /// Creates a search with the given configuration.
    pub fn with_config(ctx: &'a SchedulingContext, config: SearchConfig) -> Self {
        Self { ctx, config }
    }

    /// Runs the configured number of restarts and returns the best
    /// result (most placed periods, then lowest penalty).
    pub fn build<R: Rng>(&self, rng: &mut R) -> (ScheduleState, SearchOutcome) {
        let restarts = self.config.restarts.max(1);
        let seeds: Vec<u64> = (0..restarts).map(|_| rng.random()).collect();

        let results: Vec<(ScheduleState, SearchOutcome)> = if self.config.parallel && restarts > 1 {
            seeds.par_iter().map(|&s| self.build_once(s)).collect()
        } else {
            seeds.iter().map(|&s| self.build_once(s)).collect()
        };

        let evaluator = self.ctx.evaluator();
        results
            .into_iter()
            .min_by(|(state_a, out_a), (state_b, out_b)| {
                out_b
                    .placed_hours
                    .cmp(&out_a.placed_hours)
                    .then_with(|| {
                        evaluator
                            .penalty(state_a)
                            .total_cmp(&evaluator.penalty(state_b))
                    })
            })
            .expect("at least one restart")
    }

    fn build_once(&self, seed: u64) -> (ScheduleState, SearchOutcome) {
        let problem = &self.ctx.problem;
        let evaluator = self.ctx.evaluator();
        let mut rng = SmallRng::seed_from_u64(seed);
        let started = Instant::now();
        let deadline_hit = |started: &Instant| {
            self.config
                .time_limit_ms
                .is_some_and(|ms| started.elapsed().as_millis() as u64 >= ms)
        };

        let items = self.ordered_items();
        let mut state = ScheduleState::empty(problem);
        let mut stack: Vec<Frame> = Vec::with_capacity(items.len());
        let mut backtracks = 0u32;
        let mut next_item = 0usize;
        let mut out_of_budget = false;

        'items: while next_item < items.len() {
            if deadline_hit(&started) {
                out_of_budget = true;
                break;
            }

            let mut frame = self.open_frame(next_item, &items, &mut rng);
            if let Some((day, start)) = self.next_candidate(&mut frame, &state, &evaluator, &items)
            {
                self.place_frame(&mut state, &mut frame, &items, day, start);
                stack.push(frame);
                next_item += 1;
                continue;
            }

            // Current block has no candidates: undo earlier placements
            // until an alternative opens up.
            loop {
                let Some(mut prev) = stack.pop() else {
                    // Nothing left to undo: this block is unplaceable
                    // under the current ordering. Skip it and move on.
                    next_item += 1;
                    continue 'items;
                };

                backtracks += 1;
                if backtracks >= self.config.max_backtracks || deadline_hit(&started) {
                    // Keep prev placed and stop: partial result.
                    stack.push(prev);
                    out_of_budget = true;
                    break 'items;
                }

                let prev_item = items[prev.item];
                let info = &problem.lessons[prev_item.lesson];
                let (day, start) = prev.placed;
                state.remove(problem, info.class, day, start, prev_item.size);
                debug!(
                    lesson = info.id.as_str(),
                    block = prev_item.block,
                    backtracks,
                    "undoing placement"
                );

                if let Some((day, start)) =
                    self.next_candidate(&mut prev, &state, &evaluator, &items)
                {
                    self.place_frame(&mut state, &mut prev, &items, day, start);
                    let resume = prev.item;
                    stack.push(prev);
                    // Re-try everything after the re-placed block.
                    next_item = self.resume_point(&stack, resume);
                    continue 'items;
                }
            }
        }

        let placed_items: Vec<usize> = stack.iter().map(|f| f.item).collect();
        let unplaced: Vec<UnplacedBlock> = (0..items.len())
            .filter(|i| !placed_items.contains(i))
            .map(|i| UnplacedBlock {
                lesson_id: problem.lessons[items[i].lesson].id.clone(),
                block: items[i].block,
            })
            .collect();

        let report = evaluator.score(&state);
        let outcome = SearchOutcome {
            success: unplaced.is_empty() && !out_of_budget,
            placed_hours: state.placed_hours(),
            total_hours: problem.total_hours(),
            backtrack_count: backtracks,
            unplaced,
            violations: report.violations,
        };
        info!(
            placed = outcome.placed_hours,
            total = outcome.total_hours,
            backtracks = outcome.backtrack_count,
            success = outcome.success,
            "constructive search finished"
        );
        (state, outcome)
    }

    /// Blocks ordered by descending placement difficulty: larger blocks
    /// first, special-ruled patterns first, co-taught lessons first.
    fn ordered_items(&self) -> Vec<BlockItem> {
        let mut items: Vec<BlockItem> = Vec::new();
        for (lesson, info) in self.ctx.problem.lessons.iter().enumerate() {
            for (block, &size) in info.pattern.sizes.iter().enumerate() {
                items.push(BlockItem {
                    lesson,
                    block,
                    size,
                });
            }
        }
        items.sort_by(|a, b| {
            let la = &self.ctx.problem.lessons[a.lesson];
            let lb = &self.ctx.problem.lessons[b.lesson];
            b.size
                .cmp(&a.size)
                .then_with(|| lb.pattern.special.is_some().cmp(&la.pattern.special.is_some()))
                .then_with(|| lb.teachers.len().cmp(&la.teachers.len()))
        });
        items
    }

    fn open_frame<R: Rng>(&self, item: usize, items: &[BlockItem], rng: &mut R) -> Frame {
        let problem = &self.ctx.problem;
        let info = &problem.lessons[items[item].lesson];
        let mut days: Vec<usize> = (0..problem.grid.days)
            .filter(|&day| {
                !info
                    .teachers
                    .iter()
                    .any(|&t| problem.teachers[t].off_day == Some(day))
            })
            .collect();
        days.shuffle(rng);
        Frame {
            item,
            days,
            day_pos: 0,
            next_start: 0,
            placed: (0, 0),
        }
    }

    /// Advances the frame to the next feasible (day, start), if any.
    fn next_candidate(
        &self,
        frame: &mut Frame,
        state: &ScheduleState,
        evaluator: &Evaluator<'_>,
        items: &[BlockItem],
    ) -> Option<(usize, usize)> {
        let item = items[frame.item];
        let periods = self.ctx.problem.grid.periods;
        while frame.day_pos < frame.days.len() {
            let day = frame.days[frame.day_pos];
            while frame.next_start + item.size <= periods {
                let start = frame.next_start;
                frame.next_start += 1;
                if evaluator.check_placement(state, item.lesson, item.block, day, start) {
                    return Some((day, start));
                }
            }
            frame.day_pos += 1;
            frame.next_start = 0;
        }
        None
    }

    fn place_frame(
        &self,
        state: &mut ScheduleState,
        frame: &mut Frame,
        items: &[BlockItem],
        day: usize,
        start: usize,
    ) {
        let item = items[frame.item];
        state.place(&self.ctx.problem, item.lesson, item.block, day, start);
        frame.placed = (day, start);
    }

    /// First item index not currently placed, after re-placing `resume`.
    fn resume_point(&self, stack: &[Frame], resume: usize) -> usize {
        let placed: Vec<usize> = stack.iter().map(|f| f.item).collect();
        let mut next = resume + 1;
        while placed.contains(&next) {
            next += 1;
        }
        next
    }
}
