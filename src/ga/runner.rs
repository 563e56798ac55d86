//! Genetic optimizer loop.
//!
//! Population-based improvement over complete schedules: tournament
//! selection with elitism, uniform crossover, block-aware mutation,
//! and an integrity-repair pass on every offspring. The mutation rate
//! adapts — it rises after a configured stretch of stagnation to
//! escape local optima and decays while the search is improving.
//!
//! Termination is always reported: target reached, stagnation,
//! generation budget, or wall-clock deadline.

use std::time::Instant;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{operators, Individual};
use crate::context::SchedulingContext;
use crate::integrity;
use crate::models::Violation;
use crate::schedule::ScheduleState;
use crate::scoring::Evaluator;

/// Genetic optimizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    /// Population size.
    pub population_size: usize,
    /// Generation budget.
    pub max_generations: u32,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Fraction of the population copied unchanged each generation.
    pub elite_fraction: f64,
    /// Probability that an offspring comes from crossover.
    pub crossover_rate: f64,
    /// Initial per-offspring mutation probability.
    pub mutation_rate: f64,
    /// Multiplicative decay applied while improving.
    pub mutation_decay: f64,
    /// Multiplicative boost applied after `adapt_after` stagnant
    /// generations.
    pub stagnation_boost: f64,
    /// Lower bound for the adaptive mutation rate.
    pub min_mutation_rate: f64,
    /// Upper bound for the adaptive mutation rate.
    pub max_mutation_rate: f64,
    /// Stagnant generations before the mutation rate is boosted.
    pub adapt_after: u32,
    /// Stagnant generations before the run stops.
    pub stagnation_limit: u32,
    /// Stop as soon as the best penalty reaches this value.
    pub target_penalty: Option<f64>,
    /// Optional wall-clock budget, in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Slot swaps applied to each seeded clone.
    pub seed_shuffles: usize,
    /// Evaluate fitness on a worker pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            max_generations: 200,
            tournament_size: 3,
            elite_fraction: 0.1,
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            mutation_decay: 0.995,
            stagnation_boost: 1.5,
            min_mutation_rate: 0.05,
            max_mutation_rate: 0.6,
            adapt_after: 10,
            stagnation_limit: 30,
            target_penalty: None,
            time_limit_ms: None,
            seed_shuffles: 3,
            parallel: false,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: u32) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the target penalty.
    pub fn with_target_penalty(mut self, target: f64) -> Self {
        self.target_penalty = Some(target);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Enables parallel fitness evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Which budget ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Best penalty reached the configured target.
    TargetReached,
    /// No improvement for `stagnation_limit` generations.
    Stagnated,
    /// Generation budget exhausted.
    GenerationBudget,
    /// Wall-clock deadline hit.
    TimeLimit,
}

/// Result of a genetic run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best schedule found.
    pub best: ScheduleState,
    /// Its penalty.
    pub best_penalty: f64,
    /// Generations executed.
    pub generations: u32,
    /// Which budget ended the run.
    pub reason: TerminationReason,
    /// Full diagnostics for the best schedule.
    pub violations: Vec<Violation>,
}

/// Population-based schedule optimizer.
pub struct GeneticOptimizer<'a> {
    ctx: &'a SchedulingContext,
    config: GaConfig,
}

impl<'a> GeneticOptimizer<'a> {
    /// Creates an optimizer with default configuration.
    pub fn new(ctx: &'a SchedulingContext) -> Self {
        Self {
            ctx,
            config: GaConfig::default(),
        }
    }

    /// Creates an optimizer with the given configuration.
    pub fn with_config(ctx: &'a SchedulingContext, config: GaConfig) -> Self {
        Self { ctx, config }
    }

    /// Runs the optimizer from a seed schedule (typically the
    /// constructive result).
    pub fn run<R: Rng>(&self, seed: &ScheduleState, rng: &mut R) -> GaResult {
        let config = &self.config;
        let evaluator = self.ctx.evaluator();
        let started = Instant::now();

        let mut population = self.seed_population(seed, rng);
        self.evaluate(&mut population, &evaluator);
        population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let mut best = population[0].clone();
        let mut mutation_rate = config.mutation_rate;
        let mut stagnation = 0u32;
        let mut generation = 0u32;
        info!(
            population = population.len(),
            seed_penalty = best.fitness,
            "genetic optimization started"
        );

        let reason = loop {
            if config
                .target_penalty
                .is_some_and(|target| best.fitness <= target)
            {
                break TerminationReason::TargetReached;
            }
            if stagnation >= config.stagnation_limit {
                break TerminationReason::Stagnated;
            }
            if generation >= config.max_generations {
                break TerminationReason::GenerationBudget;
            }
            if config
                .time_limit_ms
                .is_some_and(|ms| started.elapsed().as_millis() as u64 >= ms)
            {
                break TerminationReason::TimeLimit;
            }
            generation += 1;

            let elite_count = ((population.len() as f64 * config.elite_fraction) as usize).max(1);
            let mut next: Vec<Individual> = population[..elite_count].to_vec();

            while next.len() < config.population_size {
                let p1 = self.tournament(&population, rng);
                let p2 = self.tournament(&population, rng);
                let mut child = if rng.random_bool(config.crossover_rate) {
                    operators::uniform_crossover(
                        &population[p1].state,
                        &population[p2].state,
                        &self.ctx.problem,
                        rng,
                    )
                } else {
                    population[p1].state.clone()
                };
                if rng.random_bool(mutation_rate) {
                    operators::mutate(&mut child, self.ctx, rng);
                }
                integrity::repair_all(&mut child, self.ctx);
                next.push(Individual::new(child));
            }

            self.evaluate(&mut next, &evaluator);
            next.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
            population = next;

            if population[0].fitness < best.fitness {
                best = population[0].clone();
                stagnation = 0;
                mutation_rate = (mutation_rate * config.mutation_decay).max(config.min_mutation_rate);
            } else {
                stagnation += 1;
                if stagnation >= config.adapt_after {
                    mutation_rate =
                        (mutation_rate * config.stagnation_boost).min(config.max_mutation_rate);
                }
            }
            debug!(
                generation,
                best = best.fitness,
                mutation_rate,
                stagnation,
                "generation complete"
            );
        };

        let report = evaluator.score(&best.state);
        info!(
            generations = generation,
            best = best.fitness,
            ?reason,
            "genetic optimization finished"
        );
        GaResult {
            best: best.state,
            best_penalty: best.fitness,
            generations: generation,
            reason,
            violations: report.violations,
        }
    }

    /// Seed clone plus shuffled variants, each repaired.
    fn seed_population<R: Rng>(&self, seed: &ScheduleState, rng: &mut R) -> Vec<Individual> {
        let mut population = Vec::with_capacity(self.config.population_size);
        population.push(Individual::new(seed.clone()));
        while population.len() < self.config.population_size {
            let mut state = seed.clone();
            operators::shuffle_variant(
                &mut state,
                &self.ctx.problem,
                self.config.seed_shuffles,
                rng,
            );
            integrity::repair_all(&mut state, self.ctx);
            population.push(Individual::new(state));
        }
        population
    }

    /// Evaluates all members without a cached fitness. Parallel
    /// evaluation joins before selection continues.
    fn evaluate(&self, population: &mut [Individual], evaluator: &Evaluator<'_>) {
        if self.config.parallel {
            population.par_iter_mut().for_each(|member| {
                if member.fitness.is_infinite() {
                    member.evaluate(evaluator);
                }
            });
        } else {
            for member in population.iter_mut() {
                if member.fitness.is_infinite() {
                    member.evaluate(evaluator);
                }
            }
        }
    }

    /// Index of the fittest among `tournament_size` random members.
    fn tournament<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
        let mut winner = rng.random_range(0..population.len());
        for _ in 1..self.config.tournament_size {
            let challenger = rng.random_range(0..population.len());
            if population[challenger].fitness < population[winner].fitness {
                winner = challenger;
            }
        }
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::models::{LessonRequirement, PatternCatalog, SchoolClass, Teacher};
    use crate::problem::Problem;
    use crate::schedule::TimeGrid;
    use crate::search::ConstructiveSearch;

    fn sample_ctx() -> SchedulingContext {
        let problem = Problem::compile(
            TimeGrid::new(5, 8),
            &[Teacher::new("smith"), Teacher::new("jones")],
            &[SchoolClass::new("7a"), SchoolClass::new("7b")],
            &[
                LessonRequirement::new("L1", "math", "7a")
                    .with_teacher("smith")
                    .with_weekly_hours(4)
                    .with_pattern("2+2"),
                LessonRequirement::new("L2", "physics", "7a")
                    .with_teacher("jones")
                    .with_weekly_hours(2)
                    .with_pattern("2"),
                LessonRequirement::new("L3", "math", "7b")
                    .with_teacher("smith")
                    .with_weekly_hours(2)
                    .with_pattern("1+1"),
                LessonRequirement::new("L4", "art", "7b")
                    .with_teacher("jones")
                    .with_weekly_hours(1),
            ],
            &PatternCatalog::standard(),
        )
        .unwrap();
        SchedulingContext::new(problem)
    }

    fn conflict_free_seed(ctx: &SchedulingContext) -> ScheduleState {
        let mut rng = SmallRng::seed_from_u64(42);
        let (state, outcome) = ConstructiveSearch::new(ctx).build(&mut rng);
        assert!(outcome.success);
        state
    }

    #[test]
    fn test_stagnation_termination_and_no_regression() {
        let ctx = sample_ctx();
        let seed = conflict_free_seed(&ctx);
        let seed_penalty = ctx.evaluator().penalty(&seed);

        let config = GaConfig::default()
            .with_population_size(12)
            .with_max_generations(500)
            .with_stagnation_limit(8);
        let optimizer = GeneticOptimizer::with_config(&ctx, config);
        let mut rng = SmallRng::seed_from_u64(7);
        let result = optimizer.run(&seed, &mut rng);

        assert_eq!(result.reason, TerminationReason::Stagnated);
        // The best penalty never regresses below the seed population's best
        assert!(result.best_penalty <= seed_penalty);
        assert!(result.generations < 500);
    }

    #[test]
    fn test_target_reached_immediately() {
        let ctx = sample_ctx();
        let seed = conflict_free_seed(&ctx);

        let config = GaConfig::default()
            .with_population_size(8)
            .with_target_penalty(f64::MAX);
        let optimizer = GeneticOptimizer::with_config(&ctx, config);
        let mut rng = SmallRng::seed_from_u64(7);
        let result = optimizer.run(&seed, &mut rng);

        assert_eq!(result.reason, TerminationReason::TargetReached);
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_generation_budget() {
        let ctx = sample_ctx();
        let seed = conflict_free_seed(&ctx);

        let config = GaConfig::default()
            .with_population_size(8)
            .with_max_generations(3)
            .with_stagnation_limit(u32::MAX);
        let optimizer = GeneticOptimizer::with_config(&ctx, config);
        let mut rng = SmallRng::seed_from_u64(7);
        let result = optimizer.run(&seed, &mut rng);

        assert_eq!(result.reason, TerminationReason::GenerationBudget);
        assert_eq!(result.generations, 3);
    }

    #[test]
    fn test_best_schedule_stays_whole() {
        let ctx = sample_ctx();
        let seed = conflict_free_seed(&ctx);

        let config = GaConfig::default()
            .with_population_size(10)
            .with_max_generations(20)
            .with_stagnation_limit(u32::MAX);
        let optimizer = GeneticOptimizer::with_config(&ctx, config);
        let mut rng = SmallRng::seed_from_u64(3);
        let result = optimizer.run(&seed, &mut rng);

        // All hours still placed in the best individual
        assert_eq!(result.best.placed_hours(), ctx.problem.total_hours());
    }

    #[test]
    fn test_parallel_evaluation_matches_serial() {
        let ctx = sample_ctx();
        let seed = conflict_free_seed(&ctx);

        let serial = GeneticOptimizer::with_config(
            &ctx,
            GaConfig::default()
                .with_population_size(8)
                .with_max_generations(5)
                .with_stagnation_limit(u32::MAX),
        );
        let parallel = GeneticOptimizer::with_config(
            &ctx,
            GaConfig::default()
                .with_population_size(8)
                .with_max_generations(5)
                .with_stagnation_limit(u32::MAX)
                .with_parallel(true),
        );

        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        let result_a = serial.run(&seed, &mut rng_a);
        let result_b = parallel.run(&seed, &mut rng_b);

        // Offspring generation is serial either way; parallelism only
        // affects where fitness is computed.
        assert_eq!(result_a.best_penalty, result_b.best_penalty);
    }
}
