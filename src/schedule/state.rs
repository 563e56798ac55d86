//! The schedule/index pair.
//!
//! A [`ScheduleState`] couples the authoritative grid with its derived
//! [`ConflictIndex`] and routes every mutation through both in the same
//! call — a partially applied update is a bug, never an intermediate
//! state. Each search attempt and each genetic-population member owns
//! an independent pair, so no locking is needed across them.
//!
//! Placing on an occupied cell or removing from an empty one is a
//! caller contract violation: callers query before mutating.

use super::{ConflictIndex, Schedule, Slot};
use crate::problem::Problem;

/// A schedule plus its always-consistent conflict/load index.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// The authoritative assignment grid.
    pub schedule: Schedule,
    /// Derived occupancy and load counters.
    pub index: ConflictIndex,
}

impl ScheduleState {
    /// Creates an empty state sized for `problem`.
    pub fn empty(problem: &Problem) -> Self {
        Self {
            schedule: Schedule::empty(problem.grid, problem.class_count()),
            index: ConflictIndex::new(problem.grid, problem.teacher_count(), problem.class_count()),
        }
    }

    /// Places one block of a lesson at (day, start..start+size).
    ///
    /// The span must be free in the lesson's class row; callers run the
    /// hard-constraint check first.
    pub fn place(
        &mut self,
        problem: &Problem,
        lesson: usize,
        block: usize,
        day: usize,
        start: usize,
    ) {
        let info = &problem.lessons[lesson];
        let size = info.pattern.sizes[block];
        debug_assert!(start + size <= problem.grid.periods, "block beyond day end");
        for offset in 0..size {
            self.schedule.set_cell(
                info.class,
                day,
                start + offset,
                Slot {
                    lesson: lesson as u32,
                    block: block as u16,
                    offset: offset as u16,
                },
            );
            self.index.note_place(info, day, start + offset);
        }
    }

    /// Removes the occupied span (day, start..start+len) from a class row.
    ///
    /// Every cell in the span must be occupied.
    pub fn remove(&mut self, problem: &Problem, class: usize, day: usize, start: usize, len: usize) {
        for period in start..start + len {
            let slot = self.schedule.clear_cell(class, day, period);
            self.index
                .note_remove(&problem.lessons[slot.lesson as usize], day, period);
        }
    }

    /// Removes every cell of one (lesson, block), wherever it sits.
    ///
    /// Returns the removed cells with their stored offsets so a repair
    /// can restore them verbatim.
    pub fn remove_block(
        &mut self,
        problem: &Problem,
        lesson: usize,
        block: usize,
    ) -> Vec<(usize, usize, u16)> {
        let info = &problem.lessons[lesson];
        let cells = self
            .schedule
            .block_cells(info.class, lesson as u32, block as u16);
        let mut removed = Vec::with_capacity(cells.len());
        for (day, period) in cells {
            let slot = self.schedule.clear_cell(info.class, day, period);
            self.index.note_remove(info, day, period);
            removed.push((day, period, slot.offset));
        }
        removed
    }

    /// Writes one cell, updating the index. Used by crossover and repair.
    pub(crate) fn write_cell(
        &mut self,
        problem: &Problem,
        class: usize,
        day: usize,
        period: usize,
        slot: Slot,
    ) {
        self.schedule.set_cell(class, day, period, slot);
        self.index
            .note_place(&problem.lessons[slot.lesson as usize], day, period);
    }

    /// Clears one cell, updating the index. Used by crossover and repair.
    pub(crate) fn clear_cell(
        &mut self,
        problem: &Problem,
        class: usize,
        day: usize,
        period: usize,
    ) -> Slot {
        let slot = self.schedule.clear_cell(class, day, period);
        self.index
            .note_remove(&problem.lessons[slot.lesson as usize], day, period);
        slot
    }

    /// Whether the class has anything at (day, period).
    #[inline]
    pub fn is_class_busy(&self, class: usize, day: usize, period: usize) -> bool {
        !self.schedule.is_free(class, day, period)
    }

    /// Whether the teacher teaches anything at (day, period).
    #[inline]
    pub fn is_teacher_busy(&self, teacher: usize, day: usize, period: usize) -> bool {
        self.index.is_teacher_busy(teacher, day, period)
    }

    /// Total placed periods across all classes.
    #[inline]
    pub fn placed_hours(&self) -> usize {
        self.schedule.filled_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonRequirement, PatternCatalog, SchoolClass, Teacher};
    use crate::schedule::TimeGrid;

    fn sample_problem() -> Problem {
        let teachers = vec![Teacher::new("smith"), Teacher::new("jones")];
        let classes = vec![SchoolClass::new("7a"), SchoolClass::new("7b")];
        let requirements = vec![
            LessonRequirement::new("L1", "math", "7a")
                .with_teacher("smith")
                .with_weekly_hours(2)
                .with_pattern("2"),
            LessonRequirement::new("L2", "art", "7b")
                .with_teacher("smith")
                .with_teacher("jones")
                .with_weekly_hours(1),
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
    fn test_place_double_period() {
        let problem = sample_problem();
        let mut state = ScheduleState::empty(&problem);

        // [2]-pattern lesson at day 1, periods 3-4
        state.place(&problem, 0, 0, 1, 3);

        assert!(state.is_teacher_busy(0, 1, 3));
        assert!(state.is_teacher_busy(0, 1, 4));
        assert!(!state.is_teacher_busy(0, 1, 5));
        assert!(state.is_class_busy(0, 1, 3));
        assert_eq!(state.placed_hours(), 2);
        assert_eq!(state.index.teacher_daily_load(0, 1), 2);
    }

    #[test]
    fn test_remove_reverses_place() {
        let problem = sample_problem();
        let empty = ScheduleState::empty(&problem);
        let mut state = empty.clone();

        state.place(&problem, 0, 0, 1, 3);
        state.remove(&problem, 0, 1, 3, 2);

        assert_eq!(state.schedule, empty.schedule);
        assert_eq!(state.index, empty.index);
    }

    #[test]
    fn test_remove_block_returns_cells() {
        let problem = sample_problem();
        let mut state = ScheduleState::empty(&problem);

        state.place(&problem, 0, 0, 2, 5);
        let removed = state.remove_block(&problem, 0, 0);

        assert_eq!(removed, vec![(2, 5, 0), (2, 6, 1)]);
        assert_eq!(state.placed_hours(), 0);
    }

    #[test]
    fn test_index_never_drifts_from_rebuild() {
        let problem = sample_problem();
        let mut state = ScheduleState::empty(&problem);

        state.place(&problem, 0, 0, 1, 3);
        state.place(&problem, 1, 0, 1, 3); // co-taught, other class
        state.remove_block(&problem, 0, 0);
        state.place(&problem, 0, 0, 4, 0);

        let rebuilt = ConflictIndex::rebuild(
            &state.schedule,
            &problem.lessons,
            problem.teacher_count(),
        );
        assert_eq!(state.index, rebuilt);
    }

    #[test]
    fn test_independent_clones() {
        let problem = sample_problem();
        let mut a = ScheduleState::empty(&problem);
        a.place(&problem, 0, 0, 0, 0);
        let b = a.clone();

        a.remove_block(&problem, 0, 0);
        assert_eq!(a.placed_hours(), 0);
        assert_eq!(b.placed_hours(), 2);
    }
}
