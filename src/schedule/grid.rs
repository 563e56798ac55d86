//! The weekly assignment grid.
//!
//! A [`Schedule`] maps every (class, day, period) slot to at most one
//! placed lesson-block slot. It is stored as a flat array so that
//! cloning a population member is a single buffer copy.
//!
//! The grid is authoritative: the [`ConflictIndex`](super::ConflictIndex)
//! is always derived from it. Mutation goes through
//! [`ScheduleState`](super::ScheduleState), which keeps both in sync.

use serde::{Deserialize, Serialize};

/// The fixed weekly grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Teaching days per week.
    pub days: usize,
    /// Periods per day.
    pub periods: usize,
}

impl TimeGrid {
    /// Creates a grid with the given dimensions.
    pub fn new(days: usize, periods: usize) -> Self {
        Self { days, periods }
    }

    /// Total slots per week for one class or teacher.
    #[inline]
    pub fn slots_per_week(&self) -> usize {
        self.days * self.periods
    }

    /// Flat index of (day, period) within one week row.
    #[inline]
    pub fn slot_index(&self, day: usize, period: usize) -> usize {
        day * self.periods + period
    }
}

/// One occupied grid cell: which lesson, which block of its pattern,
/// and the cell's position within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Lesson index into the compiled problem.
    pub lesson: u32,
    /// Block index within the lesson's pattern.
    pub block: u16,
    /// Zero-based position of this cell within the block.
    pub offset: u16,
}

/// A placed block reconstructed from the grid, for diagnostics and repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Lesson index.
    pub lesson: u32,
    /// Block index within the lesson's pattern.
    pub block: u16,
    /// Class row the block occupies.
    pub class: usize,
    /// The (day, period) cells the block occupies, in grid order.
    pub cells: Vec<(usize, usize)>,
}

impl PlacedBlock {
    /// Number of occupied cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Day of the first cell.
    pub fn day(&self) -> Option<usize> {
        self.cells.first().map(|&(day, _)| day)
    }

    /// Whether all cells sit on one day in one contiguous run.
    pub fn is_contiguous(&self) -> bool {
        self.cells.windows(2).all(|w| {
            let (d0, p0) = w[0];
            let (d1, p1) = w[1];
            d0 == d1 && p1 == p0 + 1
        })
    }
}

/// The full weekly assignment: (class, day, period) → occupied cell.
///
/// Owns all placements. Mutated only through
/// [`ScheduleState`](super::ScheduleState) so that the conflict index
/// never drifts from the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    grid: TimeGrid,
    class_count: usize,
    slots: Vec<Option<Slot>>,
}

impl Schedule {
    /// Creates an empty schedule for `class_count` classes.
    pub fn empty(grid: TimeGrid, class_count: usize) -> Self {
        Self {
            grid,
            class_count,
            slots: vec![None; class_count * grid.slots_per_week()],
        }
    }

    /// Grid dimensions.
    #[inline]
    pub fn grid(&self) -> TimeGrid {
        self.grid
    }

    /// Number of class rows.
    #[inline]
    pub fn class_count(&self) -> usize {
        self.class_count
    }

    #[inline]
    fn index(&self, class: usize, day: usize, period: usize) -> usize {
        class * self.grid.slots_per_week() + self.grid.slot_index(day, period)
    }

    /// The cell at (class, day, period).
    #[inline]
    pub fn cell(&self, class: usize, day: usize, period: usize) -> Option<Slot> {
        self.slots[self.index(class, day, period)]
    }

    /// Whether the cell at (class, day, period) is empty.
    #[inline]
    pub fn is_free(&self, class: usize, day: usize, period: usize) -> bool {
        self.cell(class, day, period).is_none()
    }

    /// One class's week as a flat slice (indexed by `TimeGrid::slot_index`).
    #[inline]
    pub fn class_row(&self, class: usize) -> &[Option<Slot>] {
        let per_week = self.grid.slots_per_week();
        &self.slots[class * per_week..(class + 1) * per_week]
    }

    pub(crate) fn set_cell(&mut self, class: usize, day: usize, period: usize, slot: Slot) {
        let idx = self.index(class, day, period);
        debug_assert!(self.slots[idx].is_none(), "place on occupied cell");
        self.slots[idx] = Some(slot);
    }

    pub(crate) fn clear_cell(&mut self, class: usize, day: usize, period: usize) -> Slot {
        let idx = self.index(class, day, period);
        self.slots[idx].take().expect("remove from empty cell")
    }

    /// Iterates all occupied cells as (class, day, period, slot).
    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, usize, usize, Slot)> + '_ {
        let per_week = self.grid.slots_per_week();
        let periods = self.grid.periods;
        self.slots.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|slot| {
                let class = i / per_week;
                let within = i % per_week;
                (class, within / periods, within % periods, slot)
            })
        })
    }

    /// Total occupied cells (placed periods across all classes).
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Collects the cells of one (lesson, block), in grid order.
    ///
    /// Scans only the lesson's class row.
    pub fn block_cells(&self, class: usize, lesson: u32, block: u16) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for day in 0..self.grid.days {
            for period in 0..self.grid.periods {
                if let Some(slot) = self.cell(class, day, period) {
                    if slot.lesson == lesson && slot.block == block {
                        cells.push((day, period));
                    }
                }
            }
        }
        cells
    }

    /// Distinct (block, first-day) pairs for a lesson, in block order.
    pub fn block_days(&self, class: usize, lesson: u32) -> Vec<(u16, usize)> {
        let mut days: Vec<(u16, usize)> = Vec::new();
        for day in 0..self.grid.days {
            for period in 0..self.grid.periods {
                if let Some(slot) = self.cell(class, day, period) {
                    if slot.lesson == lesson && !days.iter().any(|&(b, _)| b == slot.block) {
                        days.push((slot.block, day));
                    }
                }
            }
        }
        days.sort_by_key(|&(b, _)| b);
        days
    }

    /// Reconstructs every placed block, grouped from the grid.
    pub fn placed_blocks(&self) -> Vec<PlacedBlock> {
        let mut blocks: Vec<PlacedBlock> = Vec::new();
        for (class, day, period, slot) in self.iter_filled() {
            match blocks
                .iter_mut()
                .find(|b| b.lesson == slot.lesson && b.block == slot.block)
            {
                Some(b) => b.cells.push((day, period)),
                None => blocks.push(PlacedBlock {
                    lesson: slot.lesson,
                    block: slot.block,
                    class,
                    cells: vec![(day, period)],
                }),
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(lesson: u32, block: u16, offset: u16) -> Slot {
        Slot {
            lesson,
            block,
            offset,
        }
    }

    #[test]
    fn test_empty_grid() {
        let s = Schedule::empty(TimeGrid::new(5, 8), 3);
        assert_eq!(s.filled_count(), 0);
        assert!(s.is_free(0, 0, 0));
        assert!(s.is_free(2, 4, 7));
        assert_eq!(s.class_row(1).len(), 40);
    }

    #[test]
    fn test_set_and_clear_cell() {
        let mut s = Schedule::empty(TimeGrid::new(5, 8), 2);
        s.set_cell(1, 2, 3, slot(7, 0, 0));

        assert!(!s.is_free(1, 2, 3));
        assert_eq!(s.cell(1, 2, 3), Some(slot(7, 0, 0)));
        assert!(s.is_free(0, 2, 3)); // other class untouched

        let removed = s.clear_cell(1, 2, 3);
        assert_eq!(removed.lesson, 7);
        assert!(s.is_free(1, 2, 3));
    }

    #[test]
    fn test_iter_filled() {
        let mut s = Schedule::empty(TimeGrid::new(5, 4), 2);
        s.set_cell(0, 1, 2, slot(0, 0, 0));
        s.set_cell(1, 3, 0, slot(1, 1, 0));

        let filled: Vec<_> = s.iter_filled().collect();
        assert_eq!(filled.len(), 2);
        assert!(filled.contains(&(0, 1, 2, slot(0, 0, 0))));
        assert!(filled.contains(&(1, 3, 0, slot(1, 1, 0))));
    }

    #[test]
    fn test_block_cells_and_days() {
        let mut s = Schedule::empty(TimeGrid::new(5, 8), 1);
        s.set_cell(0, 2, 3, slot(4, 0, 0));
        s.set_cell(0, 2, 4, slot(4, 0, 1));
        s.set_cell(0, 4, 1, slot(4, 1, 0));

        assert_eq!(s.block_cells(0, 4, 0), vec![(2, 3), (2, 4)]);
        assert_eq!(s.block_cells(0, 4, 1), vec![(4, 1)]);
        assert_eq!(s.block_days(0, 4), vec![(0, 2), (1, 4)]);
    }

    #[test]
    fn test_placed_blocks_contiguity() {
        let mut s = Schedule::empty(TimeGrid::new(5, 8), 1);
        s.set_cell(0, 1, 2, slot(0, 0, 0));
        s.set_cell(0, 1, 3, slot(0, 0, 1));
        s.set_cell(0, 1, 5, slot(1, 0, 0)); // hole at period 4

        let blocks = s.placed_blocks();
        assert_eq!(blocks.len(), 2);
        let b0 = blocks.iter().find(|b| b.lesson == 0).unwrap();
        assert!(b0.is_contiguous());
        assert_eq!(b0.size(), 2);
        assert_eq!(b0.day(), Some(1));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = Schedule::empty(TimeGrid::new(5, 8), 1);
        a.set_cell(0, 0, 0, slot(0, 0, 0));
        let b = a.clone();
        a.clear_cell(0, 0, 0);
        assert!(a.is_free(0, 0, 0));
        assert!(!b.is_free(0, 0, 0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "place on occupied cell")]
    fn test_double_place_is_contract_violation() {
        let mut s = Schedule::empty(TimeGrid::new(5, 8), 1);
        s.set_cell(0, 0, 0, slot(0, 0, 0));
        s.set_cell(0, 0, 0, slot(1, 0, 0));
    }
}
