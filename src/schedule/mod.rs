//! Schedule state and its conflict/load index.
//!
//! The grid ([`Schedule`]) is the single authority over placements;
//! the [`ConflictIndex`] is a derived view kept transactionally in
//! sync by [`ScheduleState`]. All O(1) busy/load queries go through
//! the index; the grid answers class occupancy directly.

mod grid;
mod index;
mod state;

pub use grid::{PlacedBlock, Schedule, Slot, TimeGrid};
pub use index::ConflictIndex;
pub use state::ScheduleState;
