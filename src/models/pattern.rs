//! Block pattern model and catalog.
//!
//! A lesson's weekly hours are split into one or more contiguous
//! "blocks" (e.g. 6 hours as three double periods). The pattern
//! carries the placement rules the blocks must satisfy: internal
//! contiguity, same-day vs. distributed placement, and minimum
//! day separation.
//!
//! # Textual Notation
//! Digits joined by `+` or `-`: `"2+2+2"`, `"2-1"`. The parser accepts
//! either separator, discards non-positive and non-numeric tokens, and
//! defaults to a single period `[1]` on empty or fully invalid input.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling"

use serde::{Deserialize, Serialize};

/// Named special placement rule attached to a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialRule {
    /// Distributed blocks must keep at least one free day between them.
    WideGap,
}

/// The ordered block-size split of a lesson's weekly hours, plus
/// the placement rules the blocks must satisfy.
///
/// Invariant: `total_hours()` equals the sum of `sizes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPattern {
    /// Catalog name (`"generic"` for unmatched shapes).
    pub name: String,
    /// Ordered block sizes in periods.
    pub sizes: Vec<usize>,
    /// Each block occupies contiguous periods on one day.
    pub must_be_consecutive: bool,
    /// All blocks share a single day (only meaningful for one block).
    pub must_be_same_day: bool,
    /// Minimum number of free days between any two blocks.
    pub min_day_gap: usize,
    /// Optional named special rule.
    pub special: Option<SpecialRule>,
}

/// Placement rules for one block of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementRule {
    /// Block length in periods.
    pub size: usize,
    /// The block's periods must form a contiguous run on one day.
    pub must_be_consecutive: bool,
    /// The block must not share a day with another block of the lesson.
    pub must_differ_day: bool,
    /// Minimum free days between this block and any other block.
    pub min_day_gap: usize,
}

impl BlockPattern {
    /// Total weekly hours covered by this pattern.
    pub fn total_hours(&self) -> usize {
        self.sizes.iter().sum()
    }

    /// Number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the blocks are spread over multiple days.
    #[inline]
    pub fn is_distributed(&self) -> bool {
        self.sizes.len() > 1 && !self.must_be_same_day
    }

    /// Placement rules for the block at `block_index`.
    ///
    /// # Panics
    /// Panics if `block_index` is out of range (caller bug).
    pub fn placement_rule(&self, block_index: usize) -> PlacementRule {
        PlacementRule {
            size: self.sizes[block_index],
            must_be_consecutive: self.must_be_consecutive,
            must_differ_day: self.is_distributed(),
            min_day_gap: self.min_day_gap,
        }
    }

    /// Formats the sizes in textual notation (`"2+2+2"`).
    pub fn format(&self) -> String {
        self.sizes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Parses block sizes from textual notation.
///
/// Accepts `+` or `-` as separator, skips non-positive and non-numeric
/// tokens, and falls back to `[1]` when nothing valid remains.
pub fn parse_pattern(text: &str) -> Vec<usize> {
    let sizes: Vec<usize> = text
        .split(['+', '-'])
        .filter_map(|token| token.trim().parse::<i64>().ok())
        .filter(|&n| n > 0)
        .map(|n| n as usize)
        .collect();

    if sizes.is_empty() {
        vec![1]
    } else {
        sizes
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: &'static str,
    sizes: &'static [usize],
    must_be_same_day: bool,
    min_day_gap: usize,
    special: Option<SpecialRule>,
}

/// Fixed table of named block patterns.
///
/// Unmatched size sequences fall back to a generic pattern whose rules
/// are derived from shape: one block is placed consecutively on a single
/// day; multiple blocks are distributed over distinct days.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
}

impl PatternCatalog {
    /// Creates the standard catalog.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                CatalogEntry {
                    name: "single",
                    sizes: &[1],
                    must_be_same_day: true,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "double",
                    sizes: &[2],
                    must_be_same_day: true,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "triple",
                    sizes: &[3],
                    must_be_same_day: true,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "two-singles",
                    sizes: &[1, 1],
                    must_be_same_day: false,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "double-single",
                    sizes: &[2, 1],
                    must_be_same_day: false,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "two-doubles",
                    sizes: &[2, 2],
                    must_be_same_day: false,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "three-singles",
                    sizes: &[1, 1, 1],
                    must_be_same_day: false,
                    min_day_gap: 0,
                    special: None,
                },
                CatalogEntry {
                    name: "three-doubles",
                    sizes: &[2, 2, 2],
                    must_be_same_day: false,
                    min_day_gap: 1,
                    special: Some(SpecialRule::WideGap),
                },
            ],
        }
    }

    /// Classifies a size sequence against the catalog.
    pub fn classify(&self, sizes: &[usize]) -> BlockPattern {
        for entry in &self.entries {
            if entry.sizes == sizes {
                return BlockPattern {
                    name: entry.name.to_string(),
                    sizes: sizes.to_vec(),
                    must_be_consecutive: true,
                    must_be_same_day: entry.must_be_same_day,
                    min_day_gap: entry.min_day_gap,
                    special: entry.special,
                };
            }
        }
        Self::generic(sizes)
    }

    /// Classifies a pattern given in textual notation.
    pub fn classify_text(&self, text: &str) -> BlockPattern {
        self.classify(&parse_pattern(text))
    }

    /// Infers a conventional split for a requirement without an explicit
    /// pattern: doubles first, a trailing single for odd hours.
    pub fn infer(&self, weekly_hours: usize) -> BlockPattern {
        let mut sizes = Vec::new();
        let mut remaining = weekly_hours.max(1);
        // 1 and 2 stay a single block; larger hours split into doubles.
        if remaining <= 2 {
            sizes.push(remaining);
        } else {
            while remaining >= 2 {
                sizes.push(2);
                remaining -= 2;
            }
            if remaining == 1 {
                sizes.push(1);
            }
        }
        self.classify(&sizes)
    }

    fn generic(sizes: &[usize]) -> BlockPattern {
        let single = sizes.len() == 1;
        BlockPattern {
            name: "generic".to_string(),
            sizes: sizes.to_vec(),
            must_be_consecutive: true,
            must_be_same_day: single,
            min_day_gap: 0,
            special: None,
        }
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
