//! Placement strategies: picking the free block that services a request.
//!
//! Eligibility is the same for every strategy: a free block is a candidate
//! iff the rounded request fits (`size <= block.size`, equality allowed, in
//! which case the allocation consumes the block whole). The strategies only
//! differ in which candidate wins, and every tie-break is deterministic:
//! when two candidates compare equal, the one at the lower offset (first
//! encountered) is chosen.

use std::fmt;

use crate::engine::table::BlockTable;

/// The rule for choosing which free block services a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// First candidate in ascending offset order.
    FirstFit,
    /// First candidate at or after the resume cursor, wrapping to the start
    /// of the table once.
    NextFit,
    /// Candidate leaving the smallest remainder; lowest offset on ties.
    BestFit,
    /// Candidate leaving the largest remainder; lowest offset on ties.
    WorstFit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstFit => write!(f, "first-fit"),
            Self::NextFit => write!(f, "next-fit"),
            Self::BestFit => write!(f, "best-fit"),
            Self::WorstFit => write!(f, "worst-fit"),
        }
    }
}

impl Strategy {
    /// Selects the index of the free block to carve `size` bytes from, or
    /// `None` when no candidate exists (exhaustion).
    ///
    /// `cursor` is the next-fit resume offset; the other strategies ignore
    /// it. `size` is already rounded by the engine.
    pub(crate) fn select(self, table: &BlockTable, size: usize, cursor: usize) -> Option<usize> {
        match self {
            Self::FirstFit => table.find(|b| b.is_free() && size <= b.size),
            Self::NextFit => next_fit(table, size, cursor),
            Self::BestFit => scan_by_remainder(table, size, |leftover, incumbent| {
                leftover < incumbent
            }),
            Self::WorstFit => scan_by_remainder(table, size, |leftover, incumbent| {
                leftover > incumbent
            }),
        }
    }
}

/// First candidate from the resume point, wrapping once around the table.
fn next_fit(table: &BlockTable, size: usize, cursor: usize) -> Option<usize> {
    let blocks = table.blocks();
    let start = blocks
        .iter()
        .position(|b| b.offset >= cursor)
        .unwrap_or(0);

    let n = blocks.len();
    for step in 0..n {
        let i = (start + step) % n;
        if blocks[i].is_free() && size <= blocks[i].size {
            return Some(i);
        }
    }
    None
}

/// Full scan keeping the candidate whose remainder wins under `better`.
///
/// The incumbent is seeded only by actual candidates and replaced only on a
/// strict win, so the first-encountered candidate takes any tie and a
/// non-candidate first block cannot bias the outcome.
fn scan_by_remainder<F>(table: &BlockTable, size: usize, better: F) -> Option<usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut winner: Option<(usize, usize)> = None;

    for (i, b) in table.blocks().iter().enumerate() {
        if !b.is_free() || b.size < size {
            continue;
        }
        let leftover = b.size - size;
        let take = match winner {
            None => true,
            Some((_, incumbent)) => better(leftover, incumbent),
        };
        if take {
            winner = Some((i, leftover));
        }
    }

    winner.map(|(i, _)| i)
}
