//! Backfill cost estimation
//!
//! Estimates how much trouble it would be to bring one server up to date
//! for one shard's slot range, from the activities the server currently
//! advertises for the table. Takes O(activities) time per shard.

use tp_core::{KeyRange, ReactorActivity, ReactorBusinessCard};

/// Cost assigned to a range the server knows nothing about.
pub(crate) const MAX_BACKFILL_COST: f64 = 3.0;

/// How per-piece costs are averaged into one estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostWeighting {
    /// Plain mean over the pieces of the cost map
    #[default]
    Uniform,
    /// Mean weighted by each piece's width in slots
    SlotWidth,
}

/// Piecewise-constant cost over a slot range.
///
/// Pieces are kept sorted and contiguous; together they always cover
/// exactly the range the map was created with.
struct RegionMap {
    pieces: Vec<(KeyRange, f64)>,
}

impl RegionMap {
    fn new(range: KeyRange, initial: f64) -> Self {
        Self {
            pieces: vec![(range, initial)],
        }
    }

    /// Overwrite the cost of `range`, splitting any piece it cuts through.
    fn set(&mut self, range: KeyRange, value: f64) {
        let mut next = Vec::with_capacity(self.pieces.len() + 2);
        for (piece, cost) in self.pieces.drain(..) {
            match piece.intersect(&range) {
                None => next.push((piece, cost)),
                Some(overlap) => {
                    if piece.start < overlap.start {
                        next.push((KeyRange::new(piece.start, overlap.start), cost));
                    }
                    next.push((overlap, value));
                    if overlap.end < piece.end {
                        next.push((KeyRange::new(overlap.end, piece.end), cost));
                    }
                }
            }
        }
        self.pieces = next;
    }

    fn mean(&self, weighting: CostWeighting) -> f64 {
        match weighting {
            CostWeighting::Uniform => {
                let sum: f64 = self.pieces.iter().map(|(_, cost)| cost).sum();
                sum / self.pieces.len() as f64
            }
            CostWeighting::SlotWidth => {
                let mut sum = 0.0;
                let mut slots = 0u64;
                for (piece, cost) in &self.pieces {
                    sum += cost * piece.slot_count() as f64;
                    slots += piece.slot_count() as u64;
                }
                sum / slots as f64
            }
        }
    }
}

fn activity_cost(activity: ReactorActivity) -> f64 {
    match activity {
        ReactorActivity::PrimaryWhenSafe | ReactorActivity::Primary => 0.0,
        ReactorActivity::SecondaryUpToDate => 1.0,
        ReactorActivity::SecondaryWithoutPrimary | ReactorActivity::SecondaryBackfilling => 2.0,
        ReactorActivity::NothingWhenSafe
        | ReactorActivity::NothingWhenDoneErasing
        | ReactorActivity::Nothing => 3.0,
    }
}

/// Expected effort, in `[0, 3]`, to get the server up to date for
/// `shard_range`. Lower is better; 0 means it already has the data.
pub(crate) fn estimate_backfill_cost(
    card: &ReactorBusinessCard,
    shard_range: KeyRange,
    weighting: CostWeighting,
) -> f64 {
    let mut costs = RegionMap::new(shard_range, MAX_BACKFILL_COST);
    for entry in &card.activities {
        if let Some(overlap) = entry.region.intersect(&shard_range) {
            // Activities never overlap, so a plain overwrite is enough; no
            // minimum needs to be taken.
            costs.set(overlap, activity_cost(entry.activity));
        }
    }
    costs.mean(weighting)
}
