//! Reactor activity advertisements
//!
//! Each server runs one reactor per table; the reactor advertises what it is
//! currently doing for every slot sub-range it knows about. The control
//! plane reads these advertisements through the cluster directory as the
//! server's "business card" for the table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keyspace::KeyRange;

/// One server's current role over a slot sub-range of a table.
///
/// The set of variants is closed; the reactor state machine cannot produce
/// anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactorActivity {
    /// Will become primary once it is safe to do so
    PrimaryWhenSafe,
    /// Serving as primary
    Primary,
    /// Secondary tracking the primary
    SecondaryUpToDate,
    /// Secondary that has lost its primary
    SecondaryWithoutPrimary,
    /// Secondary copying data from the primary
    SecondaryBackfilling,
    /// Will drop the range once it is safe to do so
    NothingWhenSafe,
    /// Still erasing data for the range
    NothingWhenDoneErasing,
    /// Not involved with the range
    Nothing,
}

impl fmt::Display for ReactorActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactorActivity::PrimaryWhenSafe => write!(f, "primary_when_safe"),
            ReactorActivity::Primary => write!(f, "primary"),
            ReactorActivity::SecondaryUpToDate => write!(f, "secondary_up_to_date"),
            ReactorActivity::SecondaryWithoutPrimary => {
                write!(f, "secondary_without_primary")
            }
            ReactorActivity::SecondaryBackfilling => write!(f, "secondary_backfilling"),
            ReactorActivity::NothingWhenSafe => write!(f, "nothing_when_safe"),
            ReactorActivity::NothingWhenDoneErasing => {
                write!(f, "nothing_when_done_erasing")
            }
            ReactorActivity::Nothing => write!(f, "nothing"),
        }
    }
}

/// An activity together with the slot range it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub region: KeyRange,
    pub activity: ReactorActivity,
}

impl ActivityEntry {
    pub fn new(region: KeyRange, activity: ReactorActivity) -> Self {
        Self { region, activity }
    }
}

/// Advertised per-table state of one server's reactor.
///
/// Entries of a single card never overlap in slot space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactorBusinessCard {
    pub activities: Vec<ActivityEntry>,
}

impl ReactorBusinessCard {
    pub fn new(activities: Vec<ActivityEntry>) -> Self {
        Self { activities }
    }

    /// Card with a single activity covering `region`.
    pub fn single(region: KeyRange, activity: ReactorActivity) -> Self {
        Self {
            activities: vec![ActivityEntry::new(region, activity)],
        }
    }
}
