//! Pilot - control plane for sharded, replicated tables
//!
//! Responsible for turning requested replication settings into concrete
//! table configurations.
//!
//! # Features
//! - Point-in-time snapshots of tag membership and reactor state
//! - Backfill-aware, load-balancing replica placement
//! - Cooperative yielding and cancellation for long plans
//!
//! # Usage example
//! ```ignore
//! use pilot::Planner;
//!
//! let planner = Planner::default();
//! let config = planner
//!     .generate_config(&name_client, Some(table_id), &directory, &usage,
//!                      &params, &scheme, &interruptor)
//!     .await?;
//! ```

pub mod directory;
pub mod planner;

pub use planner::{
    tally_server_usage, CostWeighting, PlanError, Planner, PRIMARY_USAGE_COST,
    SECONDARY_USAGE_COST,
};
