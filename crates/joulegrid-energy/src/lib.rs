//! joulegrid-energy — the per-node energy score domain.
//!
//! One consistency-preserving writer feeding a consistency-dependent
//! reader: the drivers in this workspace recompute a node's score from
//! usage samples and persist it under the `joules` label, and the
//! placement side reads those labels back. This crate holds the three
//! pieces every driver shares:
//!
//! - **`score`** — the decimal score itself plus incremental
//!   accumulation from a usage sample
//! - **`staleness`** — the freshness gate that stops a driver from
//!   recomputing on a sample it has already consumed
//! - **`labeler`** — the optimistic-concurrency write path that
//!   persists a score, absorbing version conflicts up to a bounded
//!   retry budget

pub mod error;
pub mod labeler;
pub mod score;
pub mod staleness;

pub use error::{EnergyError, EnergyResult};
pub use labeler::{update_score, RETRY_BUDGET};
pub use score::{accumulate, Score, DEFAULT_SCALE_FACTOR, SCALE_FACTOR_ENV};
pub use staleness::FreshnessIndex;
