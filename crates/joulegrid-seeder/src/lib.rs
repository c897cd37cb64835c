//! joulegrid-seeder — the initializer driver.
//!
//! Seeds every node in the cluster with a synthetic energy score drawn
//! from a normal distribution, giving the monitor a baseline to
//! accumulate onto and the selector something to compare. A seeding
//! pass fans out one task per node and joins them all before
//! returning; the scores it assigned are recorded in memory so a later
//! `restore` can replay exactly the same values (useful for repeated
//! experiments against the same baseline).

pub mod seeder;

pub use seeder::{Seeder, SeedError, SeedSummary, DEFAULT_MEAN, DEFAULT_STD};
