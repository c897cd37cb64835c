//! joulegrid-api — HTTP surface for the two serving modes.
//!
//! Two independent routers, mounted by the daemon depending on mode:
//!
//! | Mode | Method | Path | Description |
//! |---|---|---|---|
//! | extender | POST | `/` | Scheduler extension callback: filter candidates to the lowest-score node |
//! | seeder | GET | `/` | Liveness greeting |
//! | seeder | GET/POST | `/setup` | Run a seeding pass (`?mean=50&std=25`) |
//! | seeder | GET/POST | `/reset` | Replay the last seeding pass's scores |
//!
//! The extender is read-only with respect to node state; only the
//! seeder routes write labels.

pub mod extender;
pub mod seed;

pub use extender::{extender_router, ExtenderArgs, ExtenderFilterResult, NodeList, WorkloadRef};
pub use seed::seeder_router;
