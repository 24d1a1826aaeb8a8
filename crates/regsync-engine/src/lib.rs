//! Reconciliation engine keeping registry groups, unix cluster links,
//! and the directory in agreement.
//!
//! A run is snapshot, plan, apply: capture one consistent view of all
//! three systems, derive the needed writes as pure set algebra, then
//! perform them one at a time with a fresh read before each identifier
//! write.  Repair ([`Engine::fixup_all`]) and the project/user map
//! ([`Engine::usermap`]) share the same accessor and configuration.

pub mod allocator;
pub mod cache;
pub mod engine;
pub mod error;
mod executor;
pub mod fixup;
pub mod planner;
pub mod snapshot;
pub mod usermap;

pub use allocator::GidAllocator;
pub use cache::FileCache;
pub use engine::{Engine, EngineConfig, RunSummary};
pub use error::{EngineError, EngineResult};
pub use executor::ApplyReport;
pub use fixup::{
    fixed_group_name, identifiers_to_delete, FixupBatchReport, FixupReport, GroupInspection,
};
pub use planner::Plan;
pub use snapshot::{GroupRecord, Snapshot};
pub use usermap::{Usermap, UsermapOptions};
