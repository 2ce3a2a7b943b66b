pub mod layout;
pub mod orchestrator;
pub mod partition;
pub mod worker;

pub use layout::{check_unique_targets, OutputLayout};
pub use orchestrator::{generate_all, GenerationSummary, Launcher};
pub use partition::partition;
pub use worker::{GroupReport, GroupTask, GroupWorker, WorkerOutcome};
