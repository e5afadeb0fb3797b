mod job_registry;
mod overlay;
mod trigger;

pub use job_registry::{DeltaOutcome, JobRegistry};
pub use overlay::{OptimisticJob, OptimisticOverlay};
pub use trigger::RefreshTrigger;
