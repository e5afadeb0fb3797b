mod dashboard_engine;
mod handle;
mod view;

pub use dashboard_engine::DashboardEngine;
pub use handle::DashboardHandle;
pub use view::{ConnectionState, DashboardView, JobEntry};
