pub mod engine;
pub mod notify;
pub mod policy;
pub mod store;

pub use engine::{Actor, AttendanceCorrections, NoopCorrections, WorkflowEngine};
pub use notify::{Notifier, TracingNotifier, WorkflowEvent};
pub use policy::ApprovalPolicy;
pub use store::{InMemoryRegularizationStore, RegularizationStore, RequestListFilters};
