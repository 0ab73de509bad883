// Use cases layer: session, navigation guards, dashboard aggregation and records workflows.

pub mod dashboard;
pub mod guards;
pub mod pagination;
pub mod records;
pub mod sequence;
pub mod series;
pub mod session;
pub mod token;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use dashboard::{DashboardFetcher, DashboardView, FetchOutcome, RefreshReport, StreamKind};
pub use guards::{GuardDecision, MenuEntry, Router};
pub use records::{RecordsService, ReportFile, SaveError};
pub use session::{AuthState, SessionStore};
