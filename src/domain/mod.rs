// Domain layer: console entities, routes, errors and the ports the use cases depend on.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod routes;

pub use entities::{
    AgentStats, Chief, ChiefStats, Digitador, Leader, LeaderStats, LookupOption, PagedResult,
    Role, Session, StatusCounts, VerificationStatus, Voter,
};
pub use errors::{ApiError, ApiErrorKind, AuthError, PageError, StorageError};
pub use ports::{
    AuthApi, ChiefInput, Clock, DashboardApi, DigitadorInput, LeaderInput, Navigator, RecordsApi,
    ReportKind, SessionStorage, VoterInput, VoterLogQuery,
};
pub use routes::{Area, Route};
