use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::{
    AgentStats, Chief, ChiefStats, Digitador, Leader, LeaderStats, PagedResult, StatusCounts,
    Voter,
};
use crate::domain::errors::{ApiError, StorageError};
use crate::domain::routes::Route;

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}

// Durable key/value storage for the session entries.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// Port for committing a navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    // Exchanges credentials for an access token.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
}

// Query for the paginated voter activity log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoterLogQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// Read-only dashboard resources. Each call is independently failable.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn status_counts(&self) -> Result<StatusCounts, ApiError>;
    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ApiError>;
    async fn leader_stats(&self) -> Result<Vec<LeaderStats>, ApiError>;
    async fn chief_stats(&self) -> Result<Vec<ChiefStats>, ApiError>;
    async fn leaders(&self) -> Result<Vec<Leader>, ApiError>;
    async fn chiefs(&self) -> Result<Vec<Chief>, ApiError>;
    async fn voter_log(&self, query: &VoterLogQuery) -> Result<PagedResult<Voter>, ApiError>;
}

// The serialization within this layer is a dependency leak, kept for pragmatism.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoterInput {
    pub cedula: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub leader_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderInput {
    pub cedula: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub chief_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChiefInput {
    #[serde(rename = "nombre")]
    pub name: String,
    pub cedula: String,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitadorInput {
    pub username: String,
    pub full_name: String,
    // Omitted on edit when left blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    ByLeader,
    ByChief,
}

// CRUD writes and report downloads behind the records screens.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    async fn register_voter(&self, input: &VoterInput) -> Result<Voter, ApiError>;
    async fn update_voter(&self, id: &str, input: &VoterInput) -> Result<Voter, ApiError>;

    async fn create_leader(&self, input: &LeaderInput) -> Result<Leader, ApiError>;
    async fn update_leader(&self, id: &str, input: &LeaderInput) -> Result<Leader, ApiError>;
    async fn delete_leader(&self, id: &str) -> Result<(), ApiError>;

    async fn create_chief(&self, input: &ChiefInput) -> Result<Chief, ApiError>;
    async fn update_chief(&self, id: &str, input: &ChiefInput) -> Result<Chief, ApiError>;
    async fn delete_chief(&self, id: &str) -> Result<(), ApiError>;

    async fn digitadors(&self) -> Result<Vec<Digitador>, ApiError>;
    async fn create_digitador(&self, input: &DigitadorInput) -> Result<Digitador, ApiError>;
    async fn update_digitador(
        &self,
        id: &str,
        input: &DigitadorInput,
    ) -> Result<Digitador, ApiError>;
    async fn delete_digitador(&self, id: &str) -> Result<(), ApiError>;

    // Binary spreadsheet; `filter_id` narrows the report to one leader/chief.
    async fn report(&self, kind: ReportKind, filter_id: Option<&str>) -> Result<Vec<u8>, ApiError>;
}
