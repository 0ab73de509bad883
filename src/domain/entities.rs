use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Console roles carried in the token claims. Only used for UI gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Digitador,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Digitador => "digitador",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Authenticated identity persisted under the user storage entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject_id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    // Token expiry in epoch seconds.
    pub token_expiry: u64,
}

/// One page of a server-paginated list.
///
/// `page` is 1-indexed. `total_pages` is always `ceil(total / limit)`, or 1
/// for an empty list; see [`PagedResult::normalized`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> PagedResult<T> {
    // Recompute total_pages from total/limit; the server value is not trusted.
    pub fn normalized(mut self, requested_limit: u32) -> Self {
        if self.limit == 0 {
            self.limit = requested_limit;
        }
        let expected = total_pages(self.total, self.limit);
        if self.total_pages != expected {
            tracing::debug!(
                reported = self.total_pages,
                expected,
                "paged result reported inconsistent total_pages."
            );
            self.total_pages = expected;
        }
        self
    }
}

pub fn total_pages(total: u64, limit: u32) -> u32 {
    if total == 0 || limit == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(limit));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Pending,
    Success,
    Failed,
    Error,
}

// Voter record as returned by the latest backend shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cedula: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(default)]
    pub leader_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<Leader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digitador: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub cedula: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chief {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default)]
    pub cedula: String,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// Data-entry agent account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Digitador {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default = "digitador_role")]
    pub role: Role,
}

fn digitador_role() -> Role {
    Role::Digitador
}

// Aggregate verification counts for the whole operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCounts {
    pub total: u64,
    pub success: u64,
    pub pending: u64,
    pub failed: u64,
    pub error: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub total: u64,
}

impl AgentStats {
    pub fn label(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderStats {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default)]
    pub chief_name: Option<String>,
    #[serde(default)]
    pub total_voters: u64,
}

// Per-chief counts; either number may be missing from the payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChiefStats {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default)]
    pub leader_count: Option<u64>,
    #[serde(default)]
    pub voter_count: Option<u64>,
}

// Name list entry used by the report filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: String,
    pub label: String,
}

impl From<&Leader> for LookupOption {
    fn from(leader: &Leader) -> Self {
        Self {
            id: leader.id.clone(),
            label: leader.name.clone(),
        }
    }
}

impl From<&Chief> for LookupOption {
    fn from(chief: &Chief) -> Self {
        Self {
            id: chief.id.clone(),
            label: chief.name.clone(),
        }
    }
}

// Ids arrive as strings or numbers depending on the endpoint.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Number(value) => value.to_string(),
    })
}
