use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    // Signed token carrying the session claims.
    pub access_token: String,
}

// Query string of the report endpoints; the id is omitted to export everything.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chief_id: Option<&'a str>,
}
