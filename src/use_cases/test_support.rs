use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::domain::entities::{
    AgentStats, Chief, ChiefStats, Leader, LeaderStats, PagedResult, StatusCounts, Voter,
};
use crate::domain::errors::{ApiError, ApiErrorKind};
use crate::domain::ports::{AuthApi, Clock, DashboardApi, Navigator, VoterLogQuery};
use crate::domain::routes::Route;

// Shared adjustable time source for deterministic use-case tests.
pub(crate) struct FixedClock(AtomicU64);

impl FixedClock {
    pub(crate) fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub(crate) fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// Builds an unsigned token carrying the given claims.
pub(crate) fn make_token(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

pub(crate) fn session_token(role: &str, username: &str, exp: u64) -> String {
    make_token(json!({
        "sub": format!("id-{username}"),
        "username": username,
        "fullName": format!("{username} full"),
        "role": role,
        "exp": exp
    }))
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes mutex poisoned").clone()
    }

    pub(crate) fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().expect("routes mutex poisoned").push(route);
    }
}

pub(crate) struct ScriptedAuth {
    outcome: Result<String, ApiError>,
    calls: AtomicUsize,
}

impl ScriptedAuth {
    pub(crate) fn accepting(token: &str) -> Self {
        Self {
            outcome: Ok(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn rejecting(err: ApiError) -> Self {
        Self {
            outcome: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for ScriptedAuth {
    async fn login(&self, _username: &str, _password: &str) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub(crate) fn rejected(message: &str) -> ApiError {
    ApiError {
        kind: ApiErrorKind::Rejected,
        message: message.to_string(),
        status: Some(500),
        body: None,
    }
}

// Per-endpoint failure toggles.
#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub counts: bool,
    pub agents: bool,
    pub leader_stats: bool,
    pub chief_stats: bool,
    pub leaders: bool,
    pub chiefs: bool,
    pub voter_log: bool,
}

type HeldPage = oneshot::Receiver<Result<PagedResult<Voter>, ApiError>>;
type HeldCounts = oneshot::Receiver<Result<StatusCounts, ApiError>>;

/// In-memory dashboard backend.
///
/// Voter log calls are answered from `voters`, paged like the server would,
/// unless a held response was queued with [`ScriptedBackend::hold_voter_log`].
/// Status counts can be held the same way with [`ScriptedBackend::hold_counts`].
/// Held responses let tests resolve calls in any order.
pub(crate) struct ScriptedBackend {
    pub counts: StatusCounts,
    pub agents: Vec<AgentStats>,
    pub leader_stats: Vec<LeaderStats>,
    pub chief_stats: Vec<ChiefStats>,
    pub leaders: Vec<Leader>,
    pub chiefs: Vec<Chief>,
    pub voters: Vec<Voter>,
    pub failures: FailureFlags,
    aggregate_calls: AtomicUsize,
    voter_log_queries: Mutex<Vec<VoterLogQuery>>,
    held: Mutex<VecDeque<HeldPage>>,
    held_counts: Mutex<VecDeque<HeldCounts>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self {
            counts: StatusCounts {
                total: 100,
                success: 60,
                pending: 25,
                failed: 10,
                error: 5,
            },
            agents: vec![AgentStats {
                id: "d-1".to_string(),
                username: "dig01".to_string(),
                full_name: Some("Digitador Uno".to_string()),
                total: 40,
            }],
            leader_stats: (1..=12)
                .map(|n| LeaderStats {
                    id: format!("l-{n}"),
                    name: format!("Leader {n}"),
                    chief_name: Some("Chief A".to_string()),
                    total_voters: n,
                })
                .collect(),
            chief_stats: vec![
                ChiefStats {
                    id: "c-1".to_string(),
                    name: "Chief A".to_string(),
                    leader_count: Some(7),
                    voter_count: Some(70),
                },
                ChiefStats {
                    id: "c-2".to_string(),
                    name: "Chief B".to_string(),
                    leader_count: Some(5),
                    voter_count: None,
                },
            ],
            leaders: vec![leader("l-1", "Leader 1")],
            chiefs: vec![Chief {
                id: "c-1".to_string(),
                name: "Chief A".to_string(),
                cedula: "900".to_string(),
                phone: None,
            }],
            voters: (1..=23).map(|n| voter(&format!("v-{n}"))).collect(),
            failures: FailureFlags::default(),
            aggregate_calls: AtomicUsize::new(0),
            voter_log_queries: Mutex::new(Vec::new()),
            held: Mutex::new(VecDeque::new()),
            held_counts: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    // Queue a response slot for the next voter-log call.
    pub(crate) fn hold_voter_log(&self) -> oneshot::Sender<Result<PagedResult<Voter>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.held.lock().expect("held mutex poisoned").push_back(rx);
        tx
    }

    // Queue a response slot for the next status-counts call.
    pub(crate) fn hold_counts(&self) -> oneshot::Sender<Result<StatusCounts, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.held_counts
            .lock()
            .expect("held mutex poisoned")
            .push_back(rx);
        tx
    }

    pub(crate) fn voter_log_queries(&self) -> Vec<VoterLogQuery> {
        self.voter_log_queries
            .lock()
            .expect("queries mutex poisoned")
            .clone()
    }

    pub(crate) fn aggregate_calls(&self) -> usize {
        self.aggregate_calls.load(Ordering::SeqCst)
    }

    fn check(&self, fail: bool, what: &str) -> Result<(), ApiError> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        if fail {
            return Err(rejected(&format!("{what} unavailable")));
        }
        Ok(())
    }

    fn page_of(&self, query: &VoterLogQuery) -> PagedResult<Voter> {
        let limit = query.limit.max(1) as usize;
        let start = (query.page.saturating_sub(1) as usize) * limit;
        let items = self.voters.iter().skip(start).take(limit).cloned().collect();
        PagedResult {
            items,
            total: self.voters.len() as u64,
            page: query.page,
            limit: query.limit,
            total_pages: crate::domain::entities::total_pages(
                self.voters.len() as u64,
                query.limit,
            ),
        }
    }
}

#[async_trait]
impl DashboardApi for ScriptedBackend {
    async fn status_counts(&self) -> Result<StatusCounts, ApiError> {
        self.check(self.failures.counts, "counts")?;
        let held = self.held_counts.lock().expect("held mutex poisoned").pop_front();
        if let Some(rx) = held {
            return rx.await.unwrap_or_else(|_| Err(ApiError::network()));
        }
        Ok(self.counts)
    }

    async fn agent_stats(&self) -> Result<Vec<AgentStats>, ApiError> {
        self.check(self.failures.agents, "agents")?;
        Ok(self.agents.clone())
    }

    async fn leader_stats(&self) -> Result<Vec<LeaderStats>, ApiError> {
        self.check(self.failures.leader_stats, "leader stats")?;
        Ok(self.leader_stats.clone())
    }

    async fn chief_stats(&self) -> Result<Vec<ChiefStats>, ApiError> {
        self.check(self.failures.chief_stats, "chief stats")?;
        Ok(self.chief_stats.clone())
    }

    async fn leaders(&self) -> Result<Vec<Leader>, ApiError> {
        self.check(self.failures.leaders, "leaders")?;
        Ok(self.leaders.clone())
    }

    async fn chiefs(&self) -> Result<Vec<Chief>, ApiError> {
        self.check(self.failures.chiefs, "chiefs")?;
        Ok(self.chiefs.clone())
    }

    async fn voter_log(&self, query: &VoterLogQuery) -> Result<PagedResult<Voter>, ApiError> {
        self.voter_log_queries
            .lock()
            .expect("queries mutex poisoned")
            .push(query.clone());

        let held = self.held.lock().expect("held mutex poisoned").pop_front();
        if let Some(rx) = held {
            return rx.await.unwrap_or_else(|_| Err(ApiError::network()));
        }

        if self.failures.voter_log {
            return Err(rejected("voter log unavailable"));
        }
        Ok(self.page_of(query))
    }
}

pub(crate) fn leader(id: &str, name: &str) -> Leader {
    Leader {
        id: id.to_string(),
        cedula: "100".to_string(),
        name: name.to_string(),
        phone: "3000000000".to_string(),
        chief_id: Some("c-1".to_string()),
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn voter(id: &str) -> Voter {
    Voter {
        id: Some(id.to_string()),
        cedula: "123456".to_string(),
        name: format!("Voter {id}"),
        phone: "3001112233".to_string(),
        leader_id: "l-1".to_string(),
        leader: None,
        verification_status: None,
        created_at: None,
        updated_at: None,
        digitador: None,
    }
}
