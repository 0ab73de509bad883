use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::entities::{
    AgentStats, ChiefStats, LeaderStats, LookupOption, StatusCounts, Voter,
};
use crate::domain::errors::{ApiError, PageError};
use crate::domain::ports::{DashboardApi, ReportKind, VoterLogQuery};
use crate::use_cases::pagination::{ClientPager, PageCursor};
use crate::use_cases::sequence::SequenceGate;
use crate::use_cases::series::{self, DerivedSeries};

// Rows per page in the leader-stats side panel.
pub const LEADER_PANEL_PAGE_SIZE: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Counts,
    Agents,
    LeaderStats,
    ChiefStats,
    LeaderLookup,
    ChiefLookup,
    VoterLog,
}

// One independently loading section of the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub struct Stream<T> {
    pub loading: bool,
    pub data: T,
}

impl<T> Stream<T> {
    fn idle(data: T) -> Self {
        Self {
            loading: false,
            data,
        }
    }

    fn loading(data: T) -> Self {
        Self {
            loading: true,
            data,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoterLogState {
    pub loading: bool,
    pub cursor: PageCursor,
    pub search: Option<String>,
    pub items: Vec<Voter>,
    // Normalized message of the last failed fetch.
    pub error: Option<String>,
}

/// Immutable dashboard snapshot.
///
/// Each fetch publishes a new `Arc<DashboardView>`; readers holding an older
/// snapshot keep a consistent view.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    // Aggregate flag for the joint fan-out.
    pub loading: bool,
    pub counts: Stream<Option<StatusCounts>>,
    pub agents: Stream<Vec<AgentStats>>,
    pub leaders: Stream<ClientPager<LeaderStats>>,
    pub chiefs: Stream<Vec<ChiefStats>>,
    pub leader_options: Stream<Vec<LookupOption>>,
    pub chief_options: Stream<Vec<LookupOption>>,
    pub series: DerivedSeries,
    pub voter_log: VoterLogState,
}

impl DashboardView {
    fn initial(voter_log_limit: u32) -> Result<Self, PageError> {
        Ok(Self {
            loading: false,
            counts: Stream::idle(None),
            agents: Stream::idle(Vec::new()),
            leaders: Stream::idle(ClientPager::new(LEADER_PANEL_PAGE_SIZE)?),
            chiefs: Stream::idle(Vec::new()),
            leader_options: Stream::idle(Vec::new()),
            chief_options: Stream::idle(Vec::new()),
            series: DerivedSeries::default(),
            voter_log: VoterLogState {
                loading: false,
                cursor: PageCursor::new(voter_log_limit)?,
                search: None,
                items: Vec::new(),
                error: None,
            },
        })
    }

    // Report filter choices loaded by the last refresh.
    pub fn report_filters(&self, kind: ReportKind) -> &[LookupOption] {
        match kind {
            ReportKind::ByLeader => &self.leader_options.data,
            ReportKind::ByChief => &self.chief_options.data,
        }
    }
}

// Result of a joint fan-out. Failures are reported, never raised.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub failures: Vec<(StreamKind, ApiError)>,
    // A newer refresh was issued before this one finished; nothing was written.
    pub superseded: bool,
}

impl RefreshReport {
    pub fn failed(&self, kind: StreamKind) -> bool {
        self.failures.iter().any(|(failed, _)| *failed == kind)
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Applied,
    Failed(ApiError),
    // Dropped because a newer request for the same stream was issued.
    Superseded,
}

pub struct DashboardFetcher {
    api: Arc<dyn DashboardApi>,
    view: watch::Sender<Arc<DashboardView>>,
    aggregate_gate: SequenceGate,
    voter_log_gate: SequenceGate,
}

impl DashboardFetcher {
    pub fn new(api: Arc<dyn DashboardApi>, voter_log_limit: u32) -> Result<Self, PageError> {
        let (view, _) = watch::channel(Arc::new(DashboardView::initial(voter_log_limit)?));
        Ok(Self {
            api,
            view,
            aggregate_gate: SequenceGate::new(),
            voter_log_gate: SequenceGate::new(),
        })
    }

    pub fn view(&self) -> Arc<DashboardView> {
        Arc::clone(&self.view.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.view.subscribe()
    }

    // The refresh gesture: joint fan-out plus the voter log, side by side.
    pub async fn reload(&self) -> (RefreshReport, FetchOutcome) {
        tokio::join!(self.refresh(), self.load_voter_log())
    }

    #[tracing::instrument(name = "dashboard_refresh", skip_all)]
    pub async fn refresh(&self) -> RefreshReport {
        let ticket = self.aggregate_gate.begin();
        self.apply_if_current(&self.aggregate_gate, ticket, |view| {
            view.loading = true;
            view.counts = Stream::loading(None);
            view.agents = Stream::loading(Vec::new());
            view.leaders = Stream::loading(view.leaders.data.replaced(Vec::new()));
            view.chiefs = Stream::loading(Vec::new());
            view.leader_options = Stream::loading(Vec::new());
            view.chief_options = Stream::loading(Vec::new());
            view.series = DerivedSeries::default();
        });

        let api = self.api.as_ref();
        let (counts, agents, leader_stats, chief_stats, leaders, chiefs) = tokio::join!(
            api.status_counts(),
            api.agent_stats(),
            api.leader_stats(),
            api.chief_stats(),
            api.leaders(),
            api.chiefs(),
        );

        let mut failures = Vec::new();
        let counts = absorb(StreamKind::Counts, counts, &mut failures);
        let agents = absorb(StreamKind::Agents, agents, &mut failures);
        let leader_stats = absorb(StreamKind::LeaderStats, leader_stats, &mut failures);
        let chief_stats = absorb(StreamKind::ChiefStats, chief_stats, &mut failures);
        let leader_options = absorb(StreamKind::LeaderLookup, leaders, &mut failures)
            .map(|leaders| leaders.iter().map(LookupOption::from).collect::<Vec<_>>());
        let chief_options = absorb(StreamKind::ChiefLookup, chiefs, &mut failures)
            .map(|chiefs| chiefs.iter().map(LookupOption::from).collect::<Vec<_>>());

        let applied = self.apply_if_current(&self.aggregate_gate, ticket, |view| {
            view.counts = Stream::idle(counts);
            view.agents = Stream::idle(agents.unwrap_or_default());
            view.leaders = Stream::idle(
                view.leaders
                    .data
                    .replaced(leader_stats.unwrap_or_default()),
            );
            view.chiefs = Stream::idle(chief_stats.unwrap_or_default());
            view.leader_options = Stream::idle(leader_options.unwrap_or_default());
            view.chief_options = Stream::idle(chief_options.unwrap_or_default());
            view.series = series::build(
                view.counts.data.as_ref(),
                &view.chiefs.data,
                &view.agents.data,
            );
            view.loading = false;
        });

        if !applied {
            tracing::debug!(ticket, "dropping superseded dashboard refresh.");
        } else if failures.is_empty() {
            tracing::info!("dashboard refreshed.");
        } else {
            tracing::warn!(failed = failures.len(), "dashboard refreshed with failed streams.");
        }

        RefreshReport {
            failures,
            superseded: !applied,
        }
    }

    pub async fn load_voter_log(&self) -> FetchOutcome {
        let (cursor, search) = {
            let view = self.view.borrow();
            (view.voter_log.cursor, view.voter_log.search.clone())
        };
        self.fetch_voter_log(cursor, search).await
    }

    // Out-of-range pages are rejected before any request is issued.
    pub async fn change_page(&self, page: u32) -> Result<FetchOutcome, PageError> {
        let (cursor, search) = {
            let view = self.view.borrow();
            (view.voter_log.cursor, view.voter_log.search.clone())
        };
        let next = cursor.with_page(page)?;
        Ok(self.fetch_voter_log(next, search).await)
    }

    pub async fn change_page_size(&self, limit: u32) -> Result<FetchOutcome, PageError> {
        let (cursor, search) = {
            let view = self.view.borrow();
            (view.voter_log.cursor, view.voter_log.search.clone())
        };
        let next = cursor.with_limit(limit)?;
        Ok(self.fetch_voter_log(next, search).await)
    }

    // New search terms restart from page 1.
    pub async fn search(&self, query: &str) -> FetchOutcome {
        let cursor = self.view.borrow().voter_log.cursor;
        let search = Some(query.trim())
            .filter(|query| !query.is_empty())
            .map(str::to_string);
        self.fetch_voter_log(PageCursor { page: 1, ..cursor }, search)
            .await
    }

    pub fn change_leader_page(&self, page: u32) -> Result<(), PageError> {
        self.update_leader_pager(|pager| pager.with_page(page))
    }

    pub fn change_leader_page_size(&self, limit: u32) -> Result<(), PageError> {
        self.update_leader_pager(|pager| pager.with_limit(limit))
    }

    async fn fetch_voter_log(&self, mut cursor: PageCursor, search: Option<String>) -> FetchOutcome {
        loop {
            let ticket = self.voter_log_gate.begin();
            self.apply_if_current(&self.voter_log_gate, ticket, |view| {
                view.voter_log.loading = true;
                view.voter_log.cursor = cursor;
                view.voter_log.search = search.clone();
                view.voter_log.error = None;
            });

            let query = VoterLogQuery {
                page: cursor.page,
                limit: cursor.limit,
                search: search.clone(),
            };
            let result = self.api.voter_log(&query).await;

            let page = match result {
                Ok(page) => page.normalized(cursor.limit),
                Err(err) => {
                    let applied = self.apply_if_current(&self.voter_log_gate, ticket, |view| {
                        view.voter_log.items = Vec::new();
                        view.voter_log.error = Some(err.message.clone());
                        view.voter_log.loading = false;
                    });
                    if !applied {
                        return FetchOutcome::Superseded;
                    }
                    tracing::warn!(stream = ?StreamKind::VoterLog, error = %err, "voter log fetch failed.");
                    return FetchOutcome::Failed(err);
                }
            };

            let landed = cursor.with_total(page.total);
            if landed.page > landed.total_pages() {
                if !self.voter_log_gate.is_current(ticket) {
                    return FetchOutcome::Superseded;
                }
                // The list shrank below the requested page; follow it to the new last page.
                tracing::debug!(
                    requested = cursor.page,
                    total_pages = landed.total_pages(),
                    "voter log page is past the end; refetching."
                );
                cursor = landed.clamped();
                continue;
            }

            let applied = self.apply_if_current(&self.voter_log_gate, ticket, |view| {
                view.voter_log.cursor = landed;
                view.voter_log.items = page.items;
                view.voter_log.loading = false;
            });
            if applied {
                return FetchOutcome::Applied;
            }
            tracing::debug!(ticket, page = cursor.page, "dropping superseded voter log page.");
            return FetchOutcome::Superseded;
        }
    }

    fn update_leader_pager(
        &self,
        change: impl FnOnce(&ClientPager<LeaderStats>) -> Result<ClientPager<LeaderStats>, PageError>,
    ) -> Result<(), PageError> {
        let mut outcome = Ok(());
        self.view.send_if_modified(|current| match change(&current.leaders.data) {
            Ok(pager) => {
                let mut next = DashboardView::clone(current);
                next.leaders.data = pager;
                *current = Arc::new(next);
                true
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome
    }

    // Publishes a modified copy of the view if `ticket` is still the latest for its stream.
    fn apply_if_current(
        &self,
        gate: &SequenceGate,
        ticket: u64,
        change: impl FnOnce(&mut DashboardView),
    ) -> bool {
        self.view.send_if_modified(|current| {
            if !gate.is_current(ticket) {
                return false;
            }
            let mut next = DashboardView::clone(current);
            change(&mut next);
            *current = Arc::new(next);
            true
        })
    }
}

fn absorb<T>(
    kind: StreamKind,
    result: Result<T, ApiError>,
    failures: &mut Vec<(StreamKind, ApiError)>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(stream = ?kind, error = %err, "dashboard stream failed.");
            failures.push((kind, err));
            None
        }
    }
}
