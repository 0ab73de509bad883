use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::domain::entities::{LookupOption, Role};
use crate::domain::errors::{ApiError, PageError};
use crate::domain::ports::{ReportKind, SessionStorage};
use crate::domain::routes::Route;
use crate::frameworks::config::ConsoleConfig;
use crate::interface_adapters::{ApiClient, FileSessionStorage, SystemClock, WatchNavigator};
use crate::use_cases::{
    DashboardFetcher, RecordsService, ReportFile, Router, SessionStore, StreamKind,
};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("access denied: {requested} redirected to {landed}")]
    Denied { requested: Route, landed: Route },
    #[error("no {what} with id {id}")]
    UnknownFilter { what: &'static str, id: String },
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Wired application: session, guarded router and the backend-facing services.
pub struct Console {
    pub session: Arc<SessionStore>,
    pub router: Router,
    pub navigator: Arc<WatchNavigator>,
    pub dashboard: DashboardFetcher,
    pub records: RecordsService,
}

impl Console {
    pub fn build(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let storage = Arc::new(FileSessionStorage::new(&config.session_file));
        tracing::debug!(path = %storage.path().display(), "using session file.");
        Self::with_storage(config, storage)
    }

    pub fn with_storage(
        config: &ConsoleConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, ConsoleError> {
        let api = Arc::new(ApiClient::new(
            config.api_base(),
            config.request_timeout,
            storage.clone(),
        )?);
        let navigator = Arc::new(WatchNavigator::new(Route::Login));
        let session = Arc::new(SessionStore::restore(
            Arc::new(SystemClock),
            storage,
            api.clone(),
            navigator.clone(),
        ));
        let router = Router::new(session.clone(), navigator.clone());
        let dashboard = DashboardFetcher::new(api.clone(), config.default_page_size)?;
        let records = RecordsService::new(api.clone());

        Ok(Self {
            session,
            router,
            navigator,
            dashboard,
            records,
        })
    }

    // Navigates to `route` and fails unless the guards let the user stay there.
    pub fn enter(&self, route: Route) -> Result<Route, ConsoleError> {
        let landed = self.router.navigate(route.path());
        if landed != route {
            return Err(ConsoleError::Denied {
                requested: route,
                landed,
            });
        }
        Ok(landed)
    }

    // Admins and viewers each have their own copy of the dashboard.
    pub fn dashboard_route(&self) -> Route {
        match self.session.role() {
            Some(Role::Viewer) => Route::ViewerDashboard,
            _ => Route::AdminDashboard,
        }
    }

    // Digitadors export from their records screen, everyone else from the dashboard.
    pub fn report_route(&self) -> Route {
        match self.session.role() {
            Some(Role::Digitador) => Route::DigitadorRecords,
            _ => self.dashboard_route(),
        }
    }

    /// Downloads a report and writes it into `out_dir` under its canonical name.
    ///
    /// The user must be allowed on the screen that offers reports. A filter id
    /// is resolved against the dashboard's lookup lists.
    pub async fn save_report(
        &self,
        kind: ReportKind,
        filter_id: Option<&str>,
        out_dir: &Path,
    ) -> Result<(PathBuf, ReportFile), ConsoleError> {
        self.enter(self.report_route())?;
        let filter = match filter_id {
            Some(id) => Some(self.lookup(kind, id).await?),
            None => None,
        };
        let report = self
            .records
            .download_report(kind, filter.as_ref(), Utc::now().date_naive())
            .await?;

        let path = out_dir.join(&report.file_name);
        tokio::fs::write(&path, &report.bytes)
            .await
            .map_err(|source| ConsoleError::Write {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "report saved.");
        Ok((path, report))
    }

    // Resolves a report filter id to its display name, loading the dashboard lookups if needed.
    async fn lookup(&self, kind: ReportKind, id: &str) -> Result<LookupOption, ConsoleError> {
        let (what, stream) = match kind {
            ReportKind::ByLeader => ("leader", StreamKind::LeaderLookup),
            ReportKind::ByChief => ("chief", StreamKind::ChiefLookup),
        };

        let mut view = self.dashboard.view();
        if view.report_filters(kind).is_empty() {
            let report = self.dashboard.refresh().await;
            if let Some((_, err)) = report.failures.into_iter().find(|(failed, _)| *failed == stream) {
                return Err(err.into());
            }
            view = self.dashboard.view();
        }

        view.report_filters(kind)
            .iter()
            .find(|option| option.id == id)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownFilter {
                what,
                id: id.to_string(),
            })
    }
}
