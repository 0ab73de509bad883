use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::entities::{Chief, Digitador, Leader, LookupOption, Voter};
use crate::domain::errors::ApiError;
use crate::domain::ports::{RecordsApi, ReportKind};
use crate::use_cases::validation::{self, FieldErrors};

#[derive(Debug, Error)]
pub enum SaveError {
    // Rejected locally; nothing was sent.
    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Api(#[from] ApiError),
}

// A downloaded spreadsheet ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// REPORTE_{LIDER|JEFE}_{NAME|TODOS}_{YYYY-MM-DD}.xlsx
pub fn report_file_name(kind: ReportKind, filter: Option<&LookupOption>, date: NaiveDate) -> String {
    let scope = match kind {
        ReportKind::ByLeader => "LIDER",
        ReportKind::ByChief => "JEFE",
    };
    let name = filter
        .map(|option| {
            option
                .label
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .to_uppercase()
        })
        .unwrap_or_else(|| "TODOS".to_string());
    format!("REPORTE_{scope}_{name}_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Validated writes and report downloads for the records screens.
pub struct RecordsService {
    api: Arc<dyn RecordsApi>,
}

impl RecordsService {
    pub fn new(api: Arc<dyn RecordsApi>) -> Self {
        Self { api }
    }

    // `id` selects update over create.
    #[tracing::instrument(name = "save_voter", skip_all, fields(update = id.is_some()))]
    pub async fn save_voter(
        &self,
        id: Option<&str>,
        form: &HashMap<String, String>,
    ) -> Result<Voter, SaveError> {
        let input = validation::voter_input(form, id.is_some()).map_err(SaveError::Invalid)?;
        let saved = match id {
            Some(id) => self.api.update_voter(id, &input).await,
            None => self.api.register_voter(&input).await,
        };
        Ok(saved.inspect_err(|err| log_failure("voter", err))?)
    }

    #[tracing::instrument(name = "save_leader", skip_all, fields(update = id.is_some()))]
    pub async fn save_leader(
        &self,
        id: Option<&str>,
        form: &HashMap<String, String>,
    ) -> Result<Leader, SaveError> {
        let input = validation::leader_input(form).map_err(SaveError::Invalid)?;
        let saved = match id {
            Some(id) => self.api.update_leader(id, &input).await,
            None => self.api.create_leader(&input).await,
        };
        Ok(saved.inspect_err(|err| log_failure("leader", err))?)
    }

    #[tracing::instrument(name = "save_chief", skip_all, fields(update = id.is_some()))]
    pub async fn save_chief(
        &self,
        id: Option<&str>,
        form: &HashMap<String, String>,
    ) -> Result<Chief, SaveError> {
        let input = validation::chief_input(form).map_err(SaveError::Invalid)?;
        let saved = match id {
            Some(id) => self.api.update_chief(id, &input).await,
            None => self.api.create_chief(&input).await,
        };
        Ok(saved.inspect_err(|err| log_failure("chief", err))?)
    }

    #[tracing::instrument(name = "save_digitador", skip_all, fields(update = id.is_some()))]
    pub async fn save_digitador(
        &self,
        id: Option<&str>,
        form: &HashMap<String, String>,
    ) -> Result<Digitador, SaveError> {
        let input =
            validation::digitador_input(form, id.is_none()).map_err(SaveError::Invalid)?;
        let saved = match id {
            Some(id) => self.api.update_digitador(id, &input).await,
            None => self.api.create_digitador(&input).await,
        };
        Ok(saved.inspect_err(|err| log_failure("digitador", err))?)
    }

    pub async fn delete_leader(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_leader(id).await
    }

    pub async fn delete_chief(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_chief(id).await
    }

    pub async fn delete_digitador(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete_digitador(id).await
    }

    pub async fn digitadors(&self) -> Result<Vec<Digitador>, ApiError> {
        self.api.digitadors().await
    }

    // `filter` narrows the report to one leader or chief; `None` exports everything.
    #[tracing::instrument(name = "download_report", skip_all, fields(kind = ?kind))]
    pub async fn download_report(
        &self,
        kind: ReportKind,
        filter: Option<&LookupOption>,
        date: NaiveDate,
    ) -> Result<ReportFile, ApiError> {
        let bytes = self
            .api
            .report(kind, filter.map(|option| option.id.as_str()))
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "report download failed."))?;
        let file_name = report_file_name(kind, filter, date);
        tracing::info!(file_name, size = bytes.len(), "report downloaded.");
        Ok(ReportFile { file_name, bytes })
    }
}

fn log_failure(entity: &'static str, err: &ApiError) {
    tracing::warn!(entity, error = %err, status = ?err.status, "save rejected by backend.");
}
