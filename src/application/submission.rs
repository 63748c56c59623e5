use std::sync::Arc;

use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::incident::{IncidentReport, SubmissionForm};
use crate::domain::row::{PersistedRow, MASTER_SCHEMA};
use crate::domain::sheets::{CategoryTable, SheetLayout};
use crate::domain::store::{resolve_store, StoreRecord, StoreWarning};
use crate::ports::notifier::Notifier;
use crate::ports::spreadsheet::SpreadsheetGateway;
use crate::ports::token_provider::TokenProvider;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("invalid submission")]
    Validation,
    #[error("could not authenticate with the spreadsheet service")]
    Authentication,
    #[error("could not read the store table")]
    StoreLookup,
    #[error("could not save the submission")]
    MasterAppend,
    #[error("submission saved to the master table but not to {table}")]
    CategoryAppend { table: String },
}

impl SubmissionError {
    /// True when the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SubmissionError::Validation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub response_id: String,
    /// Empty when the store name matched no reference row.
    pub store_id: String,
    pub warning: Option<StoreWarning>,
}

/// Validates a submission and fans it out to the master and category tables.
///
/// Steps run in order and the first failure aborts the rest. Nothing is retried.
pub struct SubmissionService {
    tokens: Arc<dyn TokenProvider>,
    sheets: Arc<dyn SpreadsheetGateway>,
    notifier: Arc<dyn Notifier>,
    layout: SheetLayout,
}

impl SubmissionService {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        sheets: Arc<dyn SpreadsheetGateway>,
        notifier: Arc<dyn Notifier>,
        layout: SheetLayout,
    ) -> Self {
        Self {
            tokens,
            sheets,
            notifier,
            layout,
        }
    }

    #[instrument(skip(self, form), fields(store = %form.store_name, event_type = %form.event_type))]
    pub async fn submit(
        &self,
        form: SubmissionForm,
        submitter_ip: String,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let report = IncidentReport::try_from(form).change_context(SubmissionError::Validation)?;

        let token = self
            .tokens
            .access_token()
            .await
            .change_context(SubmissionError::Authentication)?;
        let spreadsheet_id = self.layout.spreadsheet_id.as_str();

        let stores: Vec<StoreRecord> = self
            .sheets
            .read_rows(&token, spreadsheet_id, &self.layout.stores_range())
            .await
            .change_context(SubmissionError::StoreLookup)?
            .iter()
            .map(|row| StoreRecord::from_row(row))
            .collect();
        let resolution = resolve_store(&stores, &report.header.store_name);
        if let Some(warning) = resolution.warning {
            warn!(matches = resolution.matches, "{}", warning);
        }

        let row = PersistedRow::new(report, resolution.store_id, submitter_ip);

        self.sheets
            .append_row(
                &token,
                spreadsheet_id,
                &self.layout.master_range(),
                MASTER_SCHEMA.render(&row),
            )
            .await
            .change_context(SubmissionError::MasterAppend)?;

        match CategoryTable::for_details(&row.report.details) {
            Some(table) => {
                let range = self.layout.category_range(table);
                self.sheets
                    .append_row(&token, spreadsheet_id, &range, table.schema().render(&row))
                    .await
                    .change_context_lazy(|| SubmissionError::CategoryAppend {
                        table: range.clone(),
                    })
                    .attach_printable_lazy(|| format!("Response_ID {}", row.response_id))?;
            }
            None => {
                info!(
                    event_type = %row.report.header.event_type,
                    "unrecognized category; row kept in the master table only"
                );
            }
        }

        self.notifier.notify(&row);

        info!(response_id = %row.response_id, store_id = %row.store_id, "submission accepted");
        Ok(SubmissionReceipt {
            response_id: row.response_id,
            store_id: row.store_id,
            warning: resolution.warning,
        })
    }
}
