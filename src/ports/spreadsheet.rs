use thiserror::Error;

use crate::domain::credential::AccessToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("invalid spreadsheet request: {0}")]
    InvalidRequest(String),
    #[error("spreadsheet API request failed")]
    Transport,
    #[error("spreadsheet API responded {status}: {body}")]
    Status { status: u16, body: String },
    #[error("spreadsheet API returned an unexpected response")]
    MalformedResponse,
}

/// Read/append access to the backing spreadsheet.
///
/// Appends are independent operations; nothing groups several of them into a
/// transaction.
#[async_trait::async_trait]
pub trait SpreadsheetGateway: Send + Sync {
    /// First cell of every row in `range`, skipping rows whose first cell is blank.
    async fn read_column(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> error_stack::Result<Vec<String>, UpstreamError>;

    async fn read_rows(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, UpstreamError>;

    /// Appends one row, letting the spreadsheet parse values as if typed by a user.
    async fn append_row(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> error_stack::Result<(), UpstreamError>;
}
