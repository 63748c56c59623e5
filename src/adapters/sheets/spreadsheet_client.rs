use error_stack::{report, Result, ResultExt};
use reqwest::{Client, Response, Url};
use tracing::{event, instrument, Level};

use super::value_range::ValueRange;
use crate::domain::credential::AccessToken;
use crate::ports::spreadsheet::{SpreadsheetGateway, UpstreamError};

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// REST client for the `spreadsheets.values` get/append endpoints.
#[derive(Debug, Clone)]
pub struct SpreadsheetClient {
    http: Client,
    base_url: Url,
}

impl SpreadsheetClient {
    pub fn new(http: Client, base_url: &str) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url)
            .change_context_lazy(|| UpstreamError::InvalidRequest(format!("bad API URL {}", base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(report!(UpstreamError::InvalidRequest(format!(
                "bad API URL {}",
                base_url
            ))));
        }
        Ok(Self { http, base_url })
    }

    /// `{base}/{spreadsheet_id}/values/{range}{suffix}`, each segment percent-encoded.
    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url, UpstreamError> {
        if spreadsheet_id.is_empty() {
            return Err(report!(UpstreamError::InvalidRequest(
                "spreadsheet id is empty".to_string()
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| report!(UpstreamError::InvalidRequest("bad API URL".to_string())))?
            .pop_if_empty()
            .push(spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    async fn fetch(&self, token: &AccessToken, spreadsheet_id: &str, range: &str) -> Result<ValueRange, UpstreamError> {
        let url = self.values_url(spreadsheet_id, range, "")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&token.value)
            .send()
            .await
            .change_context(UpstreamError::Transport)
            .attach_printable_lazy(|| format!("GET range {}", range))?;

        let response = ensure_success(response).await?;
        response
            .json::<ValueRange>()
            .await
            .change_context(UpstreamError::MalformedResponse)
            .attach_printable_lazy(|| format!("range {}", range))
    }
}

async fn ensure_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    event!(Level::WARN, %status, "spreadsheet API error");
    Err(report!(UpstreamError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }))
}

#[async_trait::async_trait]
impl SpreadsheetGateway for SpreadsheetClient {
    #[instrument(skip(self, token))]
    async fn read_column(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<String>, UpstreamError> {
        let rows = self.fetch(token, spreadsheet_id, range).await?.into_rows();
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter(|cell| !cell.trim().is_empty())
            .collect())
    }

    #[instrument(skip(self, token))]
    async fn read_rows(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, UpstreamError> {
        Ok(self.fetch(token, spreadsheet_id, range).await?.into_rows())
    }

    #[instrument(skip(self, token, row), fields(cells = row.len()))]
    async fn append_row(
        &self,
        token: &AccessToken,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), UpstreamError> {
        let mut url = self.values_url(spreadsheet_id, range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let response = self
            .http
            .post(url)
            .bearer_auth(&token.value)
            .json(&ValueRange::from_single_row(&row))
            .send()
            .await
            .change_context(UpstreamError::Transport)
            .attach_printable_lazy(|| format!("append to {}", range))?;

        ensure_success(response)
            .await
            .attach_printable_lazy(|| format!("append to {}", range))?;
        event!(Level::DEBUG, range, "row appended");
        Ok(())
    }
}
