use std::sync::Arc;

use error_stack::{Result, ResultExt};
use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::domain::sheets::{CatalogColumn, SheetLayout};
use crate::domain::store::StoreRecord;
use crate::ports::spreadsheet::SpreadsheetGateway;
use crate::ports::token_provider::TokenProvider;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("could not authenticate with the spreadsheet service")]
    Authentication,
    #[error("could not read reference data")]
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreOption {
    pub id: String,
    pub nombre: String,
}

/// Reference data that populates the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub tiendas: Vec<StoreOption>,
    pub tipo_evento: Vec<String>,
    pub tipo_evento_plaga: Vec<String>,
    pub tipo_plaga: Vec<String>,
    pub sectores: Vec<String>,
    pub cat_aroma: Vec<String>,
    pub cat_quimico: Vec<String>,
}

impl Catalog {
    fn column_mut(&mut self, column: CatalogColumn) -> &mut Vec<String> {
        match column {
            CatalogColumn::EventTypes => &mut self.tipo_evento,
            CatalogColumn::PestEventTypes => &mut self.tipo_evento_plaga,
            CatalogColumn::PestTypes => &mut self.tipo_plaga,
            CatalogColumn::Sectors => &mut self.sectores,
            CatalogColumn::AromaCauses => &mut self.cat_aroma,
            CatalogColumn::ChemicalCauses => &mut self.cat_quimico,
        }
    }
}

pub struct CatalogService {
    tokens: Arc<dyn TokenProvider>,
    sheets: Arc<dyn SpreadsheetGateway>,
    layout: SheetLayout,
}

impl CatalogService {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        sheets: Arc<dyn SpreadsheetGateway>,
        layout: SheetLayout,
    ) -> Self {
        Self {
            tokens,
            sheets,
            layout,
        }
    }

    /// Reads the store table and every catalog column concurrently.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        let token = self
            .tokens
            .access_token()
            .await
            .change_context(CatalogError::Authentication)?;
        let spreadsheet_id = self.layout.spreadsheet_id.as_str();

        let stores_range = self.layout.stores_range();
        let stores = self
            .sheets
            .read_rows(&token, spreadsheet_id, &stores_range);

        let column_ranges: Vec<String> = CatalogColumn::ALL
            .iter()
            .map(|column| self.layout.catalog_range(*column))
            .collect();
        let columns = try_join_all(
            column_ranges
                .iter()
                .map(|range| self.sheets.read_column(&token, spreadsheet_id, range)),
        );

        let (stores, columns) = futures::try_join!(stores, columns).change_context(CatalogError::Read)?;

        let mut catalog = Catalog {
            tiendas: stores
                .iter()
                .map(|row| StoreRecord::from_row(row))
                .filter(|record| !record.id.trim().is_empty() && !record.name.trim().is_empty())
                .map(|record| StoreOption {
                    id: record.id,
                    nombre: record.name,
                })
                .collect(),
            ..Default::default()
        };
        for (column, values) in CatalogColumn::ALL.into_iter().zip(columns) {
            *catalog.column_mut(column) = values;
        }

        tracing::debug!(stores = catalog.tiendas.len(), "catalog loaded");
        Ok(catalog)
    }
}
