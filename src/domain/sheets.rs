use std::sync::LazyLock;

use regex::Regex;

use super::incident::IncidentDetails;
use super::row::{RowSchema, AROMA_SCHEMA, CHEMICAL_SCHEMA, MASTER_SCHEMA, PEST_SCHEMA};

static SPREADSHEET_URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid spreadsheet id pattern"));

/// Extracts the bare spreadsheet id from a sharing URL, or returns the trimmed
/// input when it has no `/d/<id>` segment.
pub fn resolve_spreadsheet_id(input: &str) -> String {
    let input = input.trim();
    SPREADSHEET_URL_ID
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| input.to_string(), |id| id.as_str().to_string())
}

/// Prefixes `cells` with a sheet name, quoting the name when A1 notation requires it.
pub fn range_expression(sheet: &str, cells: &str) -> String {
    let plain = !sheet.is_empty()
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}!{}", sheet, cells)
    } else {
        format!("'{}'!{}", sheet.replace('\'', "''"), cells)
    }
}

/// Category-specific destination tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTable {
    Pest,
    Aroma,
    Chemical,
}

impl CategoryTable {
    /// `None` for unrecognized categories: those rows live only in the master table.
    pub fn for_details(details: &IncidentDetails) -> Option<Self> {
        match details {
            IncidentDetails::Pest(_) => Some(CategoryTable::Pest),
            IncidentDetails::Aroma(_) => Some(CategoryTable::Aroma),
            IncidentDetails::Chemical(_) => Some(CategoryTable::Chemical),
            IncidentDetails::Unrecognized => None,
        }
    }

    pub fn schema(&self) -> RowSchema {
        match self {
            CategoryTable::Pest => PEST_SCHEMA,
            CategoryTable::Aroma => AROMA_SCHEMA,
            CategoryTable::Chemical => CHEMICAL_SCHEMA,
        }
    }
}

/// Columns of the catalog sheet that feed the form's drop-downs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogColumn {
    EventTypes,
    PestEventTypes,
    PestTypes,
    Sectors,
    AromaCauses,
    ChemicalCauses,
}

impl CatalogColumn {
    pub const ALL: [CatalogColumn; 6] = [
        CatalogColumn::EventTypes,
        CatalogColumn::PestEventTypes,
        CatalogColumn::PestTypes,
        CatalogColumn::Sectors,
        CatalogColumn::AromaCauses,
        CatalogColumn::ChemicalCauses,
    ];

    fn cells(&self) -> &'static str {
        match self {
            CatalogColumn::EventTypes => "A2:A",
            CatalogColumn::PestEventTypes => "C2:C",
            CatalogColumn::PestTypes => "E2:E",
            CatalogColumn::Sectors => "G2:G",
            CatalogColumn::AromaCauses => "I2:I",
            CatalogColumn::ChemicalCauses => "K2:K",
        }
    }
}

/// Where every table lives inside the backing spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub spreadsheet_id: String,
    pub responses: String,
    pub stores: String,
    pub catalog: String,
    pub pest: String,
    pub aroma: String,
    pub chemical: String,
}

impl SheetLayout {
    pub fn new(spreadsheet_id_or_url: &str) -> Self {
        Self {
            spreadsheet_id: resolve_spreadsheet_id(spreadsheet_id_or_url),
            responses: "Respuestas".into(),
            stores: "Tiendas".into(),
            catalog: "Catalogos".into(),
            pest: "Respuestas_Plaga".into(),
            aroma: "Respuestas_Aroma".into(),
            chemical: "Respuestas_Quimico".into(),
        }
    }

    pub fn master_range(&self) -> String {
        range_expression(&self.responses, &full_width(MASTER_SCHEMA))
    }

    pub fn stores_range(&self) -> String {
        range_expression(&self.stores, "A2:B")
    }

    pub fn category_range(&self, table: CategoryTable) -> String {
        let sheet = match table {
            CategoryTable::Pest => &self.pest,
            CategoryTable::Aroma => &self.aroma,
            CategoryTable::Chemical => &self.chemical,
        };
        range_expression(sheet, &full_width(table.schema()))
    }

    pub fn catalog_range(&self, column: CatalogColumn) -> String {
        range_expression(&self.catalog, column.cells())
    }
}

/// `A:<last>` spanning every column of `schema`.
fn full_width(schema: RowSchema) -> String {
    format!("A:{}", column_letter(schema.columns.len()))
}

/// Spreadsheet column letter for a 1-based index (1 → A, 27 → AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}
