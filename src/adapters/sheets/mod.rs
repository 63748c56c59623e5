pub mod spreadsheet_client;
pub mod value_range;

pub use spreadsheet_client::{SpreadsheetClient, DEFAULT_SHEETS_API_URL};
