pub mod catalog;
pub mod submission;

pub use catalog::{Catalog, CatalogError, CatalogService};
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionService};
