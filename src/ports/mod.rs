pub mod notifier;
pub mod spreadsheet;
pub mod token_provider;

pub use notifier::*;
pub use spreadsheet::*;
pub use token_provider::*;
