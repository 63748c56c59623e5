pub mod credential;
pub mod incident;
pub mod row;
pub mod sheets;
pub mod store;

pub use credential::*;
pub use incident::*;
pub use row::PersistedRow;
pub use sheets::*;
pub use store::*;
