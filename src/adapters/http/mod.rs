pub mod handlers;
pub mod response;
pub mod router;

pub use router::{router, AppState};
