pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod prettyprint;
pub mod service_factory;

pub use application::*;
pub use domain::*;
pub use ports::*;
