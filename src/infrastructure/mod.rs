//! Infrastructure layer: filesystem, REST client and service wiring

pub mod di;
pub mod error;
pub mod tableau;
pub mod traits;

pub use error::{InfraError, InfraResult};
