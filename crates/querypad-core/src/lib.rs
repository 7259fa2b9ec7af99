pub mod config;
pub mod error;
pub mod types;

pub use config::{GeneralConfig, QuerypadConfig, RemoteConfig};
pub use error::{QuerypadError, Result};
pub use types::*;
