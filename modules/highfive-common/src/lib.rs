pub mod config;
pub mod error;
pub mod params;
pub mod types;

pub use config::{Config, EmailConfig, MetricsConfig, SubjectTemplates};
pub use error::ConfigError;
pub use params::{EnvSource, FileSource, ParameterSource, Parameters};
pub use types::*;
