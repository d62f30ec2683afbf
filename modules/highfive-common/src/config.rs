use std::env;
use std::path::Path;

use tracing::info;

use crate::error::ConfigError;
use crate::params::{EnvSource, FileSource, ParameterSource, Parameters};

/// Environment name used when `ENVIRONMENT` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Prefix for parameters read from environment variables.
pub const ENV_PREFIX: &str = "HIGH_FIVE_TRACKER";

const DEFAULT_MAX_PAGES: u32 = 1000;
const DEFAULT_COUNT_PARAM: &str = "p";
const DEFAULT_OFFSET_PARAM: &str = "e";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_METRICS_NAMESPACE: &str = "HighFiveTracker";
const DEFAULT_SUBJECT_SINGULAR: &str = "Found a new high five";
const DEFAULT_SUBJECT_PLURAL: &str = "Found {count} new high fives";

/// Tracker configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,

    // Listing endpoint
    pub base_url: String,
    pub batch_size: u32,
    pub num_retries: u32,
    pub retry_backoff_factor: f64,
    /// Upper bound on pages per run.
    pub max_pages: u32,
    /// Query parameter names for the page size and offset.
    pub count_param: String,
    pub offset_param: String,

    // Filtering
    pub names_of_interest: Vec<String>,
    pub communities_of_interest: Vec<String>,

    // Side effects
    pub notifications_enabled: bool,
    pub metrics_enabled: bool,
    pub person_counts_enabled: bool,

    /// Present whenever notifications are enabled.
    pub email: Option<EmailConfig>,
    pub metrics: MetricsConfig,
}

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from: String,
    pub to: String,
    pub to_secondary: Option<String>,
    pub subjects: SubjectTemplates,
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "<secret>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("to_secondary", &self.to_secondary)
            .field("subjects", &self.subjects)
            .finish()
    }
}

/// Subject lines for the notification; `{count}` is replaced by the number of
/// matching high fives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTemplates {
    pub singular: String,
    pub plural: String,
}

impl SubjectTemplates {
    pub fn subject(&self, count: usize) -> String {
        let template = if count == 1 {
            &self.singular
        } else {
            &self.plural
        };
        template.replace("{count}", &count.to_string())
    }
}

impl Default for SubjectTemplates {
    fn default() -> Self {
        Self {
            singular: DEFAULT_SUBJECT_SINGULAR.to_string(),
            plural: DEFAULT_SUBJECT_PLURAL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub namespace: String,
    /// HTTP endpoint accepting metric data. Metrics are only logged when unset.
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration for this process.
    ///
    /// Without an `ENVIRONMENT` variable we assume a development checkout and
    /// read `config.toml` then `secrets.toml` from `config_dir`. Otherwise
    /// parameters come from `HIGH_FIVE_TRACKER_*` environment variables.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        match env::var("ENVIRONMENT") {
            Err(_) => {
                info!(
                    "Did not find ENVIRONMENT environment variable, running in development mode and loading config from config files"
                );
                let config_file = config_dir.join("config.toml");
                let secrets_file = config_dir.join("secrets.toml");
                let source = FileSource::load(
                    DEFAULT_ENVIRONMENT,
                    &[config_file.as_path(), secrets_file.as_path()],
                )?;
                Self::from_source(&source)
            }
            Ok(environment) => {
                info!(
                    environment = %environment,
                    "Found ENVIRONMENT environment variable, reading parameters from environment variables"
                );
                let source = EnvSource::new(&environment, ENV_PREFIX);
                Self::from_source(&source)
            }
        }
    }

    pub fn from_source(source: &dyn ParameterSource) -> Result<Self, ConfigError> {
        let params = Parameters::new(source);

        let batch_size: u32 = params.required("batch-size")?;
        if batch_size == 0 {
            return Err(invalid("batch-size", "must be a positive integer"));
        }

        let retry_backoff_factor: f64 = params.required("retry-backoff-factor")?;
        if !retry_backoff_factor.is_finite() || retry_backoff_factor < 0.0 {
            return Err(invalid(
                "retry-backoff-factor",
                "must be a non-negative number",
            ));
        }

        let max_pages = params
            .optional("max-pages")?
            .unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            return Err(invalid("max-pages", "must be a positive integer"));
        }

        let notifications_enabled = params.optional("notifications-enabled")?.unwrap_or(true);
        let email = if notifications_enabled {
            Some(EmailConfig::from_params(&params)?)
        } else {
            None
        };

        Ok(Self {
            environment: params.environment().to_string(),
            base_url: params.required("base-url")?,
            batch_size,
            num_retries: params.required("num-retries")?,
            retry_backoff_factor,
            max_pages,
            count_param: params
                .optional("count-param")?
                .unwrap_or_else(|| DEFAULT_COUNT_PARAM.to_string()),
            offset_param: params
                .optional("offset-param")?
                .unwrap_or_else(|| DEFAULT_OFFSET_PARAM.to_string()),
            names_of_interest: params.array("names-of-interest")?,
            communities_of_interest: params.array("communities-of-interest")?,
            notifications_enabled,
            metrics_enabled: params.optional("metrics-enabled")?.unwrap_or(true),
            person_counts_enabled: params.optional("person-counts-enabled")?.unwrap_or(false),
            email,
            metrics: MetricsConfig {
                namespace: params
                    .optional("metrics-namespace")?
                    .unwrap_or_else(|| DEFAULT_METRICS_NAMESPACE.to_string()),
                endpoint: params.optional("metrics-endpoint")?,
            },
        })
    }

    /// One-line summary of what this run will do, for the startup log.
    pub fn log_summary(&self) {
        info!(
            environment = %self.environment,
            batch_size = self.batch_size,
            num_retries = self.num_retries,
            max_pages = self.max_pages,
            names = self.names_of_interest.len(),
            communities = self.communities_of_interest.len(),
            notifications = self.notifications_enabled,
            metrics = self.metrics_enabled,
            person_counts = self.person_counts_enabled,
            "Config loaded"
        );
    }
}

impl EmailConfig {
    fn from_params(params: &Parameters<'_>) -> Result<Self, ConfigError> {
        let defaults = SubjectTemplates::default();
        Ok(Self {
            smtp_host: params.required("smtp-host")?,
            smtp_port: params.optional("smtp-port")?.unwrap_or(DEFAULT_SMTP_PORT),
            smtp_username: params.optional_secret("smtp-username")?,
            smtp_password: params.optional_secret("smtp-password")?,
            from: params.required("from-email")?,
            to: params.required("to-email")?,
            to_secondary: params.optional("to-email-secondary")?,
            subjects: SubjectTemplates {
                singular: params
                    .optional("email-subject-singular")?
                    .unwrap_or(defaults.singular),
                plural: params
                    .optional("email-subject-plural")?
                    .unwrap_or(defaults.plural),
            },
        })
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}
