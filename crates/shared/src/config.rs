//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Outgoing notification email.
    #[serde(default)]
    pub email: EmailConfig,
    /// Attachment storage backend.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Case system integration.
    #[serde(default)]
    pub case_system: CaseSystemConfig,
    /// Credentials of the payment export robot.
    #[serde(default)]
    pub payment_export: PaymentExportConfig,
    /// Business limits.
    #[serde(default)]
    pub benefit: BenefitConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in minutes.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expires_minutes: i64,
}

fn default_access_token_expiry() -> i64 {
    60
}

/// SMTP settings for status notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether notifications are sent at all.
    #[serde(default)]
    pub enabled: bool,
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Base URL of the applicant UI, used for links in messages.
    #[serde(default = "default_applicant_url")]
    pub applicant_url: String,
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "noreply@benefit.local".to_string()
}

fn default_from_name() -> String {
    "Helsinki benefit".to_string()
}

fn default_applicant_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            applicant_url: default_applicant_url(),
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageSettings {
    /// S3-compatible object storage.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key id.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage.
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage account key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Local filesystem.
    LocalFs {
        /// Root directory.
        root: PathBuf,
    },
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::LocalFs {
            root: PathBuf::from("./storage"),
        }
    }
}

/// Case system connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseSystemConfig {
    /// Base URL of the case system REST API.
    #[serde(default = "default_case_system_url")]
    pub base_url: String,
    /// Bearer token used when calling the case system.
    #[serde(default)]
    pub api_token: String,
    /// Bearer token the case system presents on callbacks and file fetches.
    #[serde(default)]
    pub callback_token: String,
    /// Request timeout in seconds.
    #[serde(default = "default_case_system_timeout")]
    pub timeout_secs: u64,
    /// Public base URL of this service, used to build callback and file links.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_case_system_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_case_system_timeout() -> u64 {
    30
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for CaseSystemConfig {
    fn default() -> Self {
        Self {
            base_url: default_case_system_url(),
            api_token: String::new(),
            callback_token: String::new(),
            timeout_secs: default_case_system_timeout(),
            public_url: default_public_url(),
        }
    }
}

/// HTTP Basic credentials of the payment export robot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentExportConfig {
    /// Robot username.
    #[serde(default)]
    pub username: String,
    /// Robot password.
    #[serde(default)]
    pub password: String,
}

/// Limits applied to applications and attachments.
#[derive(Debug, Clone, Deserialize)]
pub struct BenefitConfig {
    /// Maximum attachment size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Minimum weekly working hours of the employee.
    #[serde(default = "default_min_working_hours")]
    pub min_working_hours: u32,
    /// Company form codes treated as associations.
    #[serde(default = "default_association_form_codes")]
    pub association_form_codes: Vec<i32>,
}

fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}

fn default_min_working_hours() -> u32 {
    18
}

fn default_association_form_codes() -> Vec<i32> {
    vec![29]
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            min_working_hours: default_min_working_hours(),
            association_form_codes: default_association_form_codes(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BENEFIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("benefit.association_form_codes")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
