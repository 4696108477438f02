use crate::domain::{LogEntry, Severity, ShipperError};
use crate::sender::{ClientConfig, ShipperCredentials};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use toml::{Table, Value};

/// Keys that environment variables may override, `.NET` style:
/// `Coralogix__ApiKey=...` (or `CORALOGIX__APIKEY=...`) sets
/// `[Coralogix] ApiKey`. Names match case-insensitively.
const ENV_KEYS: [(&str, &[&str]); 3] = [
    (
        "Coralogix",
        &[
            "ApiKey",
            "BearerToken",
            "ApplicationName",
            "SubsystemName",
            "LogsV1APIEndpoint",
        ],
    ),
    (
        "LoggingMessages",
        &["VerboseMessage", "ErrorMessage", "InformationMessage"],
    ),
    (
        "LogEntries",
        &["VerboseLog", "InformationLog", "WarningLog", "ErrorLog"],
    ),
];
const ENV_SEPARATOR: &str = "__";
const LOCAL_DEVELOPMENT_SUFFIX: &str = "local-development";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Output shape of the local log sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single lines
    #[default]
    Compact,
    /// One flattened JSON object per event
    Json,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoralogixSettings {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub application_name: Option<String>,
    pub subsystem_name: Option<String>,
    #[serde(rename = "LogsV1APIEndpoint")]
    pub logs_v1_api_endpoint: Option<String>,
}

impl fmt::Debug for CoralogixSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("CoralogixSettings")
            .field("api_key", &redact(&self.api_key))
            .field("bearer_token", &redact(&self.bearer_token))
            .field("application_name", &redact(&self.application_name))
            .field("subsystem_name", &redact(&self.subsystem_name))
            .field("logs_v1_api_endpoint", &self.logs_v1_api_endpoint)
            .finish()
    }
}

/// Messages written to the local log sink at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingMessages {
    pub verbose_message: Option<String>,
    pub error_message: Option<String>,
    pub information_message: Option<String>,
}

impl LoggingMessages {
    /// Present messages in emission order: verbose, error, information.
    pub fn messages(&self) -> Vec<(Severity, &str)> {
        [
            (Severity::Verbose, &self.verbose_message),
            (Severity::Error, &self.error_message),
            (Severity::Info, &self.information_message),
        ]
        .into_iter()
        .filter_map(|(severity, message)| message.as_deref().map(|m| (severity, m)))
        .collect()
    }
}

/// Texts shipped by the configured-entries flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfiguredLogEntries {
    pub verbose_log: Option<String>,
    pub information_log: Option<String>,
    pub warning_log: Option<String>,
    pub error_log: Option<String>,
}

impl ConfiguredLogEntries {
    /// Builds the four entries in fixed order: verbose, information, warning,
    /// error. Every text is required.
    pub fn entries(&self) -> Result<Vec<LogEntry>, ShipperError> {
        [
            ("LogEntries.VerboseLog", Severity::Verbose, &self.verbose_log),
            ("LogEntries.InformationLog", Severity::Info, &self.information_log),
            ("LogEntries.WarningLog", Severity::Warning, &self.warning_log),
            ("LogEntries.ErrorLog", Severity::Error, &self.error_log),
        ]
        .into_iter()
        .map(|(key, severity, text)| match text.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(LogEntry::new(severity, text)),
            _ => Err(ShipperError::configuration(format!("{key} is not configured"))),
        })
        .collect()
    }
}

/// The file-backed part of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default)]
    pub coralogix: CoralogixSettings,
    #[serde(default)]
    pub logging_messages: LoggingMessages,
    #[serde(default)]
    pub log_entries: ConfiguredLogEntries,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `base`, then the optional `<stem>.<environment>.<ext>` overlay,
    /// then `<stem>.local-development.<ext>` when the environment is
    /// Development, then `Section__Key` variables from `vars`. Later layers
    /// win key by key.
    pub fn load<I>(base: &Path, environment: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged = read_table(base)?;

        let mut overlays = vec![sibling_file(base, environment)];
        if environment.eq_ignore_ascii_case("development") {
            overlays.push(sibling_file(base, LOCAL_DEVELOPMENT_SUFFIX));
        }
        for overlay in overlays {
            if overlay.exists() {
                merge_tables(&mut merged, read_table(&overlay)?);
            }
        }

        merge_tables(&mut merged, env_table(vars));

        let settings: Settings = Value::Table(merged).try_into()?;
        Ok(settings)
    }

    pub fn credentials(&self) -> ShipperCredentials {
        let value = |field: &Option<String>| field.clone().unwrap_or_default();
        ShipperCredentials::new(
            value(&self.coralogix.api_key),
            value(&self.coralogix.bearer_token),
            value(&self.coralogix.application_name),
            value(&self.coralogix.subsystem_name),
            value(&self.coralogix.logs_v1_api_endpoint),
        )
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base settings file
    #[arg(long, env = "CX_CONFIG_FILE", default_value = "appsettings.toml")]
    pub config_file: PathBuf,

    /// Environment name, selects the appsettings.<environment>.toml overlay
    #[arg(long, env = "CX_ENVIRONMENT", default_value = "Development")]
    pub environment: String,

    /// Local log level
    #[arg(long, env = "LOG_LEVEL", default_value = "trace")]
    pub log_level: LogLevel,

    /// Local log output format
    #[arg(long, env = "RUST_LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Name of the timed sample operation
    #[arg(long, env = "OPERATION_NAME", default_value = "SampleOperation")]
    pub operation_name: String,

    /// Duration of the simulated operation in milliseconds
    #[arg(long, env = "OPERATION_DELAY_MS", default_value = "1000")]
    pub operation_delay_ms: u64,

    /// Settings loaded from files and environment (not CLI arguments)
    #[arg(skip)]
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("appsettings.toml"),
            environment: "Development".to_string(),
            log_level: LogLevel::Trace,
            log_format: LogFormat::Compact,
            request_timeout_secs: 30,
            operation_name: "SampleOperation".to_string(),
            operation_delay_ms: 1000,
            settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        config.settings = Settings::load(&config.config_file, &config.environment, std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.operation_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Operation name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn operation_delay(&self) -> Duration {
        Duration::from_millis(self.operation_delay_ms)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default().with_timeout(self.request_timeout())
    }
}

fn read_table(path: &Path) -> Result<Table, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileError {
        path: path.to_path_buf(),
        source,
    })?;
    content.parse::<Table>().map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// `dir/appsettings.toml` + `Production` -> `dir/appsettings.Production.toml`
fn sibling_file(base: &Path, infix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}.{infix}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{infix}"),
    };
    base.with_file_name(file_name)
}

fn env_table<I>(vars: I) -> Table
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut table = Table::new();
    for (name, value) in vars {
        let Some((section, key)) = canonical_env_key(&name) else {
            continue;
        };
        if let Value::Table(section_table) = table
            .entry(section.to_string())
            .or_insert_with(|| Value::Table(Table::new()))
        {
            section_table.insert(key.to_string(), Value::String(value));
        }
    }
    table
}

/// `CORALOGIX__APIKEY` -> `("Coralogix", "ApiKey")`; unknown names are `None`.
fn canonical_env_key(name: &str) -> Option<(&'static str, &'static str)> {
    let (section, key) = name.split_once(ENV_SEPARATOR)?;
    let (section, keys) = ENV_KEYS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(section))?;
    let key = keys.iter().find(|known| known.eq_ignore_ascii_case(key))?;
    Some((*section, *key))
}

fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, Value::Table(incoming));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_table_picks_known_sections_only() {
        let table = env_table(vec![
            ("Coralogix__ApiKey".to_string(), "from-env".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
            ("Unknown__Key".to_string(), "x".to_string()),
            ("Coralogix__Nested__Key".to_string(), "x".to_string()),
            ("Coralogix__NotAField".to_string(), "x".to_string()),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table["Coralogix"]["ApiKey"].as_str(), Some("from-env"));
        assert_eq!(table["Coralogix"].as_table().map(Table::len), Some(1));
    }

    #[test]
    fn env_names_match_case_insensitively() {
        let table = env_table(vec![
            ("CORALOGIX__APIKEY".to_string(), "k".to_string()),
            ("loggingmessages__errormessage".to_string(), "e".to_string()),
        ]);

        assert_eq!(table["Coralogix"]["ApiKey"].as_str(), Some("k"));
        assert_eq!(table["LoggingMessages"]["ErrorMessage"].as_str(), Some("e"));
        assert_eq!(canonical_env_key("Coralogix__ApiKey"), Some(("Coralogix", "ApiKey")));
        assert_eq!(canonical_env_key("PATH"), None);
    }

    #[test]
    fn merge_overrides_leaves_and_keeps_siblings() {
        let mut base: Table = "[Coralogix]\nApiKey = \"a\"\nSubsystemName = \"s\"".parse().unwrap();
        let overlay: Table = "[Coralogix]\nApiKey = \"b\"".parse().unwrap();

        merge_tables(&mut base, overlay);

        assert_eq!(base["Coralogix"]["ApiKey"].as_str(), Some("b"));
        assert_eq!(base["Coralogix"]["SubsystemName"].as_str(), Some("s"));
    }

    #[test]
    fn sibling_file_names() {
        let base = Path::new("/etc/cx/appsettings.toml");
        assert_eq!(
            sibling_file(base, "Production"),
            PathBuf::from("/etc/cx/appsettings.Production.toml")
        );
        assert_eq!(
            sibling_file(base, LOCAL_DEVELOPMENT_SUFFIX),
            PathBuf::from("/etc/cx/appsettings.local-development.toml")
        );
    }

    #[test]
    fn configured_entries_map_to_fixed_severities() {
        let entries = ConfiguredLogEntries {
            verbose_log: Some("v".to_string()),
            information_log: Some("i".to_string()),
            warning_log: Some("w".to_string()),
            error_log: Some("e".to_string()),
        }
        .entries()
        .unwrap();

        let codes: Vec<u8> = entries.iter().map(|e| e.severity().code()).collect();
        let texts: Vec<&str> = entries.iter().map(|e| e.text()).collect();
        assert_eq!(codes, vec![5, 3, 4, 2]);
        assert_eq!(texts, vec!["v", "i", "w", "e"]);
    }

    #[test]
    fn missing_configured_entry_is_a_configuration_error() {
        let err = ConfiguredLogEntries {
            verbose_log: Some("v".to_string()),
            ..Default::default()
        }
        .entries()
        .unwrap_err();

        assert!(err.to_string().contains("LogEntries.InformationLog"));
    }

    #[test]
    fn settings_debug_redacts_secrets() {
        let settings = Settings::from_toml_str(
            "[Coralogix]\nApiKey = \"top-secret\"\nBearerToken = \"Bearer hidden\"\nApplicationName = \"checkout\"\nLogsV1APIEndpoint = \"https://ingress.example.com\"",
        )
        .unwrap();

        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("hidden"));
        assert!(!rendered.contains("checkout"));
        assert!(rendered.contains("ingress.example.com"));
    }
}
