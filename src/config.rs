use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{borrow::Cow, env, path::Path};
use thiserror::Error;
use tracing::{error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "APP";
const DEVELOPMENT: &str = "development";

/// Signing secret baked in for local runs. Refused anywhere else.
const DEV_DEFAULT_JWT_SECRET: &str =
    "development_only_signing_secret_for_the_inventory_ledger_api_0123456789";

/// Placeholder secrets that ship in sample files and must never sign real tokens.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "changeme-inventory-ledger-secret",
    "replace-with-a-real-signing-secret",
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

mod defaults {
    pub const LOG_LEVEL: &str = "info";
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "sqlite://inventory.db?mode=rwc";
    /// Six months, the token horizon the ledger has always issued.
    pub const JWT_TTL_SECS: u64 = 6 * 30 * 24 * 60 * 60;
    pub const PAGE_SIZE: u64 = 1000;

    pub fn log_level() -> String {
        LOG_LEVEL.to_owned()
    }

    pub fn port() -> u16 {
        PORT
    }

    pub fn jwt_ttl_secs() -> u64 {
        JWT_TTL_SECS
    }

    pub fn page_size() -> u64 {
        PAGE_SIZE
    }

    pub fn pool_max() -> u32 {
        10
    }

    pub fn pool_min() -> u32 {
        1
    }

    pub fn connect_secs() -> u64 {
        30
    }

    pub fn idle_secs() -> u64 {
        600
    }

    pub fn acquire_secs() -> u64 {
        8
    }
}

/// How stock-decreasing movements treat a product that does not hold enough units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockPolicy {
    /// Reject the movement and leave stock untouched.
    #[default]
    Enforce,
    /// Apply the movement even if stock goes below zero.
    AllowNegative,
}

impl StockPolicy {
    pub fn enforces_non_negative(self) -> bool {
        matches!(self, StockPolicy::Enforce)
    }
}

/// Everything the ledger service reads at startup.
///
/// Values come from `config/default.toml`, then `config/<RUN_ENV>.toml`, then
/// `APP__*` environment variables, each layer overriding the previous one.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub database_url: String,

    /// HS256 key used to sign and verify bearer tokens.
    #[validate(custom = "check_signing_secret")]
    pub jwt_secret: String,

    #[serde(default = "defaults::jwt_ttl_secs")]
    /// Capped at ten years so token expiry arithmetic cannot overflow.
    #[validate(range(min = 60, max = 315360000))]
    pub jwt_ttl_secs: u64,

    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    /// `development` relaxes CORS and accepts the bundled signing secret.
    pub environment: String,

    #[serde(default = "defaults::log_level")]
    #[validate(custom = "check_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    /// Apply pending schema migrations before accepting traffic.
    #[serde(default)]
    pub auto_migrate: bool,

    #[serde(default)]
    pub stock_policy: StockPolicy,

    /// Listing size when the caller leaves `size` out.
    #[serde(default = "defaults::page_size")]
    #[validate(range(min = 1))]
    pub default_page_size: u64,

    #[serde(default = "defaults::page_size")]
    #[validate(range(min = 1))]
    pub max_page_size: u64,

    /// Comma separated origins allowed to call the API from a browser.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default = "defaults::pool_max")]
    pub db_max_connections: u32,

    #[serde(default = "defaults::pool_min")]
    pub db_min_connections: u32,

    #[serde(default = "defaults::connect_secs")]
    pub db_connect_timeout_secs: u64,

    #[serde(default = "defaults::idle_secs")]
    pub db_idle_timeout_secs: u64,

    #[serde(default = "defaults::acquire_secs")]
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Builds a configuration from the handful of values with no sensible default.
    pub fn new(
        database_url: String,
        jwt_secret: String,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_ttl_secs: defaults::jwt_ttl_secs(),
            host,
            port,
            environment,
            log_level: defaults::log_level(),
            log_json: false,
            auto_migrate: false,
            stock_policy: StockPolicy::default(),
            default_page_size: defaults::page_size(),
            max_page_size: defaults::page_size(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: defaults::pool_max(),
            db_min_connections: defaults::pool_min(),
            db_connect_timeout_secs: defaults::connect_secs(),
            db_idle_timeout_secs: defaults::idle_secs(),
            db_acquire_timeout_secs: defaults::acquire_secs(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case(DEVELOPMENT)
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_deref()
            .is_some_and(|list| list.split(',').map(str::trim).any(|o| !o.is_empty()))
    }

    /// Development builds and an explicit opt-in both get a wildcard CORS policy.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.cors_allow_any_origin || self.is_development()
    }

    /// Rules that span several fields and so cannot live in `#[validate]` attributes.
    fn check_deployment(&self) -> Result<(), ValidationErrors> {
        let mut problems = ValidationErrors::new();

        if !self.has_cors_allowed_origins() && !self.should_allow_permissive_cors() {
            problems.add(
                "cors_allowed_origins",
                rejection(
                    "cors_origins_missing",
                    "outside development list browser origins in APP__CORS_ALLOWED_ORIGINS \
                     or opt in with APP__CORS_ALLOW_ANY_ORIGIN=true",
                ),
            );
        }

        if self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET && !self.is_development() {
            problems.add(
                "jwt_secret",
                rejection(
                    "jwt_secret_is_dev_default",
                    "the development signing secret only works with environment=development",
                ),
            );
        }

        if self.default_page_size > self.max_page_size {
            problems.add(
                "default_page_size",
                rejection(
                    "default_page_size",
                    "default_page_size must not exceed max_page_size",
                ),
            );
        }

        if problems.errors().is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("could not read configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration rejected: {0}")]
    Validation(#[from] ValidationErrors),
}

fn rejection(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn check_log_level(level: &str) -> Result<(), ValidationError> {
    let level = level.to_ascii_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        return Ok(());
    }
    Err(rejection(
        "log_level",
        "log_level must be trace, debug, info, warn or error",
    ))
}

fn check_signing_secret(secret: &str) -> Result<(), ValidationError> {
    let secret = secret.trim();

    if secret.len() < 32 {
        return Err(rejection(
            "jwt_secret",
            "jwt_secret needs at least 32 characters",
        ));
    }
    if PLACEHOLDER_SECRETS
        .iter()
        .any(|placeholder| secret.eq_ignore_ascii_case(placeholder))
    {
        return Err(rejection(
            "jwt_secret",
            "jwt_secret is still a sample value",
        ));
    }
    let mut chars = secret.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return Err(rejection(
                "jwt_secret",
                "jwt_secret is a single repeated character",
            ));
        }
    }
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let directives = match env::var("RUST_LOG") {
        Ok(custom) if !custom.trim().is_empty() => custom,
        _ => format!("inventory_ledger_api={level},tower_http=debug"),
    };

    let builder = fmt().with_env_filter(EnvFilter::new(directives));
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        warn!("tracing subscriber already installed, keeping the existing one");
    }
}

fn run_environment() -> String {
    ["RUN_ENV", "APP_ENV"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEVELOPMENT.to_owned())
}

/// Reads and validates the service configuration for the current `RUN_ENV`.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = run_environment();
    info!(environment = %run_env, "loading ledger configuration");

    if !Path::new(CONFIG_DIR).is_dir() {
        warn!(dir = CONFIG_DIR, "no config directory, using defaults and APP__* variables only");
    }

    let mut builder = Config::builder()
        .set_default("database_url", defaults::DATABASE_URL)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(defaults::PORT))?
        .set_default("environment", DEVELOPMENT)?
        .set_default("log_level", defaults::LOG_LEVEL)?;

    if run_env.eq_ignore_ascii_case(DEVELOPMENT) {
        builder = builder.set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?;
    }

    let layered = builder
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    if layered.get_string("jwt_secret").is_err() {
        error!("no signing secret configured for environment {run_env}");
        return Err(ConfigError::NotFound(
            "jwt_secret (set APP__JWT_SECRET to at least 32 random characters)".into(),
        )
        .into());
    }

    let cfg: AppConfig = layered.try_deserialize()?;
    if let Err(problems) = cfg.validate().and_then(|()| cfg.check_deployment()) {
        error!(?problems, "configuration rejected");
        return Err(problems.into());
    }

    info!(
        environment = %cfg.environment,
        stock_policy = ?cfg.stock_policy,
        "configuration ready"
    );
    Ok(cfg)
}
