use crate::error::{BadEnvVarSnafu, InvalidEnvVarSnafu, ParseEnvVarSnafu, RollcallResult};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, path::PathBuf, str::FromStr, sync::Arc};

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    upload_config: Arc<UploadConfig>,
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RollcallResult<Self> {
        Ok(Self::from_parts(
            DbConfig::new()?,
            UploadConfig::new()?,
            ServerConfig::new()?,
        ))
    }

    pub fn from_parts(db: DbConfig, uploads: UploadConfig, server: ServerConfig) -> Self {
        Self {
            db_config: Arc::new(db),
            upload_config: Arc::new(uploads),
            server_config: Arc::new(server),
        }
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn upload_config(&self) -> Arc<UploadConfig> {
        self.upload_config.clone()
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

/// Reads `name`, falling back to `default` only when the variable is unset.
fn env_or<T: FromStr>(name: &'static str, default: T) -> RollcallResult<T> {
    match var(name) {
        Ok(value) => match value.parse() {
            Ok(parsed) => Ok(parsed),
            Err(_) => ParseEnvVarSnafu { name, value }.fail(),
        },
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(default),
        Err(source) => Err(source).context(BadEnvVarSnafu { name }),
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new() -> RollcallResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            path: env_or("ROLLCALL_DB_PATH", defaults.path)?,
            max_connections: env_or("ROLLCALL_DB_MAX_CONNECTIONS", defaults.max_connections)?,
        })
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("students.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub directory: PathBuf,
    pub max_body_bytes: usize,
}

impl UploadConfig {
    pub fn new() -> RollcallResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            directory: env_or("ROLLCALL_UPLOAD_DIR", defaults.directory)?,
            max_body_bytes: env_or("ROLLCALL_MAX_UPLOAD_BYTES", defaults.max_body_bytes)?,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_ip: String,
    pub page_size: i64,
    pub flash_ttl_secs: i64,
    pub session_inactivity_secs: i64,
    pub secure_cookies: bool,
}

/// Upper bound for `ROLLCALL_SESSION_INACTIVITY_SECS`, a year.
pub const MAX_SESSION_INACTIVITY_SECS: i64 = 366 * 24 * 60 * 60;

impl ServerConfig {
    pub fn new() -> RollcallResult<Self> {
        let defaults = Self::default();
        Self {
            server_ip: env_or("ROLLCALL_SERVER_IP", defaults.server_ip)?,
            page_size: env_or("ROLLCALL_PAGE_SIZE", defaults.page_size)?,
            flash_ttl_secs: env_or("ROLLCALL_FLASH_TTL_SECS", defaults.flash_ttl_secs)?,
            session_inactivity_secs: env_or(
                "ROLLCALL_SESSION_INACTIVITY_SECS",
                defaults.session_inactivity_secs,
            )?,
            secure_cookies: env_or("ROLLCALL_SECURE_COOKIES", defaults.secure_cookies)?,
        }
        .validated()
    }

    /// Range-checks the numeric settings. The flash TTL may not exceed the session timeout.
    pub fn validated(self) -> RollcallResult<Self> {
        snafu::ensure!(
            self.page_size > 0,
            InvalidEnvVarSnafu {
                name: "ROLLCALL_PAGE_SIZE",
                value: self.page_size,
                expected: "must be at least 1",
            }
        );
        snafu::ensure!(
            (1..=MAX_SESSION_INACTIVITY_SECS).contains(&self.session_inactivity_secs),
            InvalidEnvVarSnafu {
                name: "ROLLCALL_SESSION_INACTIVITY_SECS",
                value: self.session_inactivity_secs,
                expected: "must be between 1 and a year",
            }
        );
        snafu::ensure!(
            (1..=self.session_inactivity_secs).contains(&self.flash_ttl_secs),
            InvalidEnvVarSnafu {
                name: "ROLLCALL_FLASH_TTL_SECS",
                value: self.flash_ttl_secs,
                expected: "must be between 1 and the session inactivity timeout",
            }
        );

        Ok(self)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_ip: "127.0.0.1:3000".to_string(),
            page_size: 3,
            flash_ttl_secs: 30,
            session_inactivity_secs: 60 * 60,
            secure_cookies: false,
        }
    }
}
