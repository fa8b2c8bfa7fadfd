//! config/app_config.rs
//! Configuración leída del entorno (.env) al arrancar. Se construye una sola vez
//! y se pasa explícitamente a los servicios.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::config::reminder_config::{ReminderPolicy, REMINDER_CAP};

const DEFAULT_DATABASE_URL: &str = "sqlite:data/inventory.db";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub provider: ProviderConfig,
    pub dispatch_timeout: Duration,
    pub policy: ReminderPolicy,
}

/// Proveedor externo de notificaciones
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// API HTTP transaccional (estilo Resend)
    Http {
        api_url: String,
        api_key: String,
        from: String,
    },
    Smtp {
        host: String,
        port: u16,
        user: String,
        pass: String,
        from: String,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env` pero con un lookup inyectable (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("No se definió {}", key));

        let server_port = match get("SERVER_PORT") {
            Some(raw) => raw.parse().context("SERVER_PORT inválido")?,
            None => 5022,
        };

        let from = require("EMAIL_FROM")?;
        let provider_kind = get("NOTIFICATION_PROVIDER").unwrap_or_else(|| "http".to_string());
        let provider = match provider_kind.to_lowercase().as_str() {
            "http" => ProviderConfig::Http {
                api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                api_key: require("EMAIL_API_KEY")?,
                from,
            },
            "smtp" => ProviderConfig::Smtp {
                host: require("SMTP_HOST")?,
                port: match get("SMTP_PORT") {
                    Some(raw) => raw.parse().context("SMTP_PORT inválido")?,
                    None => 587,
                },
                user: require("SMTP_USER")?,
                pass: require("SMTP_PASS")?,
                from,
            },
            other => bail!("NOTIFICATION_PROVIDER no soportado: {}", other),
        };

        let timeout_secs = match get("DISPATCH_TIMEOUT_SECS") {
            Some(raw) => raw.parse().context("DISPATCH_TIMEOUT_SECS inválido")?,
            None => DEFAULT_DISPATCH_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("DISPATCH_TIMEOUT_SECS debe ser mayor que 0");
        }

        let mut policy = ReminderPolicy::default();
        if let Some(raw) = get("REMINDER_MAX_COUNT") {
            policy.max_reminders = raw.parse().context("REMINDER_MAX_COUNT inválido")?;
        }
        if let Some(raw) = get("REMINDER_WINDOW_DAYS") {
            policy.window_days = raw.parse().context("REMINDER_WINDOW_DAYS inválido")?;
        }
        if policy.max_reminders < 1 || policy.max_reminders > REMINDER_CAP {
            bail!(
                "REMINDER_MAX_COUNT debe estar entre 1 y {}, se recibió {}",
                REMINDER_CAP,
                policy.max_reminders
            );
        }
        if policy.window_days < 0 {
            bail!("REMINDER_WINDOW_DAYS no puede ser negativo");
        }

        Ok(AppConfig {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            provider,
            dispatch_timeout: Duration::from_secs(timeout_secs),
            policy,
        })
    }
}

/// Carpeta que hay que crear para una URL SQLite de archivo
/// (`sqlite:data/x.db`, `sqlite:///var/lib/x.db`). `None` para bases en memoria
/// o archivos sin carpeta padre.
pub fn sqlite_parent_dir(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, query),
        None => (rest, ""),
    };
    if path.is_empty() || path == ":memory:" || query.split('&').any(|kv| kv == "mode=memory") {
        return None;
    }

    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
