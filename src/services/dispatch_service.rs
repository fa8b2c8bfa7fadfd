//! services/dispatch_service.rs
//! Envío del recordatorio por el proveedor externo (API HTTP o SMTP).
//! Toda falla se devuelve como `DispatchError` y ningún envío espera más
//! que el timeout configurado.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use reqwest::Client;
use thiserror::Error;

use crate::{config::app_config::ProviderConfig, models::invoice_model::ReminderMessage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    async fn send(&self, message: &ReminderMessage) -> Result<(), DispatchError>;
}

/// Construye el proveedor según la configuración
pub fn provider_from_config(
    config: &ProviderConfig,
) -> anyhow::Result<Arc<dyn NotificationProvider>> {
    let provider: Arc<dyn NotificationProvider> = match config {
        ProviderConfig::Http {
            api_url,
            api_key,
            from,
        } => Arc::new(HttpEmailProvider::new(
            api_url.clone(),
            api_key.clone(),
            from.clone(),
        )),
        ProviderConfig::Smtp {
            host,
            port,
            user,
            pass,
            from,
        } => Arc::new(SmtpEmailProvider::new(host, *port, user, pass, from)?),
    };
    Ok(provider)
}

// ========================================================================
// API HTTP transaccional
// ========================================================================

#[derive(Clone)]
pub struct HttpEmailProvider {
    http_client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpEmailProvider {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            http_client: Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl NotificationProvider for HttpEmailProvider {
    async fn send(&self, message: &ReminderMessage) -> Result<(), DispatchError> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": [message.to],
            "subject": message.subject,
            "text": message.body,
        });

        let resp = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = resp.status();
        log::debug!("(HttpEmailProvider::send) status={}", status);
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

// ========================================================================
// SMTP
// ========================================================================

pub struct SmtpEmailProvider {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailProvider {
    pub fn new(host: &str, port: u16, user: &str, pass: &str, from: &str) -> anyhow::Result<Self> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid from address '{}': {}", from, e))?;

        let tls_params = TlsParameters::new(host.to_string())?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .port(port)
            .credentials(Credentials::new(user.to_string(), pass.to_string()))
            .tls(Tls::Required(tls_params))
            .build();

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl NotificationProvider for SmtpEmailProvider {
    async fn send(&self, message: &ReminderMessage) -> Result<(), DispatchError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| DispatchError::InvalidMessage(format!("recipient: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DispatchError::InvalidMessage(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(())
    }
}

// ========================================================================
// Executor con timeout
// ========================================================================

#[derive(Clone)]
pub struct DispatchExecutor {
    provider: Arc<dyn NotificationProvider>,
    timeout: Duration,
}

impl DispatchExecutor {
    pub fn new(provider: Arc<dyn NotificationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn dispatch(&self, message: &ReminderMessage) -> Result<(), DispatchError> {
        match tokio::time::timeout(self.timeout, self.provider.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.timeout)),
        }
    }
}
