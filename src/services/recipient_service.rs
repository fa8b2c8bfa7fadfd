//! services/recipient_service.rs
//! Resuelve el dueño de una factura a un destinatario con email.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::models::invoice_model::{ContactableRecipient, Recipient};

#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn find_recipient(&self, user_id: &str) -> Result<Option<Recipient>>;
}

#[derive(Clone, Debug)]
pub struct SqliteRecipientDirectory {
    db_pool: Pool<Sqlite>,
}

impl SqliteRecipientDirectory {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SqliteRecipientDirectory { db_pool }
    }
}

#[async_trait]
impl RecipientDirectory for SqliteRecipientDirectory {
    async fn find_recipient(&self, user_id: &str) -> Result<Option<Recipient>> {
        sqlx::query_as::<_, Recipient>(
            r#"SELECT id, email, first_name, last_name FROM profiles WHERE id = ?1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Failed to look up recipient profile")
    }
}

#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn RecipientDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn RecipientDirectory>) -> Self {
        Self { directory }
    }

    /// `None` = no hay a quién escribirle (perfil inexistente, sin email, o error de lookup).
    pub async fn resolve(&self, user_id: &str) -> Option<ContactableRecipient> {
        let recipient = match self.directory.find_recipient(user_id).await {
            Ok(Some(r)) => r,
            Ok(None) => {
                log::warn!("(resolve) No existe perfil para user_id={}", user_id);
                return None;
            }
            Err(e) => {
                log::warn!(
                    "(resolve) Falló el lookup del perfil user_id={}: {:?}",
                    user_id,
                    e
                );
                return None;
            }
        };

        contactable(recipient)
    }
}

fn contactable(recipient: Recipient) -> Option<ContactableRecipient> {
    let email = recipient
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty() && e.contains('@'))?
        .to_string();

    let display_name = [recipient.first_name.as_deref(), recipient.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(ContactableRecipient {
        user_id: recipient.id,
        email,
        display_name,
    })
}
