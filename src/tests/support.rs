//! tests/support.rs
//! Dobles de prueba: reloj fijo, store/directorio en memoria, proveedor que graba envíos.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

use crate::config::app_config::{AppConfig, ProviderConfig};
use crate::config::reminder_config::ReminderPolicy;
use crate::models::invoice_model::{Invoice, InvoiceStatus, Recipient, ReminderMessage};
use crate::services::clock::Clock;
use crate::services::dispatch_service::{DispatchError, NotificationProvider};
use crate::services::invoice_store::InvoiceStore;
use crate::services::recipient_service::RecipientDirectory;
use crate::services::reminder_service::ReminderService;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

/// Fecha relativa a `today()` (negativo = en el pasado)
pub fn days_from_today(offset: i64) -> NaiveDate {
    if offset >= 0 {
        today().checked_add_days(Days::new(offset as u64)).unwrap()
    } else {
        today().checked_sub_days(Days::new(offset.unsigned_abs())).unwrap()
    }
}

pub fn invoice(id: &str, user_id: &str, due_in_days: i64, reminder_count: i64) -> Invoice {
    Invoice {
        id: id.to_string(),
        user_id: user_id.to_string(),
        amount_minor: Some(12_550),
        currency: "USD".to_string(),
        due_date: days_from_today(due_in_days),
        payment_reference: format!("REF-{}", id),
        status: InvoiceStatus::Open,
        reminder_sent_at: None,
        reminder_count,
    }
}

pub fn recipient(id: &str, email: Option<&str>) -> Recipient {
    Recipient {
        id: id.to_string(),
        email: email.map(str::to_string),
        first_name: Some("Ana".to_string()),
        last_name: Some("Pérez".to_string()),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        provider: ProviderConfig::Http {
            api_url: "http://localhost/emails".to_string(),
            api_key: "test-key".to_string(),
            from: "billing@example.com".to_string(),
        },
        dispatch_timeout: Duration::from_millis(200),
        policy: ReminderPolicy::default(),
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ------------------------------------------------------------------
// Store en memoria
// ------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryInvoiceStore {
    pub invoices: Mutex<Vec<Invoice>>,
    pub fail_reads: bool,
    pub fail_updates: bool,
}

impl MemoryInvoiceStore {
    pub fn with(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices: Mutex::new(invoices),
            ..Default::default()
        }
    }

    pub fn get(&self, id: &str) -> Invoice {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|inv| inv.id == id)
            .cloned()
            .expect("invoice not in store")
    }
}

#[async_trait]
impl InvoiceStore for MemoryInvoiceStore {
    async fn list_open_invoices(&self) -> Result<Vec<Invoice>> {
        if self.fail_reads {
            return Err(anyhow!("connection refused"));
        }
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Open)
            .cloned()
            .collect())
    }

    async fn record_reminder_sent(
        &self,
        invoice_id: &str,
        sent_at: DateTime<Utc>,
        max_reminders: i64,
    ) -> Result<()> {
        if self.fail_updates {
            return Err(anyhow!("write timeout"));
        }
        let mut invoices = self.invoices.lock().unwrap();
        let inv = invoices
            .iter_mut()
            .find(|inv| inv.id == invoice_id && inv.reminder_count < max_reminders)
            .ok_or_else(|| anyhow!("invoice {} not updated", invoice_id))?;
        inv.reminder_count += 1;
        inv.reminder_sent_at = Some(sent_at);
        Ok(())
    }
}

// ------------------------------------------------------------------
// Directorio en memoria
// ------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryDirectory {
    pub recipients: HashMap<String, Recipient>,
    pub failing_ids: HashSet<String>,
}

impl MemoryDirectory {
    pub fn with(recipients: Vec<Recipient>) -> Self {
        Self {
            recipients: recipients.into_iter().map(|r| (r.id.clone(), r)).collect(),
            failing_ids: HashSet::new(),
        }
    }
}

#[async_trait]
impl RecipientDirectory for MemoryDirectory {
    async fn find_recipient(&self, user_id: &str) -> Result<Option<Recipient>> {
        if self.failing_ids.contains(user_id) {
            return Err(anyhow!("profiles lookup failed"));
        }
        Ok(self.recipients.get(user_id).cloned())
    }
}

// ------------------------------------------------------------------
// Proveedor que graba lo enviado
// ------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingProvider {
    pub sent: Mutex<Vec<ReminderMessage>>,
    pub attempts: Mutex<usize>,
    pub reject_emails: HashSet<String>,
    pub delay: Option<Duration>,
}

impl RecordingProvider {
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl NotificationProvider for RecordingProvider {
    async fn send(&self, message: &ReminderMessage) -> Result<(), DispatchError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_emails.contains(&message.to) {
            return Err(DispatchError::Rejected {
                status: 422,
                body: "invalid recipient".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn service(
    store: Arc<MemoryInvoiceStore>,
    directory: MemoryDirectory,
    provider: Arc<RecordingProvider>,
) -> ReminderService {
    ReminderService::new(
        &test_config(),
        store,
        Arc::new(directory),
        provider,
        Arc::new(FixedClock(now())),
    )
}
