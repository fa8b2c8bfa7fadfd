use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Estado de ciclo de vida de la factura. Solo `Open` es elegible para recordatorios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Open,
    Paid,
    Cancelled,
    Other(String),
}

impl InvoiceStatus {
    pub fn from_db(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "open" => InvoiceStatus::Open,
            "paid" => InvoiceStatus::Paid,
            "cancelled" | "canceled" | "void" => InvoiceStatus::Cancelled,
            other => InvoiceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
            InvoiceStatus::Other(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub user_id: String,
    pub amount_minor: Option<i64>, // en centavos; None = dato corrupto
    pub currency: String,
    pub due_date: NaiveDate,
    pub payment_reference: String,
    pub status: InvoiceStatus,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub reminder_count: i64,
}

/// Fila tal como vive en SQLite (fechas como TEXT)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: String,
    pub user_id: String,
    pub amount_minor: Option<i64>,
    pub currency: String,
    pub due_date: String,
    pub payment_reference: String,
    pub status: String,
    pub reminder_sent_at: Option<String>,
    pub reminder_count: i64,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = anyhow::Error;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let due_date = NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("due_date inválido '{}': {}", row.due_date, e))?;
        let reminder_sent_at = match row.reminder_sent_at {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| anyhow::anyhow!("reminder_sent_at inválido '{}': {}", raw, e))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Invoice {
            id: row.id,
            user_id: row.user_id,
            amount_minor: row.amount_minor,
            currency: row.currency,
            due_date,
            payment_reference: row.payment_reference,
            status: InvoiceStatus::from_db(&row.status),
            reminder_sent_at,
            reminder_count: row.reminder_count,
        })
    }
}

/// Perfil del dueño de la factura
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipient {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Destinatario ya validado: siempre tiene email
#[derive(Debug, Clone, PartialEq)]
pub struct ContactableRecipient {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

/// Mensaje listo para el proveedor externo
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}
