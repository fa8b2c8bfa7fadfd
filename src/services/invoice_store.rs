//! services/invoice_store.rs
//! Acceso a la tabla `invoices`: lectura masiva de facturas abiertas (selector)
//! y actualización del estado tras un envío exitoso (state updater).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Pool, Sqlite};

use crate::models::invoice_model::{Invoice, InvoiceRow};

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Todas las facturas abiertas (status normalizado, igual que `InvoiceStatus::from_db`).
    /// Un error aquí aborta la corrida.
    async fn list_open_invoices(&self) -> Result<Vec<Invoice>>;

    /// reminder_sent_at = sent_at, reminder_count += 1, en una sola sentencia.
    /// Falla si la factura no existe o ya alcanzó `max_reminders`.
    async fn record_reminder_sent(
        &self,
        invoice_id: &str,
        sent_at: DateTime<Utc>,
        max_reminders: i64,
    ) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct SqliteInvoiceStore {
    db_pool: Pool<Sqlite>,
}

impl SqliteInvoiceStore {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SqliteInvoiceStore { db_pool }
    }

    /// Corre migraciones con sqlx (invoices + profiles)
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run invoice migrations")?;
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for SqliteInvoiceStore {
    async fn list_open_invoices(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT
                id, user_id, amount_minor, currency, due_date,
                payment_reference, status, reminder_sent_at, reminder_count
            FROM invoices
            WHERE lower(trim(status)) = 'open'
            ORDER BY due_date ASC, id ASC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .context("Failed to read open invoices")?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match Invoice::try_from(row) {
                Ok(inv) => invoices.push(inv),
                // Una fila corrupta no debe tumbar la lectura completa
                Err(e) => log::error!(
                    "(list_open_invoices) Fila de factura inválida id={}, se omite: {:?}",
                    id,
                    e
                ),
            }
        }

        Ok(invoices)
    }

    async fn record_reminder_sent(
        &self,
        invoice_id: &str,
        sent_at: DateTime<Utc>,
        max_reminders: i64,
    ) -> Result<()> {
        let sent_at = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET reminder_sent_at = ?1,
                reminder_count = reminder_count + 1
            WHERE id = ?2
              AND reminder_count < ?3
            "#,
        )
        .bind(&sent_at)
        .bind(invoice_id)
        .bind(max_reminders)
        .execute(&self.db_pool)
        .await
        .context("Failed to update invoice reminder state")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!(
                "Invoice {} not updated: missing or reminder cap already reached",
                invoice_id
            ));
        }

        Ok(())
    }
}
