//! services/invoice_selector.rs
//! Lectura masiva + política de elegibilidad (tope y ventana de vencimiento).
//! La política es una función pura para poder probar los bordes de fecha aislados.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    config::reminder_config::ReminderPolicy,
    models::{
        invoice_model::{Invoice, InvoiceStatus},
        reminder_model::{InvoiceOutcome, ReminderOutcome},
    },
    services::invoice_store::InvoiceStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    NotOpen,
    CapReached,
    NotDue,
}

/// Evalúa una factura contra la política para la fecha `today` (UTC).
///
/// Vence en `d = due_date - today` días: `d <= window_days` es elegible
/// (incluye hoy y vencidas), `d > window_days` queda fuera.
pub fn evaluate(invoice: &Invoice, today: NaiveDate, policy: &ReminderPolicy) -> Eligibility {
    if invoice.status != InvoiceStatus::Open {
        return Eligibility::NotOpen;
    }
    if invoice.reminder_count >= policy.max_reminders {
        return Eligibility::CapReached;
    }
    let days_until_due = (invoice.due_date - today).num_days();
    if days_until_due > policy.window_days {
        return Eligibility::NotDue;
    }
    Eligibility::Eligible
}

/// Resultado de la selección: las elegibles y las descartadas por política.
#[derive(Debug, Default)]
pub struct Selection {
    pub eligible: Vec<Invoice>,
    pub excluded: Vec<InvoiceOutcome>,
}

#[derive(Clone)]
pub struct InvoiceSelector {
    store: Arc<dyn InvoiceStore>,
    policy: ReminderPolicy,
}

impl InvoiceSelector {
    pub fn new(store: Arc<dyn InvoiceStore>, policy: ReminderPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn select(&self, now: DateTime<Utc>) -> Result<Selection> {
        let invoices = self
            .store
            .list_open_invoices()
            .await
            .context("Bulk invoice read failed")?;

        Ok(partition(invoices, now.date_naive(), &self.policy))
    }
}

pub fn partition(invoices: Vec<Invoice>, today: NaiveDate, policy: &ReminderPolicy) -> Selection {
    let mut selection = Selection::default();

    for invoice in invoices {
        let outcome = match evaluate(&invoice, today, policy) {
            Eligibility::Eligible => {
                selection.eligible.push(invoice);
                continue;
            }
            Eligibility::NotOpen => {
                log::debug!(
                    "(partition) Factura {} con status '{}' ignorada",
                    invoice.id,
                    invoice.status.as_str()
                );
                continue;
            }
            Eligibility::CapReached => ReminderOutcome::SkippedCapReached,
            Eligibility::NotDue => ReminderOutcome::SkippedNotDue,
        };
        selection.excluded.push(InvoiceOutcome {
            invoice_id: invoice.id,
            outcome,
        });
    }

    selection
}
