//! services/reminder_service.rs
//! Orquestador de la corrida de recordatorios:
//! selección -> (por factura) destinatario -> composición -> envío -> actualización.
//! Las facturas se procesan una por una; ninguna falla individual aborta la corrida.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::{app_config::AppConfig, reminder_config::ReminderPolicy},
    models::{
        invoice_model::Invoice,
        reminder_model::{InvoiceOutcome, ReminderOutcome, RunSummary},
    },
    services::{
        clock::Clock,
        dispatch_service::{DispatchExecutor, NotificationProvider},
        invoice_selector::InvoiceSelector,
        invoice_store::InvoiceStore,
        recipient_service::{RecipientDirectory, RecipientResolver},
        reminder_composer,
    },
};

#[derive(Clone)]
pub struct ReminderService {
    store: Arc<dyn InvoiceStore>,
    selector: InvoiceSelector,
    resolver: RecipientResolver,
    dispatcher: DispatchExecutor,
    clock: Arc<dyn Clock>,
    policy: ReminderPolicy,
}

impl ReminderService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn InvoiceStore>,
        directory: Arc<dyn RecipientDirectory>,
        provider: Arc<dyn NotificationProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            selector: InvoiceSelector::new(store.clone(), config.policy),
            store,
            resolver: RecipientResolver::new(directory),
            dispatcher: DispatchExecutor::new(provider, config.dispatch_timeout),
            clock,
            policy: config.policy,
        }
    }

    /// Ejecuta una corrida completa. Solo devuelve `Err` si falla la lectura masiva.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let now = self.clock.now();
        log::info!("(run) Iniciando corrida de recordatorios run_id={}", run_id);

        let selection = match self.selector.select(now).await {
            Ok(s) => s,
            Err(e) => {
                log::error!("(run) run_id={} selección fallida: {:?}", run_id, e);
                return Err(e);
            }
        };
        log::info!(
            "(run) run_id={} elegibles={}, descartadas por política={}",
            run_id,
            selection.eligible.len(),
            selection.excluded.len()
        );

        let mut outcomes = selection.excluded;
        for invoice in &selection.eligible {
            let outcome = self.process_invoice(invoice, now).await;
            log::info!(
                "(run) run_id={} factura={} -> {:?}",
                run_id,
                invoice.id,
                outcome
            );
            outcomes.push(InvoiceOutcome {
                invoice_id: invoice.id.clone(),
                outcome,
            });
        }

        let summary = RunSummary::from_outcomes(run_id, outcomes);
        log::info!(
            "(run) run_id={} finalizada: enviados={}, omitidos={}, fallidos={}, sin registrar={}",
            run_id,
            summary.reminders_sent,
            summary.skipped,
            summary.failed,
            summary.unrecorded
        );
        Ok(summary)
    }

    /// Pipeline de una factura ya seleccionada. Siempre produce un resultado.
    pub async fn process_invoice(&self, invoice: &Invoice, now: DateTime<Utc>) -> ReminderOutcome {
        let recipient = match self.resolver.resolve(&invoice.user_id).await {
            Some(r) => r,
            None => return ReminderOutcome::SkippedNoEmail,
        };

        let message = match reminder_composer::compose(invoice, &recipient, now.date_naive()) {
            Ok(m) => m,
            Err(e) => {
                log::error!("(process_invoice) Composición fallida: {}", e);
                return ReminderOutcome::Failed(format!("composition: {}", e));
            }
        };

        if let Err(e) = self.dispatcher.dispatch(&message).await {
            log::error!(
                "(process_invoice) Envío fallido factura={} to={}: {}",
                invoice.id,
                message.to,
                e
            );
            return ReminderOutcome::Failed(format!("dispatch: {}", e));
        }

        // El envío salió; a partir de aquí no se reintenta dentro de la corrida.
        let sent_at = self.clock.now();
        match self
            .store
            .record_reminder_sent(&invoice.id, sent_at, self.policy.max_reminders)
            .await
        {
            Ok(()) => ReminderOutcome::Sent,
            Err(e) => {
                log::error!(
                    "(process_invoice) UNRECORDED REMINDER factura={}: enviado pero reminder_count no avanzó: {:?}",
                    invoice.id,
                    e
                );
                ReminderOutcome::SentUnrecorded(format!("{:#}", e))
            }
        }
    }
}
