use serde::Serialize;
use uuid::Uuid;

/// Resultado de procesar una factura en una corrida. No se persiste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum ReminderOutcome {
    Sent,
    /// Enviado, pero no se pudo avanzar reminder_count / reminder_sent_at
    SentUnrecorded(String),
    SkippedNoEmail,
    SkippedNotDue,
    SkippedCapReached,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOutcome {
    pub invoice_id: String,
    pub outcome: ReminderOutcome,
}

/// Resumen agregado de una corrida
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub reminders_sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unrecorded: usize,
    pub outcomes: Vec<InvoiceOutcome>,
}

impl RunSummary {
    /// Reduce la lista de resultados por factura al resumen de la corrida.
    pub fn from_outcomes(run_id: Uuid, outcomes: Vec<InvoiceOutcome>) -> Self {
        let mut summary = RunSummary {
            run_id,
            reminders_sent: 0,
            skipped: 0,
            failed: 0,
            unrecorded: 0,
            outcomes: Vec::with_capacity(outcomes.len()),
        };

        for item in outcomes {
            match &item.outcome {
                ReminderOutcome::Sent => summary.reminders_sent += 1,
                ReminderOutcome::SentUnrecorded(_) => {
                    summary.reminders_sent += 1;
                    summary.unrecorded += 1;
                }
                ReminderOutcome::Failed(_) => summary.failed += 1,
                _ => summary.skipped += 1,
            }
            summary.outcomes.push(item);
        }

        summary
    }
}

/// Respuesta del trigger HTTP
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReminderResponse {
    pub success: bool,
    pub reminders_sent: usize,
    #[serde(flatten)]
    pub details: Option<RunDetails>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDetails {
    pub run_id: Uuid,
    pub skipped: usize,
    pub failed: usize,
    pub unrecorded: usize,
    pub outcomes: Vec<InvoiceOutcome>,
}

impl RunReminderResponse {
    pub fn from_summary(summary: RunSummary, with_details: bool) -> Self {
        let reminders_sent = summary.reminders_sent;
        let details = with_details.then(|| RunDetails {
            run_id: summary.run_id,
            skipped: summary.skipped,
            failed: summary.failed,
            unrecorded: summary.unrecorded,
            outcomes: summary.outcomes,
        });
        RunReminderResponse {
            success: true,
            reminders_sent,
            details,
        }
    }
}
