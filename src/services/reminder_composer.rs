//! services/reminder_composer.rs
//! Arma asunto y cuerpo del recordatorio. Sin I/O.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::invoice_model::{ContactableRecipient, Invoice, ReminderMessage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("invoice {0} has no amount")]
    MissingAmount(String),

    #[error("invoice {0} has a negative amount")]
    NegativeAmount(String),

    #[error("invoice {0} has no payment reference")]
    MissingPaymentReference(String),
}

pub fn compose(
    invoice: &Invoice,
    recipient: &ContactableRecipient,
    today: NaiveDate,
) -> Result<ReminderMessage, ComposeError> {
    let amount_minor = invoice
        .amount_minor
        .ok_or_else(|| ComposeError::MissingAmount(invoice.id.clone()))?;
    if amount_minor < 0 {
        return Err(ComposeError::NegativeAmount(invoice.id.clone()));
    }
    let reference = invoice.payment_reference.trim();
    if reference.is_empty() {
        return Err(ComposeError::MissingPaymentReference(invoice.id.clone()));
    }

    let name = if recipient.display_name.is_empty() {
        "customer"
    } else {
        recipient.display_name.as_str()
    };
    let due_phrase = if invoice.due_date < today {
        "was due on"
    } else {
        "is due on"
    };

    let subject = format!("Payment reminder: invoice {}", reference);
    let body = format!(
        "Hello {name},\n\n\
         This is a friendly reminder that invoice {reference} for {amount} {due_phrase} {due}.\n\n\
         Please use the payment reference {reference} when paying.\n\
         If you have already paid, you can ignore this message.\n\n\
         Thank you.",
        name = name,
        reference = reference,
        amount = format_amount(amount_minor, &invoice.currency),
        due_phrase = due_phrase,
        due = invoice.due_date.format("%Y-%m-%d"),
    );

    Ok(ReminderMessage {
        to: recipient.email.clone(),
        subject,
        body,
    })
}

fn format_amount(amount_minor: i64, currency: &str) -> String {
    format!("{}.{:02} {}", amount_minor / 100, amount_minor % 100, currency)
}
