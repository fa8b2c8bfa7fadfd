//! config/reminder_config.rs
//! Política de selección de facturas para recordatorios.

use serde::{Deserialize, Serialize};

/// Tope absoluto de recordatorios por factura (también lo impone el CHECK de la tabla).
pub const REMINDER_CAP: i64 = 3;

/// Ventana por defecto: vencidas o que vencen en los próximos 7 días.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Política de recordatorios, con valores por defecto
/// (se puede sobreescribir desde el entorno).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    pub max_reminders: i64, // nunca mayor que REMINDER_CAP
    pub window_days: i64,   // días hacia adelante desde hoy (inclusive)
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        ReminderPolicy {
            max_reminders: REMINDER_CAP,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}
