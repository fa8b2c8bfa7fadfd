//! config/mod.rs
//! Configuración de la app (entorno + política de recordatorios).

pub mod app_config;
pub mod reminder_config;
