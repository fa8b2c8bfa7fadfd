//! services/mod.rs
//! Módulo que agrupa las piezas del despachador de recordatorios.

pub mod clock;
pub mod dispatch_service;
pub mod invoice_selector;
pub mod invoice_store;
pub mod recipient_service;
pub mod reminder_composer;
pub mod reminder_service;
