//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod invoice_model;
pub mod reminder_model;
