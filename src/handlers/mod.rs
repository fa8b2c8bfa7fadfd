//! handlers/mod.rs
pub mod reminder_handler;
