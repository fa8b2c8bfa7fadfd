//! tests/mod.rs
//! Pruebas del despachador de recordatorios.

mod support;

mod handler_tests;
