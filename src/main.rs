use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use sqlx::{sqlite::SqliteConnectOptions, Pool, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::config::app_config::{sqlite_parent_dir, AppConfig};
use crate::logger::init_logger;
use crate::services::clock::SystemClock;
use crate::services::dispatch_service::provider_from_config;
use crate::services::invoice_store::SqliteInvoiceStore;
use crate::services::recipient_service::SqliteRecipientDirectory;
use crate::services::reminder_service::ReminderService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    // Crear la carpeta del archivo SQLite (solo si la URL apunta a un archivo)
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("No se pudo crear directorio '{}'", dir.display()))?;
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .context("DATABASE_URL inválido")?
        .create_if_missing(true);

    let db_pool = SqlitePool::connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")?;

    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().context("Configuración inválida")?;

    let db_pool = setup_database(&config.database_url).await?;

    let invoice_store = SqliteInvoiceStore::new(db_pool.clone());
    invoice_store
        .run_migrations()
        .await
        .context("Fallo en migraciones de 'invoices'")?;

    let recipient_directory = SqliteRecipientDirectory::new(db_pool.clone());
    let provider = provider_from_config(&config.provider)?;

    let reminder_service = ReminderService::new(
        &config,
        Arc::new(invoice_store),
        Arc::new(recipient_directory),
        provider,
        Arc::new(SystemClock),
    );

    // Levantar servidor
    log::info!(
        "Levantando servidor en {}:{}",
        config.server_host,
        config.server_port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(reminder_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
