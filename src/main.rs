use actix_multipart::form::MultipartFormConfig;
use actix_governor::Governor;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod repository;
mod routes;
mod service;
mod storage;
mod utils;

#[cfg(test)]
mod test_support;

use config::{Config, StorageBackend, StoreBackend};
use db::init_db;
use repository::{InMemoryLeaveRepository, LeaveRepository, MySqlLeaveRepository};
use service::leave_request::{LeavePolicy, LeaveService};
use storage::{AzureBlobStorage, DocumentStorage, LocalFileStorage, UploadLedger};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for the text parts sent next to the medical document.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

async fn build_repository(store: &StoreBackend) -> anyhow::Result<Arc<dyn LeaveRepository>> {
    Ok(match store {
        StoreBackend::MySql {
            database_url,
            run_migrations,
        } => {
            let pool = init_db(database_url, *run_migrations).await?;
            Arc::new(MySqlLeaveRepository::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory leave store; data is lost on restart");
            Arc::new(InMemoryLeaveRepository::new())
        }
    })
}

fn build_storage(storage: &StorageBackend) -> Arc<dyn DocumentStorage> {
    match storage {
        StorageBackend::Azure {
            account,
            container,
            sas_token,
        } => Arc::new(AzureBlobStorage::new(
            account.clone(),
            container.clone(),
            sas_token.clone(),
        )),
        StorageBackend::Local {
            root,
            public_base_url,
        } => Arc::new(LocalFileStorage::new(root, public_base_url.clone())),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let repo = build_repository(&config.store).await?;
    let storage = build_storage(&config.storage);

    let (ledger, orphans) = UploadLedger::new(config.orphan_upload_ttl);
    actix_web::rt::spawn(storage::sweep_orphans(
        ledger.clone(),
        orphans,
        storage.clone(),
        config.orphan_sweep_interval,
    ));

    let policy = LeavePolicy {
        medical_document_threshold_days: config.medical_document_threshold_days,
    };
    let service = Data::new(LeaveService::new(repo, storage, ledger, policy));

    let limiter = routes::rate_limiter(config.rate_per_min)?;
    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();
    let max_document_bytes = config.max_document_bytes;

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service.clone())
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_document_bytes + FORM_FIELDS_ALLOWANCE)
                    .memory_limit(max_document_bytes),
            )
            .service(routes::leave_scope(&api_prefix).wrap(Governor::new(&limiter)))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
