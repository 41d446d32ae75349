//! START Clinic Core - Backup Runner
//!
//! Maintenance entry point: pulls every collection from the hosted store
//! and writes both backup artifacts to the working directory. The desktop
//! UI binds to the library's `api::commands` instead of this binary.

use start_clinic_core::constants;
use start_clinic_core::logic::backup::{self, ExportFormat};
use start_clinic_core::logic::records::{RecordStoreClient, StoreConfig};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!(
        "{} v{} - backup runner",
        constants::APP_NAME,
        constants::APP_VERSION
    );
    log::info!("   Server: {}", constants::get_api_url());

    let client = RecordStoreClient::new(StoreConfig::default());

    for format in [ExportFormat::Json, ExportFormat::Csv] {
        match backup::export(&client, format).await {
            Ok(file) => {
                if let Err(e) = std::fs::write(&file.filename, file.contents.as_bytes()) {
                    log::error!("Failed to write {}: {}", file.filename, e);
                    std::process::exit(1);
                }
                log::info!("Wrote {}", file.filename);
            }
            Err(e) => {
                log::error!("Backup failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
