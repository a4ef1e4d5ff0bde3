pub mod bench;
pub mod search;

use crate::config::AppConfig;
use crate::web::build_web_backend;
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use vana_memory::MemoryStore;
use vana_search::{Availability, MemoryBackend, SearchCoordinator, VectorBackend};
use vana_vector_store::VectorStore;

/// Wire the configured backends into a coordinator.
///
/// A memory or vector backend that is missing from the config or fails to load is passed in
/// as unavailable; only an unbuildable web client is an error.
pub async fn build_coordinator(config: &AppConfig) -> Result<SearchCoordinator> {
    let memory: Availability<dyn MemoryBackend> = match &config.memory.path {
        None => Availability::unavailable("no [memory] path configured"),
        Some(path) => Availability::from_result(
            MemoryStore::load(path)
                .await
                .map(|store| Arc::new(store) as Arc<dyn MemoryBackend>)
                .map_err(|err| format!("{}: {err}", path.display())),
        ),
    };

    let vector: Availability<dyn VectorBackend> = match &config.vector.path {
        None => Availability::unavailable("no [vector] path configured"),
        Some(path) => Availability::from_result(
            VectorStore::load(path, config.vector.dimension)
                .await
                .map(|store| Arc::new(store) as Arc<dyn VectorBackend>)
                .map_err(|err| format!("{}: {err}", path.display())),
        ),
    };

    let web = build_web_backend(&config.web)?;
    Ok(SearchCoordinator::with_config(
        memory,
        vector,
        web,
        config.search.clone(),
    ))
}

/// Write `body` to `out` when given, otherwise print it to stdout.
pub fn emit(body: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, body)?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}
