// exported modules
pub mod error;
pub mod http;
pub mod model;

// backend impls
pub mod paiza;
pub mod wandbox;

// re-exports
pub use error::*;
pub use model::*;
pub use paiza::{PaizaClient, PaizaConfig};
pub use wandbox::{WandboxClient, WandboxConfig};

use std::sync::Arc;

/// Builds the backend for `kind`. Fails on invalid settings, before any request is sent.
pub fn new_backend(kind: BackendKind, cfg: &BackendConfig) -> Result<Arc<dyn Backend>> {
    use BackendKind::*;
    Ok(match kind {
        Wandbox => Arc::new(WandboxClient::new(cfg.wandbox.clone())?),
        PaizaIo => Arc::new(PaizaClient::new(cfg.paizaio.clone())?),
    })
}

// internal modules
mod util;
