//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration (listen address, upload storage).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen: SocketAddr,
    /// Directory uploaded files are written to and served from.
    pub uploads_dir: PathBuf,
}
