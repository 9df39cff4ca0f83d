use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: Server,
}

/// Parameters for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    /// The interface to bind (e.g., "0.0.0.0").
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// The origin allowed to call the API. When unset, any origin is allowed,
    /// which is what the mobile client expects in development.
    pub cors_origin: Option<String>,
}
