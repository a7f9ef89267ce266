use std::path::PathBuf;

/// Runtime configuration, read from the environment (a `.env` file is
/// loaded by `main` before this runs).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// When absent the server runs on the in-memory store (dev mode).
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });
        let database_url = std::env::var("DATABASE_URL").ok();
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        Self {
            bind_addr,
            jwt_secret,
            database_url,
            upload_dir,
        }
    }
}
