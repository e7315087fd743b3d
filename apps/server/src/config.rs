use anyhow::Context;
use encargos_erp::ErpConfig;

/// Server configuration resolved from the environment.
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    pub erp: ErpConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr =
            std::env::var("ENCARGOS_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        let db_path =
            std::env::var("ENCARGOS_DB_PATH").unwrap_or_else(|_| "data/encargos.db".to_string());

        let erp = ErpConfig {
            base_url: std::env::var("CONEXOS_BASE_URL")
                .context("CONEXOS_BASE_URL must be set")?,
            username: std::env::var("CONEXOS_USERNAME")
                .context("CONEXOS_USERNAME must be set")?,
            password: std::env::var("CONEXOS_PASSWORD")
                .context("CONEXOS_PASSWORD must be set")?,
            branch_code: std::env::var("CONEXOS_BRANCH").unwrap_or_else(|_| "2".to_string()),
            user_code: std::env::var("CONEXOS_USER_CODE").unwrap_or_else(|_| "97".to_string()),
        };

        Ok(Self {
            listen_addr,
            db_path,
            erp,
        })
    }
}
