use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid server address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

/// Convert a dotted settings path ("provider.api_key") into the environment
/// variable that supplies it ("VOYAGER_PROVIDER__API_KEY").
pub fn to_env_var(field_path: &str) -> String {
    let upper = field_path.replace('.', "__").to_uppercase();
    format!("VOYAGER_{}", upper)
}
