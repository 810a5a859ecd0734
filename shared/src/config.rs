use std::env;

use gallery_atoms::media::IMAGES_COLLECTION;

const DEFAULT_TABLE_NAME: &str = "gallery";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DYNAMODB_ENDPOINT must be an http(s) URL, got {0:?}")]
    InvalidEndpoint(String),
}

/// Where image metadata lives. Credentials are not part of this; they come
/// from the AWS default provider chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub table_name: String,
    pub collection: String,
    /// Override for DynamoDB Local and similar.
    pub dynamodb_endpoint: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            collection: IMAGES_COLLECTION.to_string(),
            dynamodb_endpoint: None,
        }
    }
}

impl GatewayConfig {
    /// Read `TABLE_NAME`, `IMAGES_COLLECTION` and `DYNAMODB_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with a custom variable source.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let dynamodb_endpoint = var("DYNAMODB_ENDPOINT");
        if let Some(endpoint) = &dynamodb_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint(endpoint.clone()));
            }
        }

        Ok(Self {
            table_name: var("TABLE_NAME").unwrap_or(defaults.table_name),
            collection: var("IMAGES_COLLECTION").unwrap_or(defaults.collection),
            dynamodb_endpoint,
        })
    }
}
