use std::sync::Arc;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use gallery_atoms::media::MetadataGateway;
use gallery_atoms::store::DynamoDocumentStore;

use crate::config::{ConfigError, GatewayConfig};

/// Clients built once per process and shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub config: GatewayConfig,
}

impl AppState {
    /// Load configuration and AWS credentials from the environment.
    pub async fn from_env() -> Result<Self, ConfigError> {
        let config = GatewayConfig::from_env()?;
        let sdk_config = aws_config::load_from_env().await;
        Ok(Self::new(&sdk_config, config))
    }

    pub fn new(sdk_config: &SdkConfig, config: GatewayConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            tracing::info!("🔧 using DynamoDB endpoint override: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            "🚀 gallery state ready: table={}, collection={}",
            config.table_name,
            config.collection
        );

        Self {
            dynamo_client: DynamoClient::from_conf(builder.build()),
            config,
        }
    }

    /// Gateway sharing this state's DynamoDB client.
    pub fn gateway(&self) -> MetadataGateway {
        let store = DynamoDocumentStore::new(self.dynamo_client.clone(), &self.config.table_name);
        MetadataGateway::new(Arc::new(store), &self.config.collection)
    }
}
