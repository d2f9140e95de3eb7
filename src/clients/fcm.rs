use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use gcp_auth::TokenProvider;
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    clients::{PushConnector, PushSender},
    config::Config,
    models::{
        fcm::{FcmMessage, FcmNotification, FcmRequest, FcmResponse, PushMessage},
        retry::RetryConfig,
        validation::validate_fcm_token,
    },
    utils::retry_with_backoff,
};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, Error>;
}

struct GcpTokenSource {
    provider: Arc<dyn TokenProvider>,
}

#[async_trait]
impl AccessTokenSource for GcpTokenSource {
    async fn access_token(&self) -> Result<String, Error> {
        let token = self.provider.token(FCM_SCOPES).await?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed bearer token, for emulators and tests.
pub struct StaticTokenSource(pub String);

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, Error> {
        Ok(self.0.clone())
    }
}

pub struct FcmClient {
    http_client: Client,
    base_url: String,
    fcm_project_id: String,
    retry_config: RetryConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FcmClient {
    pub fn new(
        http_client: Client,
        base_url: &str,
        fcm_project_id: &str,
        retry_config: RetryConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            fcm_project_id: fcm_project_id.to_string(),
            retry_config,
            tokens,
        }
    }

    async fn send_once(&self, request: &FcmRequest) -> Result<(), Error> {
        let token = self.tokens.access_token().await?;

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.fcm_project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let accepted = response.json::<FcmResponse>().await.ok();
            debug!(
                message_name = ?accepted.and_then(|r| r.name),
                "FCM push notification accepted"
            );
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(anyhow!(
                "FCM request failed with status {}: {}",
                status,
                error_text
            ))
        }
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<(), Error> {
        validate_fcm_token(&message.token)
            .map_err(|e| anyhow!("Invalid device token: {}", e))?;

        let request = FcmRequest {
            message: FcmMessage {
                token: message.token.clone(),
                notification: FcmNotification {
                    title: message.title.clone(),
                    body: message.body.clone(),
                },
                data: Some(message.data.clone()),
            },
        };

        retry_with_backoff(&self.retry_config, || self.send_once(&request)).await?;

        info!("FCM push notification sent successfully");
        Ok(())
    }
}

pub struct FcmConnector {
    http_client: Client,
    base_url: String,
    fcm_project_id: String,
    retry_config: RetryConfig,
}

impl FcmConnector {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        Ok(Self {
            http_client,
            base_url: config.fcm_base_url.clone(),
            fcm_project_id: config.fcm_project_id.clone(),
            retry_config: config.retry_config(),
        })
    }
}

#[async_trait]
impl PushConnector for FcmConnector {
    async fn connect(&self) -> Result<Arc<dyn PushSender>, Error> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| anyhow!("Failed to load Google credentials: {}", e))?;

        info!(project_id = %self.fcm_project_id, "FCM client initialized");

        Ok(Arc::new(FcmClient::new(
            self.http_client.clone(),
            &self.base_url,
            &self.fcm_project_id,
            self.retry_config.clone(),
            Arc::new(GcpTokenSource { provider }),
        )))
    }
}
