//! Sends a flattened prompt to a backend and returns the generated text.
//!
//! Local models are reached through the Ollama `/api/generate` endpoint with
//! streaming disabled. The cloud backend is an Azure OpenAI chat-completion
//! deployment whose endpoint and key come from the environment; when either is
//! missing the call fails before anything touches the network.

use async_trait::async_trait;
use std::fmt;
use tracing::debug;

use crate::api::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerateRequest, GenerateResponse,
};
use crate::core::backend::Backend;
use crate::core::config::{CloudCredentials, CloudSettings, Config};
use crate::utils::url::construct_api_url;

#[derive(Debug)]
pub enum InvokeError {
    /// Cloud credentials are absent; no request was attempted.
    ConfigurationMissing,
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The request never produced a response (connection refused, etc.).
    Transport(reqwest::Error),
    /// A success response whose body did not carry generated text.
    Decode(String),
}

impl InvokeError {
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, InvokeError::ConfigurationMissing)
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::ConfigurationMissing => {
                write!(f, "Azure OpenAI credentials are not set.")
            }
            InvokeError::Status { status, body } => write!(f, "Error: {status} {body}"),
            InvokeError::Transport(err) => write!(f, "Error: {err}"),
            InvokeError::Decode(detail) => write!(f, "Error: unexpected response: {detail}"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        InvokeError::Transport(err)
    }
}

#[async_trait]
pub trait BackendInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str, backend: &Backend) -> Result<String, InvokeError>;
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, InvokeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(status = status.as_u16(), error = %err, "Failed to read error response body");
            String::new()
        }
    };
    Err(InvokeError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, InvokeError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|err| InvokeError::Decode(err.to_string()))
}

/// Client for the local Ollama runtime.
#[derive(Clone)]
pub struct LocalRuntimeClient {
    client: reqwest::Client,
    base_url: String,
}

impl LocalRuntimeClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, InvokeError> {
        let url = construct_api_url(&self.base_url, "api/generate");
        debug!(%url, model, prompt_len = prompt.len(), "Sending local generate request");

        let response = self
            .client
            .post(url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        let response = error_for_status(response).await?;
        let generated: GenerateResponse = decode_json(response).await?;
        Ok(generated.response)
    }
}

/// Client for an Azure OpenAI chat-completion deployment.
#[derive(Clone)]
pub struct CloudClient {
    client: reqwest::Client,
    credentials: CloudCredentials,
    settings: CloudSettings,
}

impl CloudClient {
    pub fn new(
        client: reqwest::Client,
        credentials: CloudCredentials,
        settings: CloudSettings,
    ) -> Self {
        Self {
            client,
            credentials,
            settings,
        }
    }

    fn completions_url(&self) -> String {
        let path = format!(
            "openai/deployments/{}/chat/completions?api-version={}",
            self.settings.deployment, self.settings.api_version
        );
        construct_api_url(&self.credentials.endpoint, &path)
    }

    /// Sends `prompt` as a single user message and returns the reply content.
    pub async fn complete(&self, prompt: &str) -> Result<String, InvokeError> {
        let url = self.completions_url();
        debug!(
            deployment = %self.settings.deployment,
            prompt_len = prompt.len(),
            "Sending cloud chat completion"
        );

        let response = self
            .client
            .post(url)
            .header("api-key", &self.credentials.api_key)
            .json(&ChatCompletionRequest {
                messages: vec![ChatMessage::user(prompt)],
            })
            .send()
            .await?;

        let response = error_for_status(response).await?;
        let completion: ChatCompletionResponse = decode_json(response).await?;
        completion
            .into_content()
            .ok_or_else(|| InvokeError::Decode("no choices in completion".to_string()))
    }
}

/// Production invoker dispatching over HTTP.
pub struct HttpInvoker {
    local: LocalRuntimeClient,
    cloud: Option<CloudClient>,
}

impl HttpInvoker {
    pub fn new(local: LocalRuntimeClient, cloud: Option<CloudClient>) -> Self {
        Self { local, cloud }
    }

    /// Builds both clients from config; cloud credentials come from the environment.
    pub fn from_config(config: &Config) -> Self {
        Self::with_credentials(config, CloudCredentials::from_env())
    }

    pub fn with_credentials(config: &Config, credentials: Option<CloudCredentials>) -> Self {
        let client = reqwest::Client::new();
        let cloud = match credentials {
            Some(credentials) => Some(CloudClient::new(
                client.clone(),
                credentials,
                config.cloud.clone(),
            )),
            None => {
                debug!("Azure OpenAI credentials are not set; cloud backend disabled");
                None
            }
        };
        Self {
            local: LocalRuntimeClient::new(client, config.local_url.clone()),
            cloud,
        }
    }

    pub fn has_cloud(&self) -> bool {
        self.cloud.is_some()
    }
}

#[async_trait]
impl BackendInvoker for HttpInvoker {
    async fn invoke(&self, prompt: &str, backend: &Backend) -> Result<String, InvokeError> {
        match backend {
            Backend::Cloud => match &self.cloud {
                Some(cloud) => cloud.complete(prompt).await,
                None => Err(InvokeError::ConfigurationMissing),
            },
            Backend::Local { model } => self.local.generate(model, prompt).await,
        }
    }
}
