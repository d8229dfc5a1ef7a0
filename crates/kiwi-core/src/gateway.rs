use anyhow::{anyhow, Result};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::AppId;
use crate::flow::{Action, Effect};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Deserialize)]
struct AppsResponse {
    apps: Vec<AppId>,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    message: &'a str,
}

/// Options the gateway derived from a free-text message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub message: String,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployResponse {
    pub message: String,
}

/// Client for the deployment gateway's four endpoints
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_apps(&self) -> Result<Vec<AppId>> {
        let url = self.url(&["apps"])?;

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response, "list apps").await?;

        let apps_response: AppsResponse = response.json().await?;
        Ok(apps_response.apps)
    }

    pub async fn fetch_template(&self, app: &AppId) -> Result<Value> {
        let url = self.url(&["apps", app.as_str(), "template"])?;

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response, "fetch template").await?;

        Ok(response.json().await?)
    }

    pub async fn detect_options(&self, app: &AppId, message: &str) -> Result<DetectResponse> {
        // The gateway spells this route "detact"
        let url = self.url(&["apps", app.as_str(), "detact"])?;

        let response = self
            .client
            .post(url)
            .json(&DetectRequest { message })
            .send()
            .await?;
        let response = ensure_success(response, "detect options").await?;

        Ok(response.json().await?)
    }

    pub async fn deploy(&self, app: &AppId, options: &Value) -> Result<DeployResponse> {
        let url = self.url(&["apps", app.as_str(), "deploy"])?;

        let response = self.client.post(url).json(options).send().await?;
        let response = ensure_success(response, "deploy").await?;

        Ok(response.json().await?)
    }

    /// Perform one reducer effect and report its outcome as an action
    ///
    /// Errors never escape: they become the matching failure action, carrying
    /// the error text for the log.
    pub async fn perform(&self, effect: Effect) -> Action {
        match effect {
            Effect::FetchApps => match self.list_apps().await {
                Ok(apps) => Action::AppsLoaded(apps),
                Err(e) => Action::AppsFailed(format!("{:#}", e)),
            },
            Effect::FetchTemplate(app) => match self.fetch_template(&app).await {
                Ok(template) => Action::TemplateLoaded { app, template },
                Err(e) => Action::TemplateFailed {
                    app,
                    error: format!("{:#}", e),
                },
            },
            Effect::DetectOptions { app, message } => {
                match self.detect_options(&app, &message).await {
                    Ok(response) => Action::OptionsDetected { app, response },
                    Err(e) => Action::DetectFailed {
                        app,
                        error: format!("{:#}", e),
                    },
                }
            }
            Effect::Deploy { app, options } => match self.deploy(&app, &options).await {
                Ok(response) => Action::Deployed {
                    app,
                    options,
                    response,
                },
                Err(e) => Action::DeployFailed {
                    app,
                    error: format!("{:#}", e),
                },
            },
        }
    }

    /// Build `{base}/seg/seg/...`, encoding each segment on its own
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| anyhow!("Invalid gateway URL {}: {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Gateway URL {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn ensure_success(response: Response, what: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(anyhow!("Gateway {} failed with status {}: {}", what, status, text))
}
