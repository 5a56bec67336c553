use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{ProgressSink, ServiceResponse, TransformServicePort};
use crate::error::Result;
use crate::types::{Photo, StyleDescriptor};

/// JSON body returned by the transform service
#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "resultUrl")]
    result_url: Option<String>,
    #[serde(default, rename = "aiSelectedArtist")]
    ai_selected_artist: Option<String>,
    #[serde(default)]
    selected_work: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl From<WireResponse> for ServiceResponse {
    fn from(wire: WireResponse) -> Self {
        ServiceResponse {
            success: wire.success,
            result_artifact: wire.result_url,
            attributed_artist: wire.ai_selected_artist,
            attributed_work: wire.selected_work,
            error_message: wire.error,
        }
    }
}

/// POSTs the raw photo to the configured endpoint, one request per job
pub struct HttpTransformService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransformService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn query_params(style: &StyleDescriptor) -> Vec<(String, String)> {
    let mut params = vec![
        ("style_id".to_string(), style.id.clone()),
        ("name".to_string(), style.name.clone()),
        ("category".to_string(), style.category.as_str().to_string()),
    ];
    params.extend(style.params.iter().map(|(k, v)| (k.clone(), v.clone())));
    params
}

fn content_type_for(photo: &Photo) -> &'static str {
    let extension = photo
        .file_name
        .as_deref()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl TransformServicePort for HttpTransformService {
    async fn request_transform(
        &self,
        photo: &Photo,
        style: &StyleDescriptor,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<ServiceResponse> {
        progress.report(&format!("Uploading photo ({} bytes)", photo.len()));
        debug!("POST {} style={}", self.endpoint, style.id);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&query_params(style))
            .header(CONTENT_TYPE, content_type_for(photo))
            .body(photo.bytes().to_vec())
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = response.status();
        progress.report("Receiving result");
        let body = response.text().await.context("reading response body")?;

        if !status.is_success() {
            // 4xx/5xx bodies may still carry the JSON error shape.
            if let Ok(wire) = serde_json::from_str::<WireResponse>(&body) {
                if wire.error.is_some() {
                    return Ok(ServiceResponse::from(wire));
                }
            }
            bail!("transform service returned HTTP {}", status);
        }

        let wire: WireResponse =
            serde_json::from_str(&body).context("decoding transform service response")?;
        Ok(wire.into())
    }
}
