use async_trait::async_trait;

use crate::types::{Photo, StyleDescriptor};

/// What the transform service reported for one request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceResponse {
    pub success: bool,
    pub result_artifact: Option<String>,
    pub attributed_artist: Option<String>,
    pub attributed_work: Option<String>,
    pub error_message: Option<String>,
}

impl ServiceResponse {
    pub fn succeeded(artifact: impl Into<String>) -> Self {
        Self {
            success: true,
            result_artifact: Some(artifact.into()),
            ..Self::default()
        }
    }

    pub fn with_attribution(mut self, artist: Option<&str>, work: Option<&str>) -> Self {
        self.attributed_artist = artist.map(str::to_string);
        self.attributed_work = work.map(str::to_string);
        self
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Receives human-readable progress lines while a job runs
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

// Transform-side ports
#[async_trait]
pub trait TransformServicePort: Send + Sync {
    /// One request to the external service. `Err` is a transport or
    /// protocol fault; a service-reported failure is `Ok` with
    /// `success == false`.
    async fn request_transform(
        &self,
        photo: &Photo,
        style: &StyleDescriptor,
        progress: &dyn ProgressSink,
    ) -> anyhow::Result<ServiceResponse>;
}

// Output ports
#[async_trait]
pub trait GalleryPort: Send + Sync {
    /// Fire-and-forget save; `false` means the artifact was not stored.
    async fn save_artifact(&self, artifact_ref: &str, label: &str, category_label: &str) -> bool;
}
