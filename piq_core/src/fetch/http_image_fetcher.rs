use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::fetch::options::{FetchedBinary, ImageFetchOptions, FETCH_IMAGE};
use crate::pool::handler::TaskHandler;
use crate::types::types::TaskFailure;

/// Fetches image binaries over HTTP from the viewer backend.
///
/// Route: `GET {base}/images/{image id}/{quality code}` — the quality
/// travels as its stable wire code. Only the [`FETCH_IMAGE`] task kind
/// is supported. Cancellation races the request; an aborted fetch
/// reports [`TaskFailure::Aborted`].
pub struct HttpImageFetcher {
    client: Client,
    base_url: String,
}

impl HttpImageFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_nodelay(true)
            .build()
            .expect("failed to build HTTP client");
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn image_url(&self, options: &ImageFetchOptions) -> String {
        format!(
            "{}/images/{}/{}",
            self.base_url,
            options.image_id,
            options.quality.code()
        )
    }
}

#[async_trait]
impl TaskHandler<ImageFetchOptions, FetchedBinary> for HttpImageFetcher {
    async fn handle(
        &self,
        kind: &str,
        options: &ImageFetchOptions,
        cancel: CancellationToken,
    ) -> Result<FetchedBinary, TaskFailure> {
        if kind != FETCH_IMAGE {
            return Err(TaskFailure::UnsupportedKind(kind.to_string()));
        }

        let url = self.image_url(options);
        log::debug!("fetching {} at {} from {}", options.image_id, options.quality, url);

        let request = async {
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(TaskFailure::Http {
                    status: response.status().as_u16(),
                    url: url.clone(),
                });
            }
            let bytes = response.bytes().await?;
            Ok(FetchedBinary {
                image_id: options.image_id.clone(),
                quality: options.quality,
                bytes: bytes.to_vec(),
            })
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(TaskFailure::Aborted),
            outcome = request => outcome,
        }
    }
}
