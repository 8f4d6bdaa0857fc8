use futures::future::BoxFuture;

use crate::errors::StoreError;

pub mod mock;

/// Proof of a completed upload.
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    /// The identifier of the remote file, when the endpoint reports one.
    pub file_id: Option<String>,
}

pub trait Store: Send + Sync {
    /// The type of successful result.
    type Output;

    /// Saves the given CSV text under the given filename, replacing any
    /// previous remote copy.
    fn save(&self, filename: String, csv: String) -> BoxFuture<Result<Self::Output, StoreError>>;
}

pub use self::apps_script::*;

mod apps_script {
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use futures::FutureExt;
    use log::{debug, Logger};
    use reqwest::Client;
    use serde::{Deserialize, Serialize};

    use super::UploadReceipt;
    use crate::errors::StoreError;

    /// Fragment of the stock placeholder endpoint values. A URL still
    /// carrying it has never been configured.
    const PLACEHOLDER_FRAGMENT: &str = "YOUR_GOOGLE";

    /// The Apps Script web app only answers simple requests; a JSON
    /// content-type would force a preflight it cannot serve. Part of the wire
    /// contract, not a tunable.
    const UPLOAD_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct UploadRequest<'a> {
        action: &'static str,
        folder_id: &'a str,
        filename: &'a str,
        csv_content: &'a str,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct UploadResponse {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        file_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    /// A store that delivers CSV snapshots to a Google Apps Script web app
    /// acting as a Drive-upload proxy.
    pub struct AppsScriptStore {
        client: Client,
        logger: Arc<Logger>,
        url: String,
        folder_id: String,
    }

    impl AppsScriptStore {
        /// Creates a new instance.
        pub fn new(logger: Arc<Logger>, url: String, folder_id: String) -> Self {
            Self {
                client: Client::new(),
                logger,
                url,
                folder_id,
            }
        }

        pub fn from_env(logger: Arc<Logger>) -> Self {
            use crate::config::get_variable;

            Self::new(
                logger,
                get_variable("BACKEND_APPS_SCRIPT_URL"),
                get_variable("BACKEND_DRIVE_FOLDER_ID"),
            )
        }

        /// Fails fast, before any request, on an unusable configuration or
        /// payload.
        fn check_preconditions(&self, csv: &str) -> Result<(), StoreError> {
            if self.url.is_empty() || self.url.contains(PLACEHOLDER_FRAGMENT) {
                return Err(StoreError::NotConfigured);
            }

            if csv.trim().is_empty() {
                return Err(StoreError::EmptyContent);
            }

            if self.folder_id.is_empty() {
                return Err(StoreError::MissingFolder);
            }

            Ok(())
        }
    }

    impl super::Store for AppsScriptStore {
        type Output = UploadReceipt;

        fn save(
            &self,
            filename: String,
            csv: String,
        ) -> BoxFuture<Result<UploadReceipt, StoreError>> {
            upload(self, filename, csv).boxed()
        }
    }

    async fn upload(
        store: &AppsScriptStore,
        filename: String,
        csv: String,
    ) -> Result<UploadReceipt, StoreError> {
        store.check_preconditions(&csv)?;

        let request = UploadRequest {
            action: "uploadCSV",
            folder_id: &store.folder_id,
            filename: &filename,
            csv_content: &csv,
        };
        let body =
            serde_json::to_string(&request).map_err(|e| StoreError::Request { source: e })?;

        debug!(
            store.logger,
            "Uploading CSV...";
            "filename" => filename.clone(),
            "bytes" => body.len()
        );

        let response = store
            .client
            .post(&store.url)
            .header(reqwest::header::CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(translate_transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Network { source: e })?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                404 => StoreError::NotFound { body: text },
                403 => StoreError::AccessDenied { body: text },
                code => StoreError::Http {
                    status: code,
                    body: text,
                },
            });
        }

        let parsed: UploadResponse =
            serde_json::from_str(&text).map_err(|e| StoreError::BadResponse { source: e })?;

        if !parsed.success {
            return Err(StoreError::Failed {
                message: parsed
                    .error
                    .unwrap_or_else(|| "Upload failed".to_owned()),
            });
        }

        debug!(
            store.logger,
            "CSV uploaded";
            "file_id" => parsed.file_id.clone().unwrap_or_default()
        );

        Ok(UploadReceipt {
            file_id: parsed.file_id,
        })
    }

    /// Rewrites transport failures into operator-actionable variants; the
    /// endpoint is an external dependency people misconfigure in predictable
    /// ways.
    fn translate_transport_error(e: reqwest::Error) -> StoreError {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unreachable { source: e }
        } else {
            StoreError::Network { source: e }
        }
    }

}
