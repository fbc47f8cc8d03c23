use crate::domain::model::{ChartResult, ProcessedFileRef, SelectedFile};
use crate::domain::ports::ProcessingApi;
use crate::utils::error::{DashError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

/// Client for the external spreadsheet-processing service.
///
/// Endpoints, payloads and response shapes follow the service contract:
/// multipart upload answering with a `json_path` artifact reference, and a
/// batch generation call answering with `chart_urls` or `chart_paths`.
pub struct HttpProcessingApi {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    json_path: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    chart_urls: Option<Vec<String>>,
    chart_paths: Option<Vec<String>>,
}

impl HttpProcessingApi {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl ProcessingApi for HttpProcessingApi {
    async fn health_check(&self) -> Result<()> {
        tracing::debug!("Checking processing service health");
        self.client
            .get(self.endpoint("/api/health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn upload_file(&self, file: &SelectedFile) -> Result<ProcessedFileRef> {
        let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Upload of {} rejected: {} {}", file.name, status, body);
            return Err(DashError::UploadFailed {
                filename: file.name.clone(),
                status: status.as_u16(),
            });
        }

        let body: UploadResponse = response.json().await?;
        Ok(ProcessedFileRef(body.json_path))
    }

    async fn generate_charts(
        &self,
        files: &[ProcessedFileRef],
        scenarios: &[String],
    ) -> Result<Vec<ChartResult>> {
        let file_refs: Vec<&str> = files.iter().map(|f| f.as_str()).collect();
        let payload = serde_json::json!({
            "files": file_refs,
            "scenarios": scenarios,
        });

        let response = self
            .client
            .post(self.endpoint("/api/generate-charts"))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chart generation rejected: {} {}", status, body);
            return Err(DashError::GenerationFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GenerateResponse = response.json().await?;

        // 部署不同回的欄位不同：chart_urls 是絕對網址，chart_paths 是相對路徑
        if let Some(urls) = body.chart_urls {
            return Ok(urls.into_iter().map(ChartResult::Url).collect());
        }
        if let Some(paths) = body.chart_paths {
            return Ok(paths.into_iter().map(ChartResult::Path).collect());
        }

        Err(DashError::GenerationFailed {
            status: status.as_u16(),
            message: "response carried neither chart_urls nor chart_paths".to_string(),
        })
    }

    async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
