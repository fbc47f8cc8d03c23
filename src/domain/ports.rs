use crate::domain::model::{
    ChartRecord, ChartResult, ProcessedFileRef, SelectedFile, UploadRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Base address of the processing service (`/api/upload` etc.).
    fn api_base(&self) -> &str;
    /// Base address charts are served from; usually equal to `api_base`.
    fn chart_base(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// The external processing service: spreadsheet in, chart references out.
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    async fn health_check(&self) -> Result<()>;

    /// Uploads one spreadsheet and returns the reference to the processed
    /// artifact derived from it.
    async fn upload_file(&self, file: &SelectedFile) -> Result<ProcessedFileRef>;

    /// Requests one batch of charts for the given artifacts. `scenarios` is
    /// positionally aligned with `files`.
    async fn generate_charts(
        &self,
        files: &[ProcessedFileRef],
        scenarios: &[String],
    ) -> Result<Vec<ChartResult>>;

    /// Fetches a chart image by resolved URL.
    async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>>;
}

/// Narrow persistence interface over the hosted store: exactly the four
/// operations the dashboard needs, so the store can be swapped without
/// touching UI logic. The owning user comes from the injected session.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn create_upload_record(
        &self,
        filename: &str,
        file_path: &str,
        json_path: &str,
    ) -> Result<UploadRecord>;

    async fn create_chart_record(
        &self,
        upload_id: &str,
        chart_path: &str,
        chart_type: &str,
    ) -> Result<ChartRecord>;

    /// The user's uploads, most recent first.
    async fn list_uploads(&self) -> Result<Vec<UploadRecord>>;

    /// The user's charts, most recent first.
    async fn list_charts(&self) -> Result<Vec<ChartRecord>>;
}
