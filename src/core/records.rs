use crate::domain::model::{ChartResult, ProcessedFileRef, SelectedFile};
use crate::domain::ports::DashboardRepository;
use crate::utils::error::Result;

/// Account totals after a run was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total_uploads: usize,
    pub total_charts: usize,
}

/// Records one successful processing run in the hosted store: one upload row
/// per file (with its artifact reference) and one chart row per result,
/// linked to the first upload of the batch. Answers with the account's
/// most-recent-first history totals.
pub async fn record_run<R: DashboardRepository>(
    repository: &R,
    files: &[SelectedFile],
    refs: &[ProcessedFileRef],
    results: &[ChartResult],
    chart_base: &str,
) -> Result<RunSummary> {
    let mut anchor_upload: Option<String> = None;

    for (file, reference) in files.iter().zip(refs) {
        let record = repository
            .create_upload_record(&file.name, &file.name, reference.as_str())
            .await?;
        if anchor_upload.is_none() {
            anchor_upload = Some(record.id.clone());
        }
    }

    if let Some(upload_id) = &anchor_upload {
        for result in results {
            let chart_path = result.resolve(chart_base);
            repository
                .create_chart_record(upload_id, &chart_path, "comparative_bar")
                .await?;
        }
    }

    let uploads = repository.list_uploads().await?;
    let charts = repository.list_charts().await?;

    Ok(RunSummary {
        total_uploads: uploads.len(),
        total_charts: charts.len(),
    })
}
