use crate::core::selection::FileSelection;
use crate::domain::model::{ChartResult, ProcessedFileRef, SelectedFile};
use crate::domain::ports::ProcessingApi;
use crate::utils::error::{DashError, Result};

/// Screen state of the upload/process/render workflow: the selected files,
/// the latest chart results, a busy flag and one user-facing error line.
///
/// The processing run is strictly sequential: each spreadsheet is uploaded
/// and awaited before the next one starts, then a single batch call asks the
/// service to generate the comparative charts. There is no retry and no
/// partial-result display; if the batch call fails after every upload
/// succeeded, the collected references are discarded with the run.
pub struct Dashboard<A: ProcessingApi> {
    api: A,
    selection: FileSelection,
    chart_results: Vec<ChartResult>,
    processed_refs: Vec<ProcessedFileRef>,
    error: Option<String>,
    busy: bool,
}

impl<A: ProcessingApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            selection: FileSelection::new(),
            chart_results: Vec::new(),
            processed_refs: Vec::new(),
            error: None,
            busy: false,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn select_files(&mut self, files: Vec<SelectedFile>) {
        self.selection.select_files(files);
    }

    pub fn remove_file(&mut self, index: usize) {
        self.selection.remove_file(index);
    }

    /// Empties the selection and discards prior results and error state.
    pub fn clear_all(&mut self) {
        self.selection.clear();
        self.chart_results.clear();
        self.processed_refs.clear();
        self.error = None;
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn chart_results(&self) -> &[ChartResult] {
        &self.chart_results
    }

    /// Artifact references collected by the last successful run, aligned
    /// with the selection it processed. A failed run leaves nothing here.
    pub fn processed_refs(&self) -> &[ProcessedFileRef] {
        &self.processed_refs
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Runs one processing pass over the current selection.
    ///
    /// An empty selection fails fast with a user-visible message and makes
    /// no network call. Any failure mid-run aborts the remaining sequence,
    /// keeps the previous chart results untouched and collapses the cause
    /// into one generic banner; the original error is logged for diagnosis.
    pub async fn process_files(&mut self) {
        if self.selection.is_empty() {
            let err = DashError::NoFilesSelected;
            tracing::warn!("⚠️ Process requested with an empty selection");
            self.error = Some(err.user_friendly_message());
            return;
        }

        self.busy = true;
        self.error = None;

        match self.run_processing().await {
            Ok((refs, results)) => {
                tracing::info!("✅ Received {} chart(s)", results.len());
                self.chart_results = results;
                self.processed_refs = refs;
            }
            Err(e) => {
                tracing::error!(
                    "❌ Processing run failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                self.error = Some(e.user_friendly_message());
            }
        }

        self.busy = false;
    }

    async fn run_processing(&self) -> Result<(Vec<ProcessedFileRef>, Vec<ChartResult>)> {
        let mut processed: Vec<ProcessedFileRef> = Vec::with_capacity(self.selection.len());

        // 逐一上傳：等前一個完成才開始下一個，順序與選擇順序一致
        for file in self.selection.files() {
            tracing::info!("⬆️ Uploading {} ({} bytes)", file.name, file.size);
            let reference = self.api.upload_file(file).await?;
            tracing::debug!("Processed artifact for {}: {}", file.name, reference.as_str());
            processed.push(reference);
        }

        // 全部上傳完成後才發出一次圖表生成請求
        let scenarios = self.selection.scenario_labels();
        tracing::info!("📈 Requesting charts for {} scenario(s)", scenarios.len());
        let results = self.api.generate_charts(&processed, &scenarios).await?;
        Ok((processed, results))
        // 失敗時 processed 隨這個函式丟棄，不保留本次運行的部分結果
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every call in order and can be told to reject the nth upload.
    struct ScriptedApi {
        calls: Arc<Mutex<Vec<String>>>,
        fail_upload_at: Option<usize>,
        fail_generation: bool,
        uploads_seen: Mutex<usize>,
    }

    impl ScriptedApi {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_upload_at: None,
                fail_generation: false,
                uploads_seen: Mutex::new(0),
            }
        }

        fn failing_upload_at(mut self, index: usize) -> Self {
            self.fail_upload_at = Some(index);
            self
        }

        fn failing_generation(mut self) -> Self {
            self.fail_generation = true;
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessingApi for ScriptedApi {
        async fn health_check(&self) -> Result<()> {
            self.calls.lock().unwrap().push("health".to_string());
            Ok(())
        }

        async fn upload_file(&self, file: &SelectedFile) -> Result<ProcessedFileRef> {
            let mut seen = self.uploads_seen.lock().unwrap();
            let index = *seen;
            *seen += 1;
            self.calls
                .lock()
                .unwrap()
                .push(format!("upload:{}", file.name));

            if self.fail_upload_at == Some(index) {
                return Err(DashError::UploadFailed {
                    filename: file.name.clone(),
                    status: 500,
                });
            }
            Ok(ProcessedFileRef(format!("refs/{}.json", file.name)))
        }

        async fn generate_charts(
            &self,
            files: &[ProcessedFileRef],
            scenarios: &[String],
        ) -> Result<Vec<ChartResult>> {
            self.calls.lock().unwrap().push(format!(
                "generate:{}:{}",
                files.len(),
                scenarios.join(",")
            ));
            if self.fail_generation {
                return Err(DashError::GenerationFailed {
                    status: 502,
                    message: "boom".to_string(),
                });
            }
            Ok(vec![ChartResult::Url(
                "http://charts.example.com/a.png".to_string(),
            )])
        }

        async fn fetch_chart(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(vec![])
        }
    }

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, vec![0u8; 16])
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_network_call() {
        let api = ScriptedApi::new();
        let calls = api.calls.clone();
        let mut dashboard = Dashboard::new(api);

        dashboard.process_files().await;

        assert_eq!(dashboard.error(), Some("Please select files to process"));
        assert!(calls.lock().unwrap().is_empty());
        assert!(!dashboard.is_busy());
    }

    #[tokio::test]
    async fn test_uploads_run_in_order_before_single_generation() {
        let api = ScriptedApi::new();
        let calls = api.calls.clone();
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx"), file("Q2.xls"), file("Q3.xlsx")]);

        dashboard.process_files().await;

        let calls = calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "upload:Q1.xlsx",
                "upload:Q2.xls",
                "upload:Q3.xlsx",
                "generate:3:Q1,Q2,Q3"
            ]
        );
        assert_eq!(dashboard.chart_results().len(), 1);
        assert!(dashboard.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_second_upload_aborts_before_generation() {
        let api = ScriptedApi::new().failing_upload_at(1);
        let calls = api.calls.clone();
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx"), file("Q2.xlsx"), file("Q3.xlsx")]);

        dashboard.process_files().await;

        let calls = calls.lock().unwrap().clone();
        // 第三個檔案不再上傳，也沒有生成請求
        assert_eq!(calls, vec!["upload:Q1.xlsx", "upload:Q2.xlsx"]);
        assert_eq!(dashboard.error(), Some("Error processing files"));
        assert!(dashboard.chart_results().is_empty());
        // 第一個檔案已經拿到的 reference 也隨失敗的運行丟棄
        assert!(dashboard.processed_refs().is_empty());
        assert!(!dashboard.is_busy());
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_previous_results() {
        let api = ScriptedApi::new();
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx")]);
        dashboard.process_files().await;
        assert_eq!(dashboard.chart_results().len(), 1);

        // 換一個會在生成階段失敗的 API，之前的結果不能被清掉
        let failing = ScriptedApi::new().failing_generation();
        let previous = dashboard.chart_results().to_vec();
        let mut dashboard = Dashboard {
            api: failing,
            selection: {
                let mut s = FileSelection::new();
                s.select_files(vec![file("Q2.xlsx")]);
                s
            },
            chart_results: previous.clone(),
            processed_refs: Vec::new(),
            error: None,
            busy: false,
        };

        dashboard.process_files().await;

        assert_eq!(dashboard.error(), Some("Error processing files"));
        assert_eq!(dashboard.chart_results(), previous.as_slice());
    }

    #[tokio::test]
    async fn test_success_replaces_previous_results() {
        let api = ScriptedApi::new();
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx")]);
        dashboard.process_files().await;
        let first = dashboard.chart_results().to_vec();

        dashboard.select_files(vec![file("Q2.xlsx")]);
        dashboard.process_files().await;

        assert_eq!(dashboard.chart_results().len(), 1);
        assert_eq!(dashboard.chart_results(), first.as_slice());
        assert!(dashboard.error().is_none());
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let api = ScriptedApi::new();
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx")]);
        dashboard.process_files().await;
        assert!(!dashboard.chart_results().is_empty());

        dashboard.clear_all();

        assert!(dashboard.selection().is_empty());
        assert!(dashboard.chart_results().is_empty());
        assert!(dashboard.error().is_none());
    }

    #[tokio::test]
    async fn test_clear_all_also_clears_error_state() {
        let api = ScriptedApi::new().failing_upload_at(0);
        let mut dashboard = Dashboard::new(api);
        dashboard.select_files(vec![file("Q1.xlsx")]);
        dashboard.process_files().await;
        assert!(dashboard.error().is_some());

        dashboard.clear_all();
        assert!(dashboard.error().is_none());
    }
}
