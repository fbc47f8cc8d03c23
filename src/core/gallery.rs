use crate::domain::model::ChartResult;
use crate::domain::ports::{ProcessingApi, Storage};
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Fallback image stored in place of a chart whose download failed.
pub const PLACEHOLDER_IMAGE: &[u8] = include_bytes!("../static/error-image-placeholder.svg");

/// One chart persisted to local storage by [`download_charts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedChart {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub placeholder: bool,
}

/// Downloads every generated chart into storage.
///
/// A failed download is recovered locally: the placeholder image is stored
/// under a `_placeholder.svg` name and the remaining charts are unaffected.
/// Only storage failures abort the pass.
pub async fn download_charts<A: ProcessingApi, S: Storage>(
    api: &A,
    storage: &S,
    results: &[ChartResult],
    chart_base: &str,
) -> Result<Vec<SavedChart>> {
    let mut saved = Vec::with_capacity(results.len());

    for (index, result) in results.iter().enumerate() {
        let url = result.resolve(chart_base);
        let chart = match api.fetch_chart(&url).await {
            Ok(bytes) => SavedChart {
                file_name: result.file_name(index),
                bytes,
                placeholder: false,
            },
            Err(e) => {
                // 單張圖失敗只換成佔位圖，不影響其他圖
                tracing::warn!("🖼️ Chart {} failed to load ({}), using placeholder", url, e);
                SavedChart {
                    file_name: format!("chart_{}_placeholder.svg", index + 1),
                    bytes: PLACEHOLDER_IMAGE.to_vec(),
                    placeholder: true,
                }
            }
        };

        storage.write_file(&chart.file_name, &chart.bytes).await?;
        saved.push(chart);
    }

    Ok(saved)
}

/// Bundles the downloaded charts into one ZIP archive in storage and returns
/// the archive name.
pub async fn bundle_charts<S: Storage>(
    storage: &S,
    charts: &[SavedChart],
    archive_name: &str,
) -> Result<String> {
    tracing::debug!("Creating ZIP archive with {} chart(s)", charts.len());

    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for chart in charts {
            zip.start_file::<_, ()>(chart.file_name.as_str(), FileOptions::default())?;
            zip.write_all(&chart.bytes)?;
        }

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    storage.write_file(archive_name, &zip_data).await?;
    tracing::debug!("ZIP archive saved ({} bytes)", zip_data.len());

    Ok(archive_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ChartPoint, ProcessedFileRef, SelectedFile};
    use crate::utils::error::DashError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DashError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// Serves fixed bytes per URL; unknown URLs fail like a dead link.
    struct FixtureApi {
        charts: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ProcessingApi for FixtureApi {
        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn upload_file(&self, _file: &SelectedFile) -> Result<ProcessedFileRef> {
            unimplemented!("not used by gallery tests")
        }

        async fn generate_charts(
            &self,
            _files: &[ProcessedFileRef],
            _scenarios: &[String],
        ) -> Result<Vec<crate::domain::model::ChartResult>> {
            unimplemented!("not used by gallery tests")
        }

        async fn fetch_chart(&self, url: &str) -> Result<Vec<u8>> {
            self.charts
                .get(url)
                .cloned()
                .ok_or(DashError::GenerationFailed {
                    status: 404,
                    message: format!("no such chart: {}", url),
                })
        }
    }

    #[tokio::test]
    async fn test_failed_image_gets_placeholder_without_affecting_others() {
        let mut charts = HashMap::new();
        charts.insert(
            "http://api.example.com/charts/AOC.png".to_string(),
            vec![1u8, 2, 3],
        );
        // Materials.png 不存在，模擬載入失敗

        let api = FixtureApi { charts };
        let storage = MockStorage::new();
        let results = vec![
            ChartResult::Path("AOC.png".to_string()),
            ChartResult::Path("Materials.png".to_string()),
        ];

        let saved = download_charts(&api, &storage, &results, "http://api.example.com")
            .await
            .unwrap();

        assert_eq!(saved.len(), 2);
        assert!(!saved[0].placeholder);
        assert_eq!(saved[0].file_name, "AOC.png");
        assert!(saved[1].placeholder);
        assert_eq!(saved[1].file_name, "chart_2_placeholder.svg");

        assert_eq!(storage.get_file("AOC.png").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(
            storage.get_file("chart_2_placeholder.svg").await.unwrap(),
            PLACEHOLDER_IMAGE.to_vec()
        );
    }

    #[tokio::test]
    async fn test_bundle_contains_every_chart() {
        let storage = MockStorage::new();
        let charts = vec![
            SavedChart {
                file_name: "AOC.png".to_string(),
                bytes: vec![1, 2, 3],
                placeholder: false,
            },
            SavedChart {
                file_name: "chart_2_placeholder.svg".to_string(),
                bytes: PLACEHOLDER_IMAGE.to_vec(),
                placeholder: true,
            },
        ];

        let archive = bundle_charts(&storage, &charts, "charts_bundle.zip")
            .await
            .unwrap();
        assert_eq!(archive, "charts_bundle.zip");

        let zip_bytes = storage.get_file("charts_bundle.zip").await.unwrap();
        let cursor = std::io::Cursor::new(zip_bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        assert_eq!(archive.len(), 2);

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            vec!["AOC.png", "chart_2_placeholder.svg"]
        );
    }

    #[test]
    fn test_placeholder_asset_is_embedded_svg() {
        // 佔位圖是打包進二進位檔的，不依賴外部檔案
        let text = std::str::from_utf8(PLACEHOLDER_IMAGE).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains("Chart unavailable"));
    }

    #[test]
    fn test_series_csv_is_bundle_friendly() {
        // tokio-test 的 block_on 讓同步測試也能跑 async 流程
        let storage = MockStorage::new();
        let series = vec![ChartPoint {
            category: "Labor".to_string(),
            value: 10.0,
        }];
        let csv = crate::core::renderer::series_to_csv(&series).unwrap();

        tokio_test::block_on(async {
            storage.write_file("series.csv", csv.as_bytes()).await.unwrap();
            let stored = storage.read_file("series.csv").await.unwrap();
            assert_eq!(stored, csv.as_bytes());
        });
    }
}
