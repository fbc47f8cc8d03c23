use chart_dash::domain::model::{ChartResult, SelectedFile};
use chart_dash::domain::ports::ProcessingApi;
use chart_dash::{Dashboard, HttpProcessingApi};
use httpmock::prelude::*;

fn spreadsheet(name: &str) -> SelectedFile {
    // xlsx 檔本質上是 zip，給個像樣的開頭就夠了
    SelectedFile::new(name, b"PK\x03\x04 fake workbook".to_vec())
}

#[tokio::test]
async fn test_end_to_end_processing_flow() {
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path("/api/upload");
        then.status(200).json_body(serde_json::json!({
            "message": "File processed successfully",
            "json_path": "https://store.example.com/excel-uploads/run_output.json"
        }));
    });

    // 驗證送出的 scenarios 就是去掉副檔名的檔名，且與 files 對齊
    let generate_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/generate-charts")
            .json_body(serde_json::json!({
                "files": [
                    "https://store.example.com/excel-uploads/run_output.json",
                    "https://store.example.com/excel-uploads/run_output.json"
                ],
                "scenarios": ["Q1", "Q2"]
            }));
        then.status(200).json_body(serde_json::json!({
            "message": "Charts generated successfully",
            "chart_urls": [
                "http://charts.example.com/AOC.png",
                "http://charts.example.com/Materials.png"
            ]
        }));
    });

    let api = HttpProcessingApi::new(&server.url(""));
    let mut dashboard = Dashboard::new(api);
    dashboard.select_files(vec![spreadsheet("Q1.xlsx"), spreadsheet("Q2.xls")]);

    dashboard.process_files().await;

    // 每個檔案一次上傳，全部完成後才有一次生成請求
    upload_mock.assert_hits(2);
    generate_mock.assert();

    assert!(dashboard.error().is_none());
    assert_eq!(dashboard.chart_results().len(), 2);
    assert_eq!(
        dashboard.chart_results()[0],
        ChartResult::Url("http://charts.example.com/AOC.png".to_string())
    );
    assert_eq!(dashboard.processed_refs().len(), 2);
}

#[tokio::test]
async fn test_empty_selection_hits_no_endpoint() {
    let server = MockServer::start();

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path("/api/upload");
        then.status(200);
    });
    let generate_mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate-charts");
        then.status(200);
    });

    let api = HttpProcessingApi::new(&server.url(""));
    let mut dashboard = Dashboard::new(api);

    dashboard.process_files().await;

    assert_eq!(dashboard.error(), Some("Please select files to process"));
    upload_mock.assert_hits(0);
    generate_mock.assert_hits(0);
}

#[tokio::test]
async fn test_failed_second_upload_sends_no_generation_request() {
    let server = MockServer::start();

    // multipart body 會帶原始檔名，用它區分兩次上傳
    let first_upload = server.mock(|when, then| {
        when.method(POST).path("/api/upload").body_contains("Q1.xlsx");
        then.status(200).json_body(serde_json::json!({
            "json_path": "https://store.example.com/excel-uploads/q1_output.json"
        }));
    });
    let second_upload = server.mock(|when, then| {
        when.method(POST).path("/api/upload").body_contains("Q2.xlsx");
        then.status(500)
            .json_body(serde_json::json!({ "error": "Invalid file format" }));
    });
    let generate_mock = server.mock(|when, then| {
        when.method(POST).path("/api/generate-charts");
        then.status(200);
    });

    let api = HttpProcessingApi::new(&server.url(""));
    let mut dashboard = Dashboard::new(api);
    dashboard.select_files(vec![spreadsheet("Q1.xlsx"), spreadsheet("Q2.xlsx")]);

    dashboard.process_files().await;

    first_upload.assert();
    second_upload.assert();
    generate_mock.assert_hits(0);

    assert_eq!(dashboard.error(), Some("Error processing files"));
    assert!(dashboard.chart_results().is_empty());
    // 第一個檔案拿到的 reference 不留下來
    assert!(dashboard.processed_refs().is_empty());
}

#[tokio::test]
async fn test_chart_paths_variant_resolves_against_base() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/upload");
        then.status(200)
            .json_body(serde_json::json!({ "json_path": "refs/q1.json" }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-charts");
        then.status(200).json_body(serde_json::json!({
            "chart_paths": ["output/run42/AOC.png"]
        }));
    });

    let api = HttpProcessingApi::new(&server.url(""));
    let mut dashboard = Dashboard::new(api);
    dashboard.select_files(vec![spreadsheet("Q1.xlsx")]);

    dashboard.process_files().await;

    assert!(dashboard.error().is_none());
    let results = dashboard.chart_results();
    assert_eq!(
        results[0],
        ChartResult::Path("output/run42/AOC.png".to_string())
    );
    assert_eq!(
        results[0].resolve("http://localhost:5000"),
        "http://localhost:5000/charts/AOC.png"
    );
}

#[tokio::test]
async fn test_malformed_generation_response_sets_error_banner() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/upload");
        then.status(200)
            .json_body(serde_json::json!({ "json_path": "refs/q1.json" }));
    });
    // 回應少了 chart_urls / chart_paths
    server.mock(|when, then| {
        when.method(POST).path("/api/generate-charts");
        then.status(200)
            .json_body(serde_json::json!({ "message": "ok" }));
    });

    let api = HttpProcessingApi::new(&server.url(""));
    let mut dashboard = Dashboard::new(api);
    dashboard.select_files(vec![spreadsheet("Q1.xlsx")]);

    dashboard.process_files().await;

    assert_eq!(dashboard.error(), Some("Error processing files"));
    assert!(dashboard.chart_results().is_empty());
}

#[tokio::test]
async fn test_health_check_round_trip() {
    let server = MockServer::start();

    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200)
            .json_body(serde_json::json!({ "status": "healthy" }));
    });

    let api = HttpProcessingApi::new(&server.url(""));
    assert!(api.health_check().await.is_ok());
    health_mock.assert();

    let down = MockServer::start();
    down.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(503);
    });
    let api = HttpProcessingApi::new(&down.url(""));
    assert!(api.health_check().await.is_err());
}
