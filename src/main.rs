use chart_dash::core::{gallery, records};
use chart_dash::domain::model::SelectedFile;
use chart_dash::domain::ports::{ConfigProvider, ProcessingApi};
use chart_dash::utils::monitor::SystemMonitor;
use chart_dash::utils::{logger, validation::Validate};
use chart_dash::{
    CliConfig, DashError, Dashboard, HttpProcessingApi, LocalStorage, SupabaseClient,
    SupabaseRepository,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting chart-dash CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor = SystemMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 讀取選擇的檔案
    let mut files = Vec::new();
    for path in &config.files {
        match SelectedFile::from_path(path) {
            Ok(file) => {
                tracing::info!("📄 Selected {} ({:.1} KB)", file.name, file.size as f64 / 1024.0);
                files.push(file);
            }
            Err(e) => return fail(e),
        }
    }

    let api = HttpProcessingApi::new(config.api_base());

    if !config.skip_health_check {
        if let Err(e) = api.health_check().await {
            tracing::error!("❌ Processing service health check failed: {}", e);
            return fail(e);
        }
        tracing::info!("💓 Processing service is healthy");
    }

    let mut dashboard = Dashboard::new(api);
    dashboard.select_files(files);

    monitor.log_stats("Before processing");
    dashboard.process_files().await;
    monitor.log_stats("After processing");

    if let Some(message) = dashboard.error() {
        eprintln!("❌ {}", message);
        std::process::exit(1);
    }

    println!("✅ Generated {} chart(s)", dashboard.chart_results().len());

    // 下載圖表，失敗的那張用佔位圖代替
    let storage = LocalStorage::new(config.output_path().to_string());
    let saved = match gallery::download_charts(
        dashboard.api(),
        &storage,
        dashboard.chart_results(),
        config.chart_base(),
    )
    .await
    {
        Ok(saved) => saved,
        Err(e) => return fail(e),
    };

    for chart in &saved {
        if chart.placeholder {
            println!("🖼️ {} (placeholder)", chart.file_name);
        } else {
            println!("🖼️ {}", chart.file_name);
        }
    }

    if config.archive {
        match gallery::bundle_charts(&storage, &saved, "charts_bundle.zip").await {
            Ok(archive) => println!("📦 Bundled charts into {}", archive),
            Err(e) => return fail(e),
        }
    }

    monitor.log_stats("After download");

    // 有 Supabase 設定時把這次運行記錄到資料庫
    if config.persistence_enabled() {
        if let Err(e) = record_run(&config, &dashboard).await {
            // 圖表已經產出，記錄失敗不吞掉成功的結果
            tracing::error!(
                "⚠️ Failed to record the run: {} (Category: {:?})",
                e,
                e.category()
            );
            eprintln!("⚠️ {}", e.user_friendly_message());
        }
    }

    monitor.log_final_stats();
    println!("📁 Charts saved to: {}", config.output_path());

    Ok(())
}

async fn record_run<A: ProcessingApi>(
    config: &CliConfig,
    dashboard: &Dashboard<A>,
) -> chart_dash::Result<()> {
    let supabase_url = config.supabase_url.as_deref().unwrap_or_default();
    let supabase_key = config.supabase_key.as_deref().unwrap_or_default();
    let email = config.email.as_deref().unwrap_or_default();
    let password = config.password.as_deref().unwrap_or_default();

    let client = SupabaseClient::new(supabase_url, supabase_key);
    let session = client.sign_in(email, password).await?;
    tracing::info!("🔐 Signed in as {}", email);

    if client.get_preferences(&session).await?.is_some() {
        tracing::debug!("Account has stored preferences");
    }

    let repository = SupabaseRepository::new(client, session);

    let summary = records::record_run(
        &repository,
        dashboard.selection().files(),
        dashboard.processed_refs(),
        dashboard.chart_results(),
        config.chart_base(),
    )
    .await?;

    println!(
        "📋 Account history: {} upload(s), {} chart(s)",
        summary.total_uploads, summary.total_charts
    );

    Ok(())
}

fn fail(e: DashError) -> Result<(), Box<dyn std::error::Error>> {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        chart_dash::utils::error::ErrorSeverity::Low => 0,
        chart_dash::utils::error::ErrorSeverity::Medium => 2,
        chart_dash::utils::error::ErrorSeverity::High => 1,
        chart_dash::utils::error::ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
