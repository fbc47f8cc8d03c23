use chart_dash::config::toml_config::TomlConfig;
use chart_dash::core::{gallery, records};
use chart_dash::domain::model::SelectedFile;
use chart_dash::domain::ports::{ConfigProvider, ProcessingApi};
use chart_dash::utils::monitor::SystemMonitor;
use chart_dash::utils::{logger, validation::Validate};
use chart_dash::{Dashboard, HttpProcessingApi, LocalStorage, SupabaseClient, SupabaseRepository};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-dash")]
#[command(about = "Dashboard runs driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dash-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌（配置可以要求 JSON 格式）
    if config.json_logging() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based dashboard run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let monitor = SystemMonitor::new(monitor_enabled);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 讀取輸入檔案
    let mut files = Vec::new();
    for path in &config.files.inputs {
        match SelectedFile::from_path(path) {
            Ok(file) => {
                tracing::info!("📄 Selected {} ({:.1} KB)", file.name, file.size as f64 / 1024.0);
                files.push(file);
            }
            Err(e) => {
                eprintln!("❌ Cannot read '{}': {}", path, e);
                std::process::exit(1);
            }
        }
    }

    let api = HttpProcessingApi::new(config.api_base());

    if config.health_check_enabled() {
        if let Err(e) = api.health_check().await {
            tracing::error!("❌ Processing service health check failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
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

    let storage = LocalStorage::new(config.output_path().to_string());
    let saved = gallery::download_charts(
        dashboard.api(),
        &storage,
        dashboard.chart_results(),
        config.chart_base(),
    )
    .await?;

    for chart in &saved {
        println!(
            "🖼️ {}{}",
            chart.file_name,
            if chart.placeholder { " (placeholder)" } else { "" }
        );
    }

    if config.archive_enabled() {
        let archive = gallery::bundle_charts(&storage, &saved, "charts_bundle.zip").await?;
        println!("📦 Bundled charts into {}", archive);
    }

    // 有 [persistence] 區塊時把這次運行記錄到資料庫
    if let Some(persistence) = &config.persistence {
        let client = SupabaseClient::new(&persistence.supabase_url, &persistence.supabase_key);
        match client.sign_in(&persistence.email, &persistence.password).await {
            Ok(session) => {
                let repository = SupabaseRepository::new(client, session);
                match records::record_run(
                    &repository,
                    dashboard.selection().files(),
                    dashboard.processed_refs(),
                    dashboard.chart_results(),
                    config.chart_base(),
                )
                .await
                {
                    Ok(summary) => println!(
                        "📋 Account history: {} upload(s), {} chart(s)",
                        summary.total_uploads, summary.total_charts
                    ),
                    Err(e) => {
                        tracing::error!("⚠️ Failed to record the run: {}", e);
                        eprintln!("⚠️ {}", e.user_friendly_message());
                    }
                }
            }
            Err(e) => {
                tracing::error!("⚠️ Sign-in failed, run not recorded: {}", e);
                eprintln!("⚠️ {}", e.user_friendly_message());
            }
        }
    }

    monitor.log_final_stats();
    println!("📁 Charts saved to: {}", config.output_path());

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Dashboard: {} v{}",
        config.dashboard.name, config.dashboard.version
    );
    println!("  API: {}", config.api_base());
    println!("  Chart base: {}", config.chart_base());
    println!("  Files: {}", config.files.inputs.len());
    println!("  Output: {}", config.output_path());
    println!("  Archive: {}", config.archive_enabled());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Processing Service:");
    println!("  Upload endpoint: {}/api/upload", config.api_base());
    println!(
        "  Generation endpoint: {}/api/generate-charts",
        config.api_base()
    );
    println!("  Health check: {}", config.health_check_enabled());

    println!();
    println!("📄 Selected Files:");
    if config.files.inputs.is_empty() {
        println!("  (none - the run would stop with a selection error)");
    }
    for path in &config.files.inputs {
        println!("  {}", path);
    }

    let overrides = config.style_overrides();
    if !overrides.is_empty() {
        println!();
        println!("🎨 Style Overrides:");
        if let Some(color) = &overrides.fill_color {
            println!("  fill_color = {}", color);
        }
        if let Some(width) = overrides.bar_width {
            println!("  bar_width = {}", width);
        }
        if let Some(opacity) = overrides.opacity {
            println!("  opacity = {}", opacity);
        }
        if let Some(size) = overrides.font_size {
            println!("  font_size = {}", size);
        }
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Archive: {}", config.archive_enabled());

    if config.persistence.is_some() {
        println!();
        println!("🗄️ Persistence: enabled (runs will be recorded)");
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
