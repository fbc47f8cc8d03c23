use chart_dash::config::toml_config::TomlConfig;
use chart_dash::core::renderer::{self, RenderDimensions};
use chart_dash::core::style::StyleOverrides;
use chart_dash::domain::model::{ChartConfig, FontFamily, LegendPosition};
use chart_dash::utils::logger;
use clap::Parser;

#[derive(Parser)]
#[command(name = "render-chart")]
#[command(about = "Render a comparative bar chart locally from a CSV series")]
struct Args {
    /// CSV file with a category,value header
    #[arg(short, long)]
    data: String,

    /// Optional dashboard TOML whose [style] table seeds the styling
    #[arg(short, long)]
    config: Option<String>,

    /// Chart title
    #[arg(long, default_value = "Comparative Operating Costs")]
    title: String,

    /// Output PNG path
    #[arg(short, long, default_value = "chart.png")]
    output: String,

    /// Bar fill color (#RRGGBB)
    #[arg(long)]
    fill_color: Option<String>,

    /// Bar width in pixels (1-50)
    #[arg(long)]
    bar_width: Option<u32>,

    /// Bar fill opacity (0.0-1.0)
    #[arg(long)]
    opacity: Option<f64>,

    /// Legend placement
    #[arg(long, value_enum)]
    legend_position: Option<LegendPosition>,

    /// Label font family
    #[arg(long, value_enum)]
    font_family: Option<FontFamily>,

    /// Label font size (8-24)
    #[arg(long)]
    font_size: Option<u32>,

    /// Image width in pixels
    #[arg(long, default_value = "900")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "500")]
    height: u32,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🎨 Rendering chart from {}", args.data);

    let file = match std::fs::File::open(&args.data) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("❌ Cannot open series file '{}': {}", args.data, e);
            std::process::exit(1);
        }
    };

    let series = match renderer::load_series_from_csv(file) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    tracing::info!("📊 Loaded {} data point(s)", series.len());

    // [style] 表先套，旗標再蓋過去；每一步都是整個設定物件換新
    let mut style = ChartConfig::default();
    if let Some(config_path) = &args.config {
        match TomlConfig::from_file(config_path) {
            Ok(config) => style = config.style_overrides().apply(style),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", config_path, e);
                std::process::exit(1);
            }
        }
    }

    let overrides = StyleOverrides {
        fill_color: args.fill_color.clone(),
        bar_width: args.bar_width,
        opacity: args.opacity,
        legend_position: args.legend_position,
        font_family: args.font_family,
        font_size: args.font_size,
    };
    let style = overrides.apply(style);

    if args.verbose {
        tracing::debug!("Effective style: {:?}", style);
    }

    let dimensions = RenderDimensions {
        width: args.width,
        height: args.height,
    };

    match renderer::render_bar_chart(&series, &style, &args.title, dimensions) {
        Ok(png) => {
            std::fs::write(&args.output, &png)?;
            println!("✅ Chart rendered successfully!");
            println!("📁 Output saved to: {}", args.output);
        }
        Err(e) => {
            tracing::error!(
                "❌ Render failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            let exit_code = match e.severity() {
                chart_dash::utils::error::ErrorSeverity::Low => 0,
                chart_dash::utils::error::ErrorSeverity::Medium => 2,
                chart_dash::utils::error::ErrorSeverity::High => 1,
                chart_dash::utils::error::ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
