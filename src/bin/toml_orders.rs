use anyhow::Context;
use clap::Parser;
use order_parser::config::cli::read_chat_text;
use order_parser::config::toml_config::TomlConfig;
use order_parser::core::ConfigProvider;
use order_parser::domain::model::UnmatchedReason;
use order_parser::domain::ports::ExtractionMode;
use order_parser::utils::error::ErrorSeverity;
use order_parser::utils::{logger, validation::Validate};
use order_parser::{parse_with_report, LocalStorage, OrderEngine, OrderPipeline};

#[derive(Parser)]
#[command(name = "toml-orders")]
#[command(about = "Order extraction driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "orders.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override extraction mode from config
    #[arg(long, value_enum)]
    mode: Option<ExtractionMode>,

    /// Dry run - show what would be processed without writing any file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based order extraction");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(mode) = args.mode {
        config.extract.mode = Some(mode);
        tracing::info!("🔧 Extraction mode overridden to: {:?}", mode);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let text = read_chat_text(&LocalStorage::new(".".to_string()), config.input_path())
        .await
        .with_context(|| format!("failed to read chat input '{}'", config.input_path()))?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        perform_dry_run(&config, &text);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline =
        OrderPipeline::new(storage, config, text).context("failed to set up the order pipeline")?;

    match OrderEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ Orders extracted successfully!");
            println!("✅ Orders extracted successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Order extraction failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            if e.is_retryable() {
                eprintln!("🔁 This error is usually temporary; running again may succeed");
            }

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    match &config.pipeline.version {
        Some(version) => println!("  Pipeline: {} v{}", config.pipeline.name, version),
        None => println!("  Pipeline: {}", config.pipeline.name),
    }
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!("  Mode: {:?}", config.extraction_mode());
    println!("  Endpoint: {}", config.api_endpoint());
    println!("  Model: {}", config.model());
    println!(
        "  API key: {}",
        if config.api_key().is_some() { "configured" } else { "not set" }
    );
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  File stem: {}", config.file_stem());

    if config.archive() {
        println!("  Compression: {}.zip", config.file_stem());
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// 用本地解析器預覽，不呼叫遠端也不寫檔
fn perform_dry_run(config: &TomlConfig, text: &str) {
    let report = parse_with_report(text);

    println!("🔍 Dry Run Analysis:");
    println!();
    println!("⚙️ Extraction:");
    match (config.extraction_mode(), config.api_key().is_some()) {
        (ExtractionMode::Fallback, _) | (ExtractionMode::Auto, false) => {
            println!("  Local parser only")
        }
        (ExtractionMode::Auto, true) => {
            println!("  Remote model first, local parser on failure")
        }
        (ExtractionMode::Remote, _) => println!("  Remote model only"),
    }

    println!();
    println!("📊 Local parser preview:");
    println!("  Orders: {}", report.orders.len());
    for order in &report.orders {
        println!(
            "  {} {} {}: {} {} {}",
            order.date, order.time, order.customer_name, order.product, order.quantity, order.unit
        );
    }

    if !report.unmatched.is_empty() {
        println!("  Skipped: {}", report.unmatched.len());
        for skipped in &report.unmatched {
            let reason = match &skipped.reason {
                UnmatchedReason::NoProducts => "no known product".to_string(),
                UnmatchedReason::QuantityNotFound { product } => {
                    format!("no quantity for {}", product)
                }
            };
            println!("  {} {} {}: {}", skipped.date, skipped.time, skipped.phone, reason);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
