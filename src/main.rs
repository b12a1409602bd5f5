use clap::Parser;
use order_parser::config::cli::read_chat_text;
use order_parser::utils::error::{ErrorSeverity, OrderError};
use order_parser::utils::{logger, validation::Validate};
use order_parser::{CliConfig, LocalStorage, OrderEngine, OrderPipeline};

fn exit_code(e: &OrderError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn report_failure(stage: &str, e: &OrderError) {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
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

    let code = exit_code(e);
    if code > 0 {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting order-parser CLI");
    tracing::debug!(
        "Mode: {:?}, API key configured: {}, formats: {}",
        config.mode,
        config.api_key.is_some(),
        config.formats.join(",")
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        report_failure("Configuration validation", &e);
        return;
    }

    let text = match read_chat_text(&LocalStorage::new(".".to_string()), &config.input).await {
        Ok(text) => text,
        Err(e) => {
            report_failure("Reading input", &e);
            return;
        }
    };

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = match OrderPipeline::new(storage, config, text) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            report_failure("Pipeline setup", &e);
            return;
        }
    };

    match OrderEngine::new(pipeline).run().await {
        Ok(output_path) => {
            tracing::info!("✅ Orders extracted successfully!");
            println!("✅ Orders extracted successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_failure("Order extraction", &e),
    }
}
