pub mod cli;
pub mod toml_config;

/// 預設輸出檔名 `whatsapp_orders_<YYYY-MM-DD>` (本地日期)
pub fn default_file_stem() -> String {
    format!("whatsapp_orders_{}", chrono::Local::now().format("%Y-%m-%d"))
}

#[cfg(feature = "cli")]
pub use self::cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::default_file_stem;
    use crate::adapters::groq::{
        DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
        DEFAULT_TIMEOUT_SECONDS,
    };
    use crate::core::ConfigProvider;
    use crate::domain::ports::ExtractionMode;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "order-parser")]
    #[command(about = "Turns pasted WhatsApp order chats into CSV / JSON order sheets")]
    pub struct CliConfig {
        /// Chat export to read, `-` for stdin
        #[arg(long, default_value = "-")]
        pub input: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Output file name without extension (default: whatsapp_orders_<date>)
        #[arg(long)]
        pub file_stem: Option<String>,

        #[arg(long, value_delimiter = ',', default_value = "csv,json")]
        pub formats: Vec<String>,

        /// Bundle all outputs into one ZIP file
        #[arg(long)]
        pub archive: bool,

        #[serde(skip_serializing)]
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub api_endpoint: String,

        #[arg(long, default_value = DEFAULT_MODEL)]
        pub model: String,

        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        pub temperature: f32,

        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        pub max_tokens: u32,

        /// Extra instructions appended to the system prompt
        #[arg(long)]
        pub custom_prompt: Option<String>,

        #[arg(long, value_enum, default_value_t = ExtractionMode::Auto)]
        pub mode: ExtractionMode,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        pub timeout_seconds: u64,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn temperature(&self) -> f32 {
            self.temperature
        }

        fn max_tokens(&self) -> u32 {
            self.max_tokens
        }

        fn custom_prompt(&self) -> Option<&str> {
            self.custom_prompt.as_deref()
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn extraction_mode(&self) -> ExtractionMode {
            self.mode
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn file_stem(&self) -> String {
            self.file_stem.clone().unwrap_or_else(default_file_stem)
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn archive(&self) -> bool {
            self.archive
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("input", &self.input)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_output_formats("formats", &self.formats)?;
            validation::validate_url("api_endpoint", &self.api_endpoint)?;
            validation::validate_non_empty_string("model", &self.model)?;
            validation::validate_range("temperature", self.temperature, 0.0, 2.0)?;
            validation::validate_positive_number("max_tokens", u64::from(self.max_tokens), 1)?;
            validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;

            if let Some(stem) = &self.file_stem {
                validation::validate_non_empty_string("file_stem", stem)?;
            }

            if self.mode == ExtractionMode::Remote {
                let key = validation::validate_required_field("api_key", &self.api_key)?;
                validation::validate_non_empty_string("api_key", key)?;
            }

            Ok(())
        }
    }

}
