use crate::adapters::groq::{
    DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::ConfigProvider;
use crate::domain::ports::ExtractionMode;
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// 聊天匯出檔，`-` 代表 stdin
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub custom_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub mode: Option<ExtractionMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub file_stem: Option<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| OrderError::ConfigError {
                message: format!("cannot read config file '{}': {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OrderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GROQ_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_url("source.endpoint", self.api_endpoint())?;
        validation::validate_non_empty_string("source.model", self.model())?;
        validation::validate_range("source.temperature", self.temperature(), 0.0, 2.0)?;
        validation::validate_positive_number("source.max_tokens", u64::from(self.max_tokens()), 1)?;
        validation::validate_positive_number("source.timeout_seconds", self.timeout_seconds(), 1)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(stem) = &self.load.file_stem {
            validation::validate_non_empty_string("load.file_stem", stem)?;
        }

        if self.extraction_mode() == ExtractionMode::Remote && self.api_key().is_none() {
            return Err(OrderError::MissingConfigError {
                field: "source.api_key".to_string(),
            });
        }

        Ok(())
    }

    pub fn input_path(&self) -> &str {
        &self.input.path
    }

    pub fn compression_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        self.source.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// 佔位符沒被替換 (環境變數未設定) 時視為沒有 key
    fn api_key(&self) -> Option<&str> {
        self.source
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !ENV_VAR_RE.is_match(key))
    }

    fn model(&self) -> &str {
        self.source.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    fn temperature(&self) -> f32 {
        self.source.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    fn max_tokens(&self) -> u32 {
        self.source.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn custom_prompt(&self) -> Option<&str> {
        self.source.custom_prompt.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn extraction_mode(&self) -> ExtractionMode {
        self.extract.mode.unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn file_stem(&self) -> String {
        self.load
            .file_stem
            .clone()
            .unwrap_or_else(super::default_file_stem)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive(&self) -> bool {
        self.compression_enabled()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
