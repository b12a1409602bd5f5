use crate::domain::model::{OrderRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 訂單擷取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// 有 API key 時走遠端，失敗則回退到本地解析
    #[default]
    Auto,
    /// 只用本地解析，不碰網路
    Fallback,
    /// 只用遠端，錯誤直接回報
    Remote,
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn temperature(&self) -> f32;
    fn max_tokens(&self) -> u32;
    fn custom_prompt(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    fn extraction_mode(&self) -> ExtractionMode;
    fn output_path(&self) -> &str;
    fn file_stem(&self) -> String;
    fn output_formats(&self) -> &[String];
    fn archive(&self) -> bool;
}

/// Anything that turns pasted chat text into order records.
#[async_trait]
pub trait OrderSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn extract_orders(&self, text: &str) -> Result<Vec<OrderRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<OrderRecord>>;
    async fn transform(&self, orders: Vec<OrderRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
