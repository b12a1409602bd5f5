use crate::adapters::groq::GroqClient;
use crate::core::export;
use crate::core::fallback::FallbackSource;
use crate::core::{ConfigProvider, OrderRecord, OrderSource, Pipeline, Storage, TransformResult};
use crate::domain::ports::ExtractionMode;
use crate::utils::error::{OrderError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct OrderPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    text: String,
    fallback: FallbackSource,
    remote: Option<Box<dyn OrderSource>>,
}

impl<S: Storage, C: ConfigProvider> OrderPipeline<S, C> {
    /// 有 API key 時會建立遠端 client
    pub fn new(storage: S, config: C, text: impl Into<String>) -> Result<Self> {
        let remote = GroqClient::from_config(&config)?
            .map(|client| Box::new(client) as Box<dyn OrderSource>);

        Ok(Self {
            storage,
            config,
            text: text.into(),
            fallback: FallbackSource,
            remote,
        })
    }

    /// Replaces the remote source built from the configuration.
    pub fn with_remote(mut self, source: impl OrderSource + 'static) -> Self {
        self.remote = Some(Box::new(source));
        self
    }

    async fn extract_with_fallback(&self) -> Result<Vec<OrderRecord>> {
        let Some(remote) = self.remote.as_deref() else {
            tracing::info!("No API key configured, using the local parser");
            return self.fallback.extract_orders(&self.text).await;
        };

        match remote.extract_orders(&self.text).await {
            Ok(orders) => Ok(orders),
            Err(e) => {
                tracing::warn!(
                    "{} extraction failed, falling back to the local parser: {}",
                    remote.name(),
                    e
                );
                self.fallback.extract_orders(&self.text).await
            }
        }
    }

    fn output_entries<'a>(&self, result: &'a TransformResult) -> Result<Vec<(String, &'a str)>> {
        let stem = self.config.file_stem();

        self.config
            .output_formats()
            .iter()
            .map(|format| match format.as_str() {
                "csv" => Ok((format!("{}.csv", stem), result.csv_output.as_str())),
                "json" => Ok((format!("{}.json", stem), result.json_output.as_str())),
                other => Err(OrderError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported format".to_string(),
                }),
            })
            .collect()
    }
}

fn build_zip(entries: &[(String, &str)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, content) in entries {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for OrderPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<OrderRecord>> {
        if self.text.trim().is_empty() {
            return Err(OrderError::ProcessingError {
                message: "input contains no chat text".to_string(),
            });
        }

        let mode = self.config.extraction_mode();
        tracing::debug!("Extraction mode: {:?}", mode);

        match mode {
            ExtractionMode::Fallback => self.fallback.extract_orders(&self.text).await,
            ExtractionMode::Remote => {
                let remote = self
                    .remote
                    .as_deref()
                    .ok_or_else(|| OrderError::MissingConfigError {
                        field: "api_key".to_string(),
                    })?;
                remote.extract_orders(&self.text).await
            }
            ExtractionMode::Auto => self.extract_with_fallback().await,
        }
    }

    async fn transform(&self, orders: Vec<OrderRecord>) -> Result<TransformResult> {
        let csv_output = export::to_csv(&orders)?;
        let json_output = export::to_json(&orders)?;
        let summary = export::summarize(&orders);

        for line in &summary {
            tracing::info!(
                "{}: {} order(s), {} {}",
                line.product,
                line.orders,
                line.total_quantity,
                line.unit
            );
        }

        Ok(TransformResult {
            orders,
            csv_output,
            json_output,
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        if result.orders.is_empty() {
            tracing::warn!("No orders were extracted, output will only contain headers");
        }

        let entries = self.output_entries(&result)?;
        let output_path = self.config.output_path();

        if self.config.archive() {
            let name = format!("{}.zip", self.config.file_stem());
            tracing::debug!("Creating ZIP file with {} files", entries.len());
            let zip_data = build_zip(&entries)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(&name, &zip_data).await?;
            return Ok(format!("{}/{}", output_path, name));
        }

        let mut written = Vec::with_capacity(entries.len());
        for (name, content) in &entries {
            self.storage.write_file(name, content.as_bytes()).await?;
            written.push(format!("{}/{}", output_path, name));
        }

        Ok(written.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Unit;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const CHAT: &str = "[07-07-2025 16:10] +91 96198 82148: Ginger tea 250 gm\n\
                        masala tea 250gm\n\
                        A1 1023";

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
                OrderError::IoError(std::io::Error::new(
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

    struct MockConfig {
        api_key: Option<String>,
        mode: ExtractionMode,
        output_formats: Vec<String>,
        archive: bool,
    }

    impl MockConfig {
        fn new(mode: ExtractionMode) -> Self {
            Self {
                api_key: None,
                mode,
                output_formats: vec!["csv".to_string(), "json".to_string()],
                archive: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            "http://127.0.0.1:1/unused"
        }

        fn api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn temperature(&self) -> f32 {
            0.1
        }

        fn max_tokens(&self) -> u32 {
            2000
        }

        fn custom_prompt(&self) -> Option<&str> {
            None
        }

        fn timeout_seconds(&self) -> u64 {
            5
        }

        fn extraction_mode(&self) -> ExtractionMode {
            self.mode
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn file_stem(&self) -> String {
            "orders".to_string()
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive(&self) -> bool {
            self.archive
        }
    }

    /// 記錄呼叫次數的遠端替身
    struct StubRemote {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl OrderSource for StubRemote {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn extract_orders(&self, _text: &str) -> Result<Vec<OrderRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(OrderError::RateLimitError);
            }
            Ok(vec![OrderRecord {
                date: "07-07-2025".to_string(),
                time: "16:10".to_string(),
                phone: "+919619882148".to_string(),
                customer_name: "Remote".to_string(),
                house_number: "A1-1023".to_string(),
                product: "Cardamom".to_string(),
                quantity: 100.0,
                unit: Unit::Gm,
                price_per_unit: 0.0,
                amount: 0.0,
            }])
        }
    }

    fn stub(fail: bool) -> (StubRemote, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            StubRemote {
                calls: calls.clone(),
                fail,
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_auto_without_key_uses_fallback() {
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Auto), CHAT).unwrap();

        let orders = pipeline.extract().await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].product, "Ginger Tea");
        assert_eq!(orders[1].product, "Masala Tea");
    }

    #[tokio::test]
    async fn test_auto_prefers_remote() {
        let (remote, calls) = stub(false);
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Auto), CHAT)
            .unwrap()
            .with_remote(remote);

        let orders = pipeline.extract().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_name, "Remote");
    }

    #[tokio::test]
    async fn test_auto_falls_back_when_remote_fails() {
        let (remote, calls) = stub(true);
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Auto), CHAT)
            .unwrap()
            .with_remote(remote);

        let orders = pipeline.extract().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_mode_never_calls_remote() {
        let (remote, calls) = stub(false);
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Fallback), CHAT)
            .unwrap()
            .with_remote(remote);

        let orders = pipeline.extract().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_remote_mode_propagates_errors() {
        let (remote, _) = stub(true);
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Remote), CHAT)
            .unwrap()
            .with_remote(remote);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, OrderError::RateLimitError));
    }

    #[tokio::test]
    async fn test_remote_mode_requires_api_key() {
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Remote), CHAT).unwrap();

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, OrderError::MissingConfigError { ref field } if field == "api_key"));
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Fallback), " \n ").unwrap();

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, OrderError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_transform_builds_exports_and_summary() {
        let pipeline = OrderPipeline::new(MockStorage::new(), MockConfig::new(ExtractionMode::Fallback), CHAT).unwrap();
        let orders = pipeline.extract().await.unwrap();

        let result = pipeline.transform(orders).await.unwrap();

        assert_eq!(result.csv_output.split('\n').count(), 3);
        assert!(result.json_output.contains("\"houseNumber\": \"A1-1023\""));
        assert_eq!(result.summary.len(), 2);
        assert_eq!(result.summary[0].product, "Ginger Tea");
        assert_eq!(result.summary[0].total_quantity, 250.0);
    }

    #[tokio::test]
    async fn test_load_writes_each_format() {
        let storage = MockStorage::new();
        let pipeline = OrderPipeline::new(storage.clone(), MockConfig::new(ExtractionMode::Fallback), CHAT).unwrap();
        let orders = pipeline.extract().await.unwrap();
        let result = pipeline.transform(orders).await.unwrap();
        let csv = result.csv_output.clone();

        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "test_output/orders.csv, test_output/orders.json");
        assert_eq!(storage.get_file("orders.csv").await.unwrap(), csv.into_bytes());
        assert!(storage.get_file("orders.json").await.is_some());
        assert!(storage.get_file("orders.zip").await.is_none());
    }

    #[tokio::test]
    async fn test_load_archive_bundles_formats() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(ExtractionMode::Fallback);
        config.archive = true;
        let pipeline = OrderPipeline::new(storage.clone(), config, CHAT).unwrap();
        let orders = pipeline.extract().await.unwrap();
        let result = pipeline.transform(orders).await.unwrap();
        let csv = result.csv_output.clone();

        let output = pipeline.load(result).await.unwrap();
        assert_eq!(output, "test_output/orders.zip");

        let zip_bytes = storage.get_file("orders.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["orders.csv", "orders.json"]);

        let csv_read = {
            let mut file = archive.by_name("orders.csv").unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut file, &mut content).unwrap();
            content
        };
        assert_eq!(csv_read, csv);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_format() {
        let mut config = MockConfig::new(ExtractionMode::Fallback);
        config.output_formats = vec!["tsv".to_string()];
        let pipeline = OrderPipeline::new(MockStorage::new(), config, CHAT).unwrap();
        let result = pipeline.transform(Vec::new()).await.unwrap();

        let err = pipeline.load(result).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidConfigValueError { .. }));
    }
}
