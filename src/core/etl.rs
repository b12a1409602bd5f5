use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct OrderEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> OrderEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract → transform → load; returns where the output was written.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting order extraction...");

        // Extract
        let orders = self.pipeline.extract().await?;
        tracing::info!("Extracted {} orders", orders.len());

        // Transform
        let result = self.pipeline.transform(orders).await?;
        tracing::info!(
            "Rendered {} orders for {} product(s)",
            result.orders.len(),
            result.summary.len()
        );

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderRecord, TransformResult};
    use crate::utils::error::OrderError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPipeline {
        phases: Mutex<Vec<&'static str>>,
        fail_extract: bool,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<Vec<OrderRecord>> {
            self.phases.lock().unwrap().push("extract");
            if self.fail_extract {
                return Err(OrderError::ProcessingError {
                    message: "nothing to read".to_string(),
                });
            }
            Ok(Vec::new())
        }

        async fn transform(&self, orders: Vec<OrderRecord>) -> Result<TransformResult> {
            self.phases.lock().unwrap().push("transform");
            Ok(TransformResult {
                orders,
                csv_output: String::new(),
                json_output: String::new(),
                summary: Vec::new(),
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok("out/orders.csv".to_string())
        }
    }

    #[tokio::test]
    async fn test_runs_phases_in_order() {
        let engine = OrderEngine::new(RecordingPipeline::default());

        let output = engine.run().await.unwrap();

        assert_eq!(output, "out/orders.csv");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let engine = OrderEngine::new(RecordingPipeline {
            fail_extract: true,
            ..Default::default()
        });

        assert!(engine.run().await.is_err());
        assert_eq!(*engine.pipeline.phases.lock().unwrap(), vec!["extract"]);
    }
}
