pub mod assembler;
pub mod etl;
pub mod export;
pub mod fallback;
pub mod fields;
pub mod pipeline;
pub mod products;
pub mod registry;
pub mod sanitizer;
pub mod segmenter;

pub use crate::domain::model::{OrderRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, OrderSource, Pipeline, Storage};
pub use crate::utils::error::Result;
