// 外部系統的實作 (遠端模型 API)
pub mod groq;

pub use groq::GroqClient;
