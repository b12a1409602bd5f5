use crate::core::Storage;
use crate::utils::error::{OrderError, Result};
use std::fs;
use std::path::Path;
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 讀取聊天內容，`-` 代表 stdin
pub async fn read_chat_text<S: Storage>(storage: &S, input: &str) -> Result<String> {
    let bytes = if input == "-" {
        let mut buffer = Vec::new();
        tokio::io::stdin().read_to_end(&mut buffer).await?;
        buffer
    } else {
        storage.read_file(input).await?
    };

    String::from_utf8(bytes).map_err(|e| OrderError::ProcessingError {
        message: format!("input is not valid UTF-8: {}", e),
    })
}
