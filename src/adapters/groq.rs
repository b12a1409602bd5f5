//! Groq chat-completion client (OpenAI compatible API).

use crate::core::assembler::normalize_phone;
use crate::core::fields::{HOUSE_NOT_SPECIFIED, UNKNOWN_CUSTOMER};
use crate::domain::model::{OrderRecord, Unit};
use crate::domain::ports::{ConfigProvider, OrderSource};
use crate::utils::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const BASE_PROMPT: &str = "You are an order parser for a WhatsApp fruit and vegetable business.
Extract orders from WhatsApp messages and return structured JSON data.

Each message follows pattern: [Date Time] Phone: Order details
Note: Some messages may span multiple lines. A new message starts with a timestamp in square brackets.

Products to look for:
- Ginger Tea (variations: ginger tea, Ginger tea)
- Masala Tea (variations: masala tea, masala chai, Masala Chai)
- Avocado (variations: avocado, avacado, avokado, Avacado)
- Dragon Fruit (variations: dragon fruit, Dragon fruit, dragon, Dragon)
- Cardamom

Special parsing rules:
1. \"Dragon\" alone refers to \"Dragon Fruit\"
2. \"one kg each\" or \"1 kg each\" means 1 kg for each product mentioned
3. Handle ellipsis (..., …) in messages
4. Ignore emojis
5. Multi-line messages: content continues until the next timestamp
6. If quantity is mentioned once for multiple products (e.g., \"Avocado and Dragon fruit one kg each\"), apply that quantity to each product

Extract:
- Date (DD-MM-YYYY format from square brackets)
- Time (HH:MM format from square brackets)
- Phone number (extract the full number after the time)
- Customer name (if mentioned after \"for\" or at end after dash)
- House number (format like A1-102, B1-324, A3-1319, etc. - may have hyphen or space)
- Products ordered (handle multiple products per message)
- Quantity for each product
- Unit (gm, kg, pieces)

Important:
- If a message contains multiple products, create separate entries for each product with the same customer details.
- When \"each\" is used with quantity, apply that quantity to all mentioned products.
- Be flexible with house number formats (A1 102, A1-102, B1 324, etc.)";

const SCHEMA_BLOCK: &str = r#"Return a JSON object with an "orders" array where each order has these fields:
{
  "orders": [
    {
      "date": "DD-MM-YYYY",
      "time": "HH:MM",
      "phone": "+91XXXXXXXXXX",
      "customerName": "Name or Unknown",
      "houseNumber": "A1-1023 or Not specified",
      "product": "Product Name",
      "quantity": 250,
      "unit": "gm"
    }
  ]
}"#;

const USER_PREFIX: &str = "Parse these WhatsApp orders and return structured JSON:\n\n";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteBatch {
    orders: Vec<RemoteOrder>,
}

/// 模型回傳的訂單，欄位型別不一定可靠
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteOrder {
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    phone: String,
    customer_name: Option<String>,
    house_number: Option<String>,
    product: String,
    quantity: serde_json::Value,
    unit: String,
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    custom_prompt: Option<String>,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            custom_prompt: None,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Option<Self>> {
        let Some(key) = config.api_key().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };

        let client = Self::with_timeout(key, Duration::from_secs(config.timeout_seconds()))?
            .with_endpoint(config.api_endpoint())
            .with_model(config.model())
            .with_temperature(config.temperature())
            .with_max_tokens(config.max_tokens());

        Ok(Some(match config.custom_prompt() {
            Some(prompt) => client.with_custom_prompt(prompt),
            None => client,
        }))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// 基本提示 + 自訂指示 (若有) + 輸出格式
    pub fn system_prompt(&self) -> String {
        let mut prompt = BASE_PROMPT.to_string();
        if let Some(custom) = self.custom_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            prompt.push_str("\n\nAdditional Instructions:\n");
            prompt.push_str(custom);
        }
        prompt.push_str("\n\n");
        prompt.push_str(SCHEMA_BLOCK);
        prompt
    }

    async fn complete(&self, text: &str) -> Result<String> {
        let system = self.system_prompt();
        let user = format!("{}{}", USER_PREFIX, text);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Remote response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| OrderError::InvalidResponse {
                message: "response has no choices[0].message.content".to_string(),
            })
    }
}

fn status_error(status: u16, body: String) -> OrderError {
    match status {
        401 => OrderError::AuthenticationError,
        429 => OrderError::RateLimitError,
        400 if body.contains("model_decommissioned") => OrderError::ModelDecommissioned,
        _ => OrderError::RemoteError { status, body },
    }
}

fn parse_quantity(value: &serde_json::Value) -> Option<f64> {
    let quantity = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (quantity.is_finite() && quantity > 0.0).then_some(quantity)
}

fn non_empty_or(value: Option<String>, sentinel: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

/// Maps the model's JSON answer onto order records. Any order with an
/// unreadable quantity or unit rejects the whole answer.
fn map_content(content: &str) -> Result<Vec<OrderRecord>> {
    let batch: RemoteBatch =
        serde_json::from_str(content).map_err(|e| OrderError::InvalidResponse {
            message: format!("content is not an orders object: {}", e),
        })?;

    batch
        .orders
        .into_iter()
        .map(|order| {
            let quantity =
                parse_quantity(&order.quantity).ok_or_else(|| OrderError::InvalidResponse {
                    message: format!(
                        "invalid quantity {} for {}",
                        order.quantity, order.product
                    ),
                })?;
            let unit = Unit::from_token(&order.unit).ok_or_else(|| OrderError::InvalidResponse {
                message: format!("unknown unit '{}' for {}", order.unit, order.product),
            })?;

            Ok(OrderRecord {
                date: order.date,
                time: order.time,
                phone: normalize_phone(&order.phone),
                customer_name: non_empty_or(order.customer_name, UNKNOWN_CUSTOMER),
                house_number: non_empty_or(order.house_number, HOUSE_NOT_SPECIFIED),
                product: order.product,
                quantity,
                unit,
                price_per_unit: 0.0,
                amount: 0.0,
            })
        })
        .collect()
}

#[async_trait]
impl OrderSource for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn extract_orders(&self, text: &str) -> Result<Vec<OrderRecord>> {
        let content = self.complete(text).await?;
        let orders = map_content(&content)?;
        tracing::debug!("Remote model returned {} orders", orders.len());
        Ok(orders)
    }
}
