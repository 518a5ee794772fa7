use async_trait::async_trait;
use chrono::{Duration, Local};
use serde_json::{json, Value};

use super::{DataSource, SourceRequest};
use crate::error::AppResult;
use crate::proxy::upstream::UpstreamOutcome;

const MOCK_TEMPERATURE: f64 = 28.5;
const MOCK_CONDITION: &str = "Sunny";
const MOCK_HUMIDITY: u32 = 75;
const MOCK_RATE: f64 = 15750.50;

/// Answers with fixed or synthesized payloads, never touches the network
#[derive(Debug, Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        Self
    }

    fn payload(request: &SourceRequest) -> Value {
        match request {
            SourceRequest::Weather { city } => json!({
                "city": city,
                "temperature": MOCK_TEMPERATURE,
                "condition": MOCK_CONDITION,
                "humidity": MOCK_HUMIDITY,
                "unit": "celsius",
            }),
            SourceRequest::Currency { from, to } => json!({
                "from": from,
                "to": to,
                "rate": MOCK_RATE,
                "timestamp": Local::now().to_rfc3339(),
            }),
            SourceRequest::News { category } => {
                let today = Local::now().date_naive();
                let yesterday = today - Duration::days(1);
                json!({
                    "category": category,
                    "articles": [
                        {
                            "id": 1,
                            "title": format!("Latest {} news", category),
                            "summary": format!("Top {} headlines for {}", category, today),
                            "published_at": today.format("%Y-%m-%d").to_string(),
                        },
                        {
                            "id": 2,
                            "title": format!("{} trends to watch", category),
                            "summary": format!("A look back at {} on {}", category, yesterday),
                            "published_at": yesterday.format("%Y-%m-%d").to_string(),
                        },
                    ],
                })
            }
            SourceRequest::Data { payload } => json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "received_payload": payload,
                "created_at": Local::now().to_rfc3339(),
            }),
        }
    }
}

#[async_trait]
impl DataSource for MockSource {
    async fn fetch(&self, request: &SourceRequest) -> AppResult<UpstreamOutcome> {
        Ok(UpstreamOutcome::Ok(Self::payload(request)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
