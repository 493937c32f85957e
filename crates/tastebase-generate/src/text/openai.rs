use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{MetaDraft, MetaRequest, ReviewDraft, ReviewSlot, TextError, TextService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Client for the OpenAI Responses API.
pub struct OpenAiText {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiText")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiText {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, TextError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: format!("{}/responses", base_url.trim_end_matches('/')),
            model: model.to_string(),
            client,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, TextError> {
        let request = ResponsesRequest {
            model: &self.model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: system,
                },
                InputMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        let body: ResponsesBody = response
            .json()
            .await
            .map_err(|err| TextError::Decode(err.to_string()))?;
        let text = body.output_text();
        debug!(model = %self.model, chars = text.len(), "text service responded");
        Ok(text)
    }
}

#[async_trait]
impl TextService for OpenAiText {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn restaurant_meta(&self, request: &MetaRequest) -> Result<Vec<MetaDraft>, TextError> {
        let system = format!(
            "You write concise metadata for restaurants in Seoul.\n\
             - Return JSON lines only, one object per line: {{\"name\", \"description\", \"categories\"}}.\n\
             - categories: 1 to 3 entries chosen only from [{}].\n\
             - name: a creative shop name, 2 to 24 characters, without the district.\n\
             - description: one or two sentences under 100 characters, without the shop name.\n\
             - No commentary.",
            request.allowed_categories.join(", ")
        );
        let user = format!(
            "Create {} restaurants.\nCategory hints: {}\nDistrict hints: {}\nOutput JSON lines of {{name, description, categories}} only.",
            request.count,
            request.category_hints.join(", "),
            request.district_hints.join(", "),
        );
        let text = self.complete(&system, &user).await?;
        Ok(parse_json_lines(&text))
    }

    async fn review_texts(&self, slots: &[ReviewSlot]) -> Result<Vec<ReviewDraft>, TextError> {
        let system = "You write concise restaurant reviews.\n\
             - For each input item output ONE JSON object per line with keys slot_id, review_text, rating.\n\
             - review_text: at most 200 characters, natural tone, matching the restaurant.\n\
             - rating: a number from 0.0 to 5.0 with one decimal, consistent with the sentiment.\n\
             - Output JSON lines only.";
        let items: Vec<_> = slots
            .iter()
            .map(|slot| {
                json!({
                    "slot_id": slot.slot_id,
                    "restaurant_name": slot.name,
                    "restaurant_description": slot.description,
                })
            })
            .collect();
        let user = format!(
            "Write reviews for these items. JSON lines only:\n{}",
            serde_json::Value::Array(items)
        );
        let text = self.complete(system, &user).await?;
        Ok(parse_json_lines(&text))
    }
}

/// Decode every line that parses as `T`; other lines are ignored.
pub fn parse_json_lines<T: DeserializeOwned>(text: &str) -> Vec<T> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str(line.trim_end_matches(',')).ok())
        .collect()
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputItem {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputContent {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ResponsesBody {
    fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.kind == "message")
            .flat_map(|item| item.content.iter())
            .filter(|content| content.kind == "output_text")
            .map(|content| content.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_lines_and_skips_noise() {
        let text = "```json\n{\"slot_id\": 1, \"review_text\": \"Great\", \"rating\": 4.5}\nnot json\n{\"slot_id\": 2, \"review_text\": \"Okay\", \"rating\": 3}\n```";
        let drafts: Vec<ReviewDraft> = parse_json_lines(text);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].rating, 3.0);
    }

    #[test]
    fn collects_output_text_from_message_items() {
        let body: ResponsesBody = serde_json::from_value(json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "line one"},
                    {"type": "output_text", "text": "line two"}
                ]}
            ]
        }))
        .expect("decode body");
        assert_eq!(body.output_text(), "line one\nline two");
    }
}
