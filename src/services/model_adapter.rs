//! Uniform interface over the OpenAI-compatible chat API.
//!
//! One adapter instance is bound to one model and one response mode at
//! construction time. It does exactly one call per `generate`; retries
//! live in `crate::retry`, not here.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::config::Config;
use crate::error::AdapterError;

/// How the model is asked to shape its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseMode {
    /// Plain text (extraction and response stages).
    FreeText,
    /// JSON constrained to the judgement verdict schema.
    JsonVerdict,
}

/// Client for one model behind an OpenAI-compatible endpoint.
pub struct ModelAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    mode: ResponseMode,
    max_tokens: u32,
}

impl ModelAdapter {
    pub fn new(config: &Config, model: impl Into<String>, mode: ResponseMode) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base_url);

        let max_tokens = match mode {
            ResponseMode::FreeText => config.max_response_tokens,
            ResponseMode::JsonVerdict => config.max_judgement_tokens,
        };

        Self {
            client: Client::with_config(openai_config),
            model: model.into(),
            mode,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt with zero or more images and return the model's
    /// text. Fails with `EmptyResponse` when the call succeeds but carries
    /// no usable content.
    pub async fn generate(
        &self,
        prompt: &str,
        images: &[String],
    ) -> Result<String, AdapterError> {
        debug!(
            "calling model {} ({} chars, {} images)",
            self.model,
            prompt.len(),
            images.len()
        );

        let user_msg = if images.is_empty() {
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| self.api_error(e))?
        } else {
            let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> =
                vec![ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: prompt.to_string(),
                    },
                )];
            for url in images {
                parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: url.clone(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ));
            }
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()
                .map_err(|e| self.api_error(e))?
        };

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .max_tokens(self.max_tokens);

        if self.mode == ResponseMode::JsonVerdict {
            request_builder.response_format(verdict_response_format());
        }

        let request = request_builder.build().map_err(|e| self.api_error(e))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| self.api_error(e))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AdapterError::EmptyResponse {
                model: self.model.clone(),
            })?;

        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AdapterError::EmptyResponse {
                model: self.model.clone(),
            });
        }
        Ok(content)
    }

    fn api_error(&self, source: async_openai::error::OpenAIError) -> AdapterError {
        AdapterError::Api {
            model: self.model.clone(),
            source,
        }
    }
}

/// JSON schema matching `crate::records::Verdict`.
fn verdict_response_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: "judgement".to_string(),
            description: Some("Grading verdict for one exam response".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "extracted_final_answer": { "type": "string" },
                    "reasoning": { "type": "string" },
                    "correct": { "type": "string", "enum": ["yes", "no"] },
                    "confidence": { "type": "string" }
                },
                "required": ["extracted_final_answer", "reasoning", "correct", "confidence"],
                "additionalProperties": false
            })),
            strict: Some(true),
        },
    }
}

/// Inline a PNG payload as a `data:` URL.
pub fn png_data_url(data: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(data))
}

/// Inline a JPEG payload as a `data:` URL.
pub fn jpeg_data_url(data: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_urls_carry_mime_and_base64() {
        let url = png_data_url(&[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
        let url = jpeg_data_url(&[1, 2, 3]);
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert!(url.ends_with("AQID"));
    }

    #[test]
    fn mode_selects_token_budget() {
        let config = Config::default();
        let free = ModelAdapter::new(&config, "m", ResponseMode::FreeText);
        let judge = ModelAdapter::new(&config, "m", ResponseMode::JsonVerdict);
        assert_eq!(free.max_tokens, config.max_response_tokens);
        assert_eq!(judge.max_tokens, config.max_judgement_tokens);
        assert_eq!(free.model(), "m");
    }
}
