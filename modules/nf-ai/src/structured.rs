use crate::schema::StructuredOutput;
use crate::traits::{ChatRequest, LlmClient, Message, MessageRole};
use nf_common::AdapterErrorKind;

/// Invokes `client` with a schema-enforced prompt, retrying up to
/// `extra_attempts` times with the previous validation error fed back into
/// the next prompt. Fails with `SchemaValidation` once attempts are
/// exhausted.
pub async fn generate_structured<T: StructuredOutput>(
    client: &dyn LlmClient,
    mut messages: Vec<Message>,
    extra_attempts: u32,
) -> Result<(T, f64), AdapterErrorKind> {
    let schema = T::json_schema_strict();
    let mut total_cost = 0.0;
    let mut attempt = 0;

    loop {
        let request = ChatRequest {
            messages: messages.clone(),
            temperature: 0.3,
            max_tokens: 8192,
            json_schema: Some((T::type_name(), schema.clone())),
        };

        let response = client.chat(request).await?;
        total_cost += response.cost_usd;

        match serde_json::from_str::<T>(&response.text) {
            Ok(value) => return Ok((value, total_cost)),
            Err(parse_err) => {
                if attempt >= extra_attempts {
                    tracing::warn!(error = %parse_err, attempt, "schema validation exhausted");
                    return Err(AdapterErrorKind::SchemaValidation);
                }
                messages.push(Message {
                    role: MessageRole::Assistant,
                    content: response.text,
                });
                messages.push(Message::user(format!(
                    "Your previous response failed schema check because: {parse_err}. \
                     Return ONLY valid JSON conforming to the schema."
                )));
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Answer {
        value: u32,
    }

    struct FlakyClient {
        calls: Arc<AtomicU32>,
        fail_first_n: u32,
    }

    #[async_trait]
    impl LlmClient for FlakyClient {
        async fn chat(&self, _request: ChatRequest) -> Result<crate::traits::ChatResponse, AdapterErrorKind> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let text = if n < self.fail_first_n { "not json".to_string() } else { "{\"value\": 42}".to_string() };
            Ok(crate::traits::ChatResponse { text, cost_usd: 0.01 })
        }
    }

    #[tokio::test]
    async fn succeeds_after_feedback_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = FlakyClient { calls: calls.clone(), fail_first_n: 2 };
        let (answer, _cost) =
            generate_structured::<Answer>(&client, vec![Message::user("go")], 2).await.unwrap();
        assert_eq!(answer.value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fails_with_schema_validation_after_exhausting_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let client = FlakyClient { calls, fail_first_n: 100 };
        let err = generate_structured::<Answer>(&client, vec![Message::user("go")], 2).await.unwrap_err();
        assert_eq!(err, AdapterErrorKind::SchemaValidation);
    }
}
