//! LLM-backed IntentOracle: few-shot prompt, constrained JSON answer.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::application::prompts::{classifier_user, CLASSIFIER_SETTINGS, CLASSIFIER_SYSTEM};
use crate::domain::conversation::{JsonExtractor, Turn};
use crate::domain::foundation::SessionId;
use crate::domain::routing::{ClassificationResult, Intent};
use crate::ports::{
    AIProvider, CompletionRequest, IntentOracle, MessageRole, RequestMetadata, RoutingError,
};

/// Wire shape of the classifier answer.
#[derive(Debug, Deserialize)]
struct RouteAnswer {
    opcao: Value,
    #[serde(default)]
    justificativa: String,
}

/// Intent classifier that prompts an [`AIProvider`].
pub struct LlmIntentOracle {
    ai_provider: Arc<dyn AIProvider>,
    extractor: JsonExtractor,
}

impl LlmIntentOracle {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            extractor: JsonExtractor::new(),
        }
    }

    fn parse(&self, content: &str) -> Result<ClassificationResult, RoutingError> {
        let answer: RouteAnswer = self
            .extractor
            .extract(content)
            .map_err(|e| RoutingError::Malformed(e.to_string()))?;

        let code = match &answer.opcao {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| RoutingError::Malformed(format!("opcao is not a number: {}", answer.opcao)))?;

        // Out-of-range options go down the General path.
        Ok(ClassificationResult::new(
            Intent::from_code_or_general(code),
            answer.justificativa,
        ))
    }
}

#[async_trait]
impl IntentOracle for LlmIntentOracle {
    async fn classify(
        &self,
        session_id: &SessionId,
        text: &str,
        history: &[Turn],
    ) -> Result<ClassificationResult, RoutingError> {
        let request = CLASSIFIER_SETTINGS.apply(
            CompletionRequest::new(RequestMetadata::for_session(session_id, "router"))
                .with_system_prompt(CLASSIFIER_SYSTEM)
                .with_message(MessageRole::User, classifier_user(text, history)),
        );

        let response = self.ai_provider.complete(request).await?;
        self.parse(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};

    fn session() -> SessionId {
        SessionId::new("s-1").unwrap()
    }

    async fn classify_with(answer: &str) -> Result<ClassificationResult, RoutingError> {
        let provider = Arc::new(MockAIProvider::new().with_response(answer));
        LlmIntentOracle::new(provider)
            .classify(&session(), "Quais os sintomas da dengue?", &[])
            .await
    }

    #[tokio::test]
    async fn parses_plain_json() {
        let result = classify_with(r#"{"opcao": 1, "justificativa": "dúvida sobre dengue"}"#)
            .await
            .unwrap();
        assert_eq!(result.intent, Intent::MedicalQa);
        assert_eq!(result.rationale, "dúvida sobre dengue");
    }

    #[tokio::test]
    async fn parses_fenced_json_with_string_option() {
        let result = classify_with("```json\n{\"opcao\": \"3\"}\n```").await.unwrap();
        assert_eq!(result.intent, Intent::Intake);
        assert_eq!(result.rationale, "");
    }

    #[tokio::test]
    async fn out_of_range_option_defaults_to_general() {
        let result = classify_with(r#"{"opcao": 7, "justificativa": "?"}"#).await.unwrap();
        assert_eq!(result.intent, Intent::General);
    }

    #[tokio::test]
    async fn prose_answer_is_malformed() {
        let err = classify_with("Acho que é a opção 1").await.unwrap_err();
        assert!(matches!(err, RoutingError::Malformed(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_oracle_error() {
        let provider = Arc::new(MockAIProvider::new().with_error(MockError::AuthenticationFailed));
        let err = LlmIntentOracle::new(provider)
            .classify(&session(), "oi", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::Oracle(_)));
    }

    #[tokio::test]
    async fn sends_classifier_settings() {
        let provider = Arc::new(MockAIProvider::new().with_response(r#"{"opcao": 2}"#));
        LlmIntentOracle::new(provider.clone())
            .classify(&session(), "oi, bom dia", &[Turn::user("olá")])
            .await
            .unwrap();

        let call = &provider.get_calls()[0];
        assert_eq!(call.metadata.purpose, "router");
        assert_eq!(call.temperature, Some(0.0));
        assert_eq!(call.max_tokens, Some(200));
        assert!(call.messages[0].content.contains("oi, bom dia"));
        assert!(call.messages[0].content.contains("Usuário: olá"));
    }
}
