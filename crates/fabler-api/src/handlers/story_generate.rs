use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use fabler_core::{AppError, MonthKey};
use fabler_db::CreditLedger;
use fabler_genai::{ChatClient, ChatMessage, ChatOptions};
use fabler_pipeline::prompt::{story_system_prompt, story_user_prompt};
use fabler_pipeline::StoryPreferences;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateStoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub genre: String,
    #[validate(length(min = 1, max = 100))]
    pub age_group: String,
    #[validate(length(min = 1, max = 500))]
    pub moral: String,
    pub character_name1: Option<String>,
    pub character_name2: Option<String>,
    pub tone: Option<String>,
    pub reading_level: Option<String>,
    pub length_preference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateStoryResponse {
    /// Raw story text; the client saves it via the stories endpoint after review.
    pub story: String,
}

/// Generate the story text and record one credit for the current month.
/// The credit is only recorded after the completion succeeds.
pub(crate) async fn generate_and_record(
    chat: &ChatClient,
    ledger: &dyn CreditLedger,
    model: &str,
    user_id: Uuid,
    preferences: &StoryPreferences,
) -> Result<String, AppError> {
    let messages = [
        ChatMessage::system(story_system_prompt()),
        ChatMessage::user(story_user_prompt(preferences)),
    ];
    let options = ChatOptions {
        temperature: 0.8,
        presence_penalty: 0.3,
        frequency_penalty: 0.3,
        max_tokens: None,
    };

    let story = chat.complete(model, &messages, &options).await?;

    ledger.add_credits(user_id, &MonthKey::current(), 1).await?;

    Ok(story)
}

#[utoipa::path(
    post,
    path = "/api/v1/stories/generate",
    tag = "stories",
    request_body = GenerateStoryRequest,
    responses(
        (status = 200, description = "Story generated", body = GenerateStoryResponse),
        (status = 400, description = "Invalid preferences", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 502, description = "Generation provider failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "generate_story")
)]
pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<GenerateStoryRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(fabler_core::AppError::from)?;

    let preferences = StoryPreferences {
        genre: request.genre,
        age_group: request.age_group,
        moral: request.moral,
        character_name1: request.character_name1,
        character_name2: request.character_name2,
        tone: request.tone,
        reading_level: request.reading_level,
        length_preference: request.length_preference,
    };

    let story = generate_and_record(
        &state.gen.chat,
        state.db.ledger.as_ref(),
        &state.config.chat_model,
        user.user_id,
        &preferences,
    )
    .await?;

    Ok(Json(GenerateStoryResponse { story }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct InMemoryLedger {
        rows: Mutex<HashMap<(Uuid, String), i32>>,
    }

    impl InMemoryLedger {
        fn new() -> Self {
            InMemoryLedger {
                rows: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CreditLedger for InMemoryLedger {
        async fn add_credits(
            &self,
            user_id: Uuid,
            month: &MonthKey,
            amount: i32,
        ) -> Result<i32, AppError> {
            let mut rows = self.rows.lock().await;
            let total = rows
                .entry((user_id, month.as_str().to_string()))
                .or_insert(0);
            *total += amount;
            Ok(*total)
        }

        async fn usage(&self, user_id: Uuid, month: &MonthKey) -> Result<i32, AppError> {
            let rows = self.rows.lock().await;
            Ok(rows
                .get(&(user_id, month.as_str().to_string()))
                .copied()
                .unwrap_or(0))
        }
    }

    fn preferences() -> StoryPreferences {
        StoryPreferences {
            genre: "fable".to_string(),
            age_group: "kids".to_string(),
            moral: "courage".to_string(),
            character_name1: Some("Fox".to_string()),
            character_name2: None,
            tone: None,
            reading_level: None,
            length_preference: None,
        }
    }

    #[tokio::test]
    async fn test_generation_returns_story_and_records_one_credit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "The Brave Fox\n\nOnce upon a time...\n\nMoral: Courage matters."}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let chat = ChatClient::new(server.url(), "test-key".to_string()).unwrap();
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();

        let story = generate_and_record(&chat, &ledger, "gpt-4o-mini", user_id, &preferences())
            .await
            .unwrap();

        assert!(!story.trim().is_empty());
        assert!(story.contains("Once upon a time"));
        assert_eq!(ledger.usage(user_id, &MonthKey::current()).await.unwrap(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_generation_records_no_credit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body(r#"{"error": {"message": "upstream down"}}"#)
            .create_async()
            .await;

        let chat = ChatClient::new(server.url(), "test-key".to_string()).unwrap();
        let ledger = InMemoryLedger::new();
        let user_id = Uuid::new_v4();

        let err = generate_and_record(&chat, &ledger, "gpt-4o-mini", user_id, &preferences())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Generation(_)));
        assert_eq!(ledger.usage(user_id, &MonthKey::current()).await.unwrap(), 0);
    }
}
