use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use fincoach_core::{AgentError, ChatOptions, ChatProvider, Message, MessageRole};
use serde::de::DeserializeOwned;
use tracing::debug;

fn llm_err(e: impl ToString) -> AgentError {
    AgentError::Llm(e.to_string())
}

fn extract_content(response: CreateChatCompletionResponse) -> Result<String, AgentError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::Llm("No response content".into()))
}

/// Chat-completion provider backed by the OpenAI API.
///
/// Credentials come from the environment (`OPENAI_API_KEY`); the model is
/// chosen per call by the worker's configuration.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(default_model: &str) -> Self {
        Self {
            client: Client::new(),
            default_model: default_model.to_string(),
        }
    }

    fn build_messages(
        system_prompt: &str,
        history: &[Message],
        user_input: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(llm_err)?,
            )];

        for msg in history {
            let chat_msg = match msg.role {
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(msg.content.clone())
                        .build()
                        .map_err(llm_err)?,
                ),
                MessageRole::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(msg.content.clone())
                        .build()
                        .map_err(llm_err)?,
                ),
            };
            messages.push(chat_msg);
        }

        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(llm_err)?,
        ));

        Ok(messages)
    }

    /// Request a JSON-object completion and deserialize it into `T`.
    ///
    /// Used for delegated routing decisions, where the reply must carry a
    /// target worker, reason, and confidence score.
    pub async fn structured<T: DeserializeOwned>(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<T, AgentError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.default_model)
            .response_format(ResponseFormat::JsonObject)
            .messages(Self::build_messages(system_prompt, &[], user_input)?)
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        let content = extract_content(response)?;

        debug!("Structured response: {}", content);

        serde_json::from_str(&content).map_err(|e| {
            AgentError::Parse(format!("Failed to parse: {} - content: {}", e, content))
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn converse(
        &self,
        system_prompt: &str,
        user_message: &str,
        history: &[Message],
        options: &ChatOptions,
    ) -> Result<String, AgentError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.default_model)
            .messages(Self::build_messages(system_prompt, history, user_message)?);

        if let Some(temperature) = options.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            builder.max_tokens(max_tokens);
        }

        let request = builder.build().map_err(llm_err)?;
        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_content(response)
    }

    async fn ping(&self) -> Result<(), AgentError> {
        self.client
            .models()
            .list()
            .await
            .map_err(|e| AgentError::DependencyUnavailable(format!("chat provider: {e}")))?;
        Ok(())
    }
}
