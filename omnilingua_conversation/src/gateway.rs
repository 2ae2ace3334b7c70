//! Session gateway: the single remote chat session and the calls made on it.

use std::sync::Arc;

use async_trait::async_trait;
use omnilingua_core::LLMProvider;
use omnilingua_core::util::{DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION, EMPTY_REPLY_FALLBACK};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::session::ChatSession;

/// Failure of a remote exchange.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote chat call failed: {0}")]
    Transport(#[from] anyhow::Error),

    #[error("no chat session available")]
    NoSession,
}

/// Owner of the remote conversational context.
#[async_trait]
pub trait SessionGateway: Send {
    /// Replace the current session with a fresh one.
    fn initialize(&mut self);

    /// Drop the current session; the next `send` creates a new one.
    fn reset(&mut self);

    /// Send one user turn and return the reply text.
    async fn send(&mut self, text: &str) -> Result<String, RemoteError>;
}

/// How new sessions are configured.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
    /// Maximum history messages replayed per request; `None` replays all
    pub history_limit: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            history_limit: None,
        }
    }
}

impl SessionConfig {
    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: String) -> Self {
        self.system_instruction = instruction;
        self
    }

    /// Set the history limit.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }
}

/// [`SessionGateway`] over an [`LLMProvider`].
pub struct ChatGateway<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    config: SessionConfig,
    session: Option<ChatSession>,
}

impl<P> ChatGateway<P>
where
    P: LLMProvider + Send + Sync,
{
    /// Create a gateway with no session yet.
    pub const fn new(provider: P, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            session: None,
        }
    }

    /// Current session, if one has been created.
    #[must_use]
    pub const fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[async_trait]
impl<P> SessionGateway for ChatGateway<P>
where
    P: LLMProvider + Send + Sync,
{
    fn initialize(&mut self) {
        let session = ChatSession::new(
            self.config.model.clone(),
            self.config.system_instruction.clone(),
        );
        info!(
            "Initialized chat session {} (model: {})",
            session.id, session.model
        );
        if let Some(previous) = self.session.replace(session) {
            debug!(
                "Discarded session {} with {} messages",
                previous.id,
                previous.message_count()
            );
        }
    }

    fn reset(&mut self) {
        if let Some(previous) = self.session.take() {
            info!("Reset chat session {}", previous.id);
        }
    }

    async fn send(&mut self, text: &str) -> Result<String, RemoteError> {
        if self.session.is_none() {
            self.initialize();
        }
        let session = self.session.as_mut().ok_or(RemoteError::NoSession)?;

        let messages = session.request_messages(text, self.config.history_limit);
        debug!(
            "Sending turn on session {} ({} messages)",
            session.id,
            messages.len()
        );

        let response = match self
            .provider
            .chat(&session.system_instruction, &messages, &session.model)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Remote chat call failed on session {}: {e:#}", session.id);
                return Err(RemoteError::Transport(e));
            }
        };

        if response.content.is_empty() {
            info!("Reply on session {} carried no text", session.id);
            return Ok(EMPTY_REPLY_FALLBACK.to_string());
        }

        session.add_exchange(text, &response.content);
        Ok(response.content)
    }
}
