//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use omnilingua_config::Config;
use omnilingua_conversation::{
    ChatGateway, ConversationStore, SessionConfig, SessionGateway, TurnController,
};
use omnilingua_providers::GeminiProvider;
use tracing::info;

mod chat;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

pub type ChatController = TurnController<ChatGateway<GeminiProvider>>;

/// Build the provider, gateway and store from config.
///
/// Fails when no API key is available; that is fatal at startup.
fn init_controller(config: &Config, model: Option<String>) -> anyhow::Result<ChatController> {
    let api_key = config.provider.api_key()?;

    let mut provider =
        GeminiProvider::new(api_key).with_timeout(config.provider.request_timeout())?;
    if let Some(base_url) = &config.provider.base_url {
        provider = provider.with_base_url(base_url.clone());
    }

    let session_config = build_session_config(config, model);
    info!("Using model {}", session_config.model);

    let mut gateway = ChatGateway::new(provider, session_config);
    gateway.initialize();

    let store = ConversationStore::new(config.agent.welcome_message.clone());
    Ok(TurnController::new(gateway, store))
}

fn build_session_config(config: &Config, model: Option<String>) -> SessionConfig {
    SessionConfig::default()
        .with_model(model.unwrap_or_else(|| config.agent.model.clone()))
        .with_system_instruction(config.agent.system_instruction.clone())
        .with_history_limit(config.agent.history_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_override_wins_over_config() {
        let config = Config::default();
        let session = build_session_config(&config, Some("gemini-2.5-pro".to_string()));
        assert_eq!(session.model, "gemini-2.5-pro");
        assert_eq!(session.system_instruction, config.agent.system_instruction);

        let session = build_session_config(&config, None);
        assert_eq!(session.model, config.agent.model);
        assert!(session.history_limit.is_none());
    }
}
