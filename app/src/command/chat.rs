//! Chat command: one conversation, interactive or single message.

use std::sync::Arc;

use omnilingua_config::Config;
use omnilingua_conversation::{IgnoreReason, SubmitOutcome};
use tracing::info;

use super::init_controller;
use crate::repl::Repl;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// - Loads configuration and resolves the API key
/// - Opens the chat session
/// - Runs the REPL, or sends one message and prints the reply
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let controller = Arc::new(init_controller(&config, input.model)?);

        if let Some(msg) = input.message {
            match controller.submit(&msg).await {
                SubmitOutcome::Completed { reply } if reply.is_error() => {
                    anyhow::bail!("{}", reply.text());
                }
                SubmitOutcome::Completed { reply } => println!("{}", reply.text()),
                SubmitOutcome::Ignored(IgnoreReason::Empty) => {
                    anyhow::bail!("Message is empty");
                }
                SubmitOutcome::Ignored(IgnoreReason::Busy) => {
                    anyhow::bail!("Another message is still being answered");
                }
            }
        } else {
            let summary = Repl::new(controller).run().await?;
            info!(
                "Conversation ended: {} turns, {} lines dropped while busy",
                summary.turns, summary.dropped
            );
        }

        Ok(())
    }
}
