//! Terminal front end for a conversation.
//!
//! Reads lines from stdin, submits them through the turn controller and
//! prints every turn appended since the last render. Lines typed while a
//! reply is pending are dropped, never queued.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use omnilingua_conversation::{IgnoreReason, SessionGateway, SubmitOutcome, TurnController};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

use crate::render::format_turn;

/// Commands understood by the REPL besides plain messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    Reset,
    Help,
    Exit,
}

impl ReplCommand {
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "/reset" => Some(Self::Reset),
            "/help" => Some(Self::Help),
            "/exit" | "/quit" | "exit" | "quit" => Some(Self::Exit),
            _ => None,
        }
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
Commands:
/reset - start a new conversation
/help  - show this help
/exit  - leave (also: exit, quit, Ctrl+D)

Press Enter to send. End a line with \ to continue on the next line.
"
    }
}

/// Collects input lines until one is committed.
///
/// A line ending in a backslash continues the message on the next line.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: String,
}

impl InputBuffer {
    /// Feed one line; returns the full message once it is committed,
    /// leaving the buffer empty.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(continued) = line.strip_suffix('\\') {
            self.pending.push_str(continued);
            self.pending.push('\n');
            return None;
        }
        self.pending.push_str(line);
        Some(std::mem::take(&mut self.pending))
    }

    #[must_use]
    pub const fn is_continuing(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// How a REPL run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplSummary {
    /// Turns in the conversation at exit
    pub turns: usize,
    /// Lines typed while a reply was pending, which were not sent
    pub dropped: usize,
}

pub struct Repl<G> {
    controller: Arc<TurnController<G>>,
    rendered: usize,
    dropped: usize,
}

impl<G> Repl<G>
where
    G: SessionGateway + 'static,
{
    pub const fn new(controller: Arc<TurnController<G>>) -> Self {
        Self {
            controller,
            rendered: 0,
            dropped: 0,
        }
    }

    /// Run on stdin until exit or end of input.
    pub async fn run(self) -> anyhow::Result<ReplSummary> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run on `reader` until exit or end of input.
    pub async fn run_with<R>(mut self, reader: R) -> anyhow::Result<ReplSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("=== OmniLingua ===");
        println!("Type /help for commands.\n");
        self.render_new_turns().await;

        let mut lines = reader.lines();
        let mut buffer = InputBuffer::default();

        loop {
            print!("{}", if buffer.is_continuing() { "… " } else { "> " });
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let Some(input) = buffer.push_line(&line) else {
                continue;
            };

            match ReplCommand::parse_from_text(&input) {
                Some(ReplCommand::Exit) => break,
                Some(ReplCommand::Help) => println!("{}", ReplCommand::help_text()),
                Some(ReplCommand::Reset) => {
                    if self.controller.reset().await {
                        self.rendered = 0;
                        println!("Conversation reset.\n");
                        self.render_new_turns().await;
                    }
                }
                None => {
                    if !self.submit(&input, &mut lines).await? {
                        break;
                    }
                }
            }
        }

        Ok(ReplSummary {
            turns: self.controller.turn_count().await,
            dropped: self.dropped,
        })
    }

    /// Submit `input` and wait for the reply, ticking while busy.
    ///
    /// Input keeps being read meanwhile: lines typed before the reply
    /// arrives are refused by the controller and dropped with a notice.
    /// Returns `false` when input ended or an exit was typed, after the
    /// pending reply has been rendered.
    async fn submit<R>(&mut self, input: &str, lines: &mut Lines<R>) -> anyhow::Result<bool>
    where
        R: AsyncBufRead + Unpin,
    {
        let controller = Arc::clone(&self.controller);
        let mut keep_reading = true;
        let outcome = {
            let submission = controller.submit(input);
            tokio::pin!(submission);

            let mut ticker = tokio::time::interval(Duration::from_millis(500));
            ticker.tick().await;

            loop {
                tokio::select! {
                    outcome = &mut submission => break outcome,
                    line = lines.next_line(), if keep_reading => match line? {
                        None => keep_reading = false,
                        Some(line) if ReplCommand::parse_from_text(&line)
                            == Some(ReplCommand::Exit) => keep_reading = false,
                        Some(line) => {
                            if let SubmitOutcome::Ignored(IgnoreReason::Busy) =
                                controller.submit(&line).await
                            {
                                self.dropped += 1;
                                println!("\n(still answering, not sent: {})", line.trim());
                            }
                        }
                    },
                    _ = ticker.tick() => {
                        if controller.is_busy() {
                            print!(".");
                            std::io::stdout().flush()?;
                        }
                    }
                }
            }
        };

        match outcome {
            SubmitOutcome::Completed { .. } => {
                println!();
                self.render_new_turns().await;
            }
            SubmitOutcome::Ignored(reason) => debug!("Submission ignored: {reason:?}"),
        }
        Ok(keep_reading)
    }

    /// Print every turn not yet shown.
    async fn render_new_turns(&mut self) {
        let snapshot = self.controller.snapshot().await;
        for turn in snapshot.turns.iter().skip(self.rendered) {
            println!("{}\n", format_turn(turn));
        }
        self.rendered = snapshot.turns.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use omnilingua_conversation::{ConversationStore, RemoteError};
    use tokio::io::AsyncWriteExt;
    use tokio::sync::Notify;

    /// Gateway whose first `send` waits until released.
    struct GatedGateway {
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
        sent: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SessionGateway for GatedGateway {
        fn initialize(&mut self) {}

        fn reset(&mut self) {}

        async fn send(&mut self, text: &str) -> Result<String, RemoteError> {
            self.sent.lock().unwrap().push(text.to_string());
            if let Some((started, release)) = self.gate.take() {
                started.notify_one();
                release.notified().await;
            }
            Ok(format!("reply to {text}"))
        }
    }

    #[test]
    fn test_parses_commands() {
        assert_eq!(ReplCommand::parse_from_text("/reset"), Some(ReplCommand::Reset));
        assert_eq!(ReplCommand::parse_from_text("  /HELP "), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse_from_text("quit"), Some(ReplCommand::Exit));
        assert_eq!(ReplCommand::parse_from_text("/exit"), Some(ReplCommand::Exit));
        assert_eq!(ReplCommand::parse_from_text("hello"), None);
        assert_eq!(ReplCommand::parse_from_text("/unknown"), None);
    }

    #[test]
    fn test_enter_commits_a_line() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.push_line("Hello\n"), Some("Hello".to_string()));
        assert!(!buffer.is_continuing());
    }

    #[test]
    fn test_trailing_backslash_continues() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.push_line("first \\"), None);
        assert!(buffer.is_continuing());
        assert_eq!(buffer.push_line("second\\"), None);
        assert_eq!(
            buffer.push_line("third"),
            Some("first \nsecond\nthird".to_string())
        );
        assert!(!buffer.is_continuing());
        assert_eq!(buffer.push_line(""), Some(String::new()));
    }

    #[tokio::test]
    async fn test_line_typed_while_busy_is_dropped() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let sent = Arc::new(std::sync::Mutex::new(Vec::new()));
        let gateway = GatedGateway {
            gate: Some((Arc::clone(&started), Arc::clone(&release))),
            sent: Arc::clone(&sent),
        };
        let controller = Arc::new(TurnController::new(
            gateway,
            ConversationStore::new("welcome"),
        ));
        let (mut keyboard, terminal) = tokio::io::duplex(256);

        let typist = tokio::spawn(async move {
            keyboard.write_all(b"A\n").await.unwrap();
            started.notified().await;
            keyboard.write_all(b"B\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            release.notify_one();
        });

        let summary = Repl::new(Arc::clone(&controller))
            .run_with(BufReader::new(terminal))
            .await
            .unwrap();
        typist.await.unwrap();

        assert_eq!(
            summary,
            ReplSummary {
                turns: 3,
                dropped: 1
            }
        );
        let snapshot = controller.snapshot().await;
        let texts: Vec<&str> = snapshot.turns.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["welcome", "A", "reply to A"]);
        assert_eq!(*sent.lock().unwrap(), vec!["A".to_string()]);
    }
}
