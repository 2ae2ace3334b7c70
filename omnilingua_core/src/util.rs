//! Fixed texts shared by the gateway, the controller and the config template.

/// Model used when neither the config nor the command line names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Behavioral directive attached to every chat session.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a highly intelligent, multilingual assistant. \
Your primary goal is to answer any question asked by the user accurately and helpfully. \
CRITICAL RULE: You MUST answer in the EXACT SAME LANGUAGE that the user asks in. \
If the user asks in Khmer, answer in Khmer. If the user asks in English, answer in English. \
Keep responses concise but complete, formatted in Markdown.";

/// First turn of every conversation.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello! I am OmniLingua. Ask me anything in any language \
(Khmer, English, Spanish, etc.) and I will help you.";

/// Reply text used when the endpoint succeeds without producing any text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I understood the request but could not generate a text response.";

/// User-facing text of a failed turn. The underlying error is only logged.
pub const ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";
