use omnilingua_core::Turn;
use omnilingua_core::util::DEFAULT_WELCOME_MESSAGE;

/// Append-only log of the turns shown to the user.
///
/// Always holds the welcome turn first; turns are never removed or edited
/// except by [`ConversationStore::initialize`], which starts a new log.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    turns: Vec<Turn>,
    welcome_message: String,
}

impl ConversationStore {
    #[must_use]
    pub fn new(welcome_message: impl Into<String>) -> Self {
        let mut store = Self {
            turns: Vec::new(),
            welcome_message: welcome_message.into(),
        };
        store.initialize();
        store
    }

    /// Reset to a single, freshly created welcome turn.
    pub fn initialize(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::model(self.welcome_message.clone()));
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_WELCOME_MESSAGE)
    }
}
