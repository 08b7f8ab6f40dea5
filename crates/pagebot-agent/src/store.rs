//! Transcript persistence boundary
//!
//! Full-list semantics: the loop reads the whole transcript at the start of
//! a round and writes the whole updated list after every mutating
//! transition. No append-only storage API is assumed.

use pagebot_ai::ChatMessage;
use parking_lot::Mutex;

/// Persists the ordered message list for one conversation
pub trait TranscriptStore: Send + Sync {
    fn load(&self) -> std::io::Result<Vec<ChatMessage>>;
    fn save(&self, transcript: &[ChatMessage]) -> std::io::Result<()>;
}

/// In-memory store, used in tests and by hosts that don't persist
#[derive(Default)]
pub struct MemoryTranscriptStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptStore for MemoryTranscriptStore {
    fn load(&self) -> std::io::Result<Vec<ChatMessage>> {
        Ok(self.messages.lock().clone())
    }

    fn save(&self, transcript: &[ChatMessage]) -> std::io::Result<()> {
        *self.messages.lock() = transcript.to_vec();
        Ok(())
    }
}
