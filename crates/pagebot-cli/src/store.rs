//! Transcript persistence for the CLI host
//!
//! One conversation per JSON document under the data dir. The core's store
//! contract is full-list read/write, so every save rewrites the whole
//! message list.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use pagebot_agent::TranscriptStore;
use pagebot_ai::ChatMessage;

/// On-disk shape of one conversation
#[derive(Debug, Serialize, Deserialize)]
struct TranscriptDocument {
    id: String,
    updated_at: i64,
    messages: Vec<ChatMessage>,
}

/// Whole-document JSON store for one conversation
pub struct FileTranscriptStore {
    id: String,
    path: PathBuf,
}

impl FileTranscriptStore {
    /// Get the transcripts directory
    pub fn transcripts_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagebot")
            .join("transcripts")
    }

    /// Start a new conversation
    pub fn create() -> std::io::Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let dir = Self::transcripts_dir();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(format!("{id}.json")),
            id,
        })
    }

    /// Open an existing conversation by ID
    pub fn open(id: &str) -> std::io::Result<Self> {
        let path = Self::transcripts_dir().join(format!("{id}.json"));
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Conversation not found: {id}"),
            ));
        }
        Ok(Self {
            id: id.to_string(),
            path,
        })
    }

    /// Open a store at an explicit path
    pub fn at_path(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Conversation ID
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl TranscriptStore for FileTranscriptStore {
    fn load(&self) -> std::io::Result<Vec<ChatMessage>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let file = File::open(&self.path)?;
        let document: TranscriptDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(std::io::Error::other)?;
        Ok(document.messages)
    }

    fn save(&self, transcript: &[ChatMessage]) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let document = TranscriptDocument {
            id: self.id.clone(),
            updated_at: chrono::Utc::now().timestamp_millis(),
            messages: transcript.to_vec(),
        };
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &document).map_err(std::io::Error::other)?;
        writer.flush()
    }
}
