//! Plain-text transcript of the chat, appended as entries complete.

use crate::core::message::ChatEntry;
use chrono::Local;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// Start logging to `log_file` if given. The file is opened once up front
    /// so an unwritable path is reported before the UI starts.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn Error>> {
        let mut logging = LoggingState {
            file_path: None,
            is_active: false,
        };
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.write_to_log(&format!(
            "## Session started {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ))?;

        Ok(format!("Logging enabled to: {path}"))
    }

    /// Append a finished entry. Bot placeholders are never logged; callers
    /// log the bot entry once its reply has arrived.
    pub fn log_entry(&self, entry: &ChatEntry) -> Result<(), Box<dyn Error>> {
        if entry.is_bot {
            self.log_message(&entry.text)
        } else {
            self.log_message(&format!("{}: {}", entry.speaker_label(), entry.text))
        }
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn Error>> {
        if !self.is_active || self.file_path.is_none() {
            return Ok(());
        }

        self.write_to_log(content)
    }

    fn write_to_log(&self, content: &str) -> Result<(), Box<dyn Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        // Write each line of content, preserving the exact formatting
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }

        // Add an empty line after each message for spacing (matching screen display)
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "off".to_string(),
            Some(path) => Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn disabled_logging_writes_nothing() {
        let logging = LoggingState::new(None).expect("state");
        assert!(!logging.is_active());
        assert_eq!(logging.get_status_string(), "off");
        logging
            .log_entry(&ChatEntry::user("hi"))
            .expect("no-op succeeds");
    }

    #[test]
    fn entries_are_appended_with_speaker_prefix() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("chat.log");
        let logging =
            LoggingState::new(Some(path.to_string_lossy().into_owned())).expect("state");
        assert!(logging.is_active());
        assert_eq!(logging.get_status_string(), "chat.log");

        logging.log_entry(&ChatEntry::user("hello")).expect("log user");
        logging
            .log_entry(&ChatEntry::bot("```sh\nls\n```"))
            .expect("log bot");

        let contents = std::fs::read_to_string(&path).expect("read log");
        assert!(contents.starts_with("## Session started "));
        assert!(contents.contains("You: hello\n\n```sh\nls\n```\n\n"));
    }

    #[test]
    fn unwritable_path_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing-dir").join("chat.log");
        assert!(LoggingState::new(Some(path.to_string_lossy().into_owned())).is_err());
    }
}
