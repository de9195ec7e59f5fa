/// Text shown in a bot entry while its reply is still in flight.
pub const REPLY_PLACEHOLDER: &str = "Typing...";

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub text: String,
    pub is_bot: bool,
}

impl ChatEntry {
    pub fn new(text: impl Into<String>, is_bot: bool) -> Self {
        Self {
            text: text.into(),
            is_bot,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn placeholder() -> Self {
        Self::bot(REPLY_PLACEHOLDER)
    }

    pub fn speaker_label(&self) -> &'static str {
        if self.is_bot {
            "Ultron"
        } else {
            "You"
        }
    }
}
