use crate::core::message::ChatEntry;

/// Ordered chat transcript owned by the shell.
///
/// The history only ever grows at the end. A reply replaces the bot entry
/// created for it when the prompt was submitted.
#[derive(Debug, Default, Clone)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
    /// Bumped on every change so views can cache their layout.
    revision: u64,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's prompt followed by a bot placeholder.
    pub fn push_exchange(&mut self, prompt: impl Into<String>) {
        self.entries.push(ChatEntry::user(prompt));
        self.entries.push(ChatEntry::placeholder());
        self.revision += 1;
    }

    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
        self.revision += 1;
    }

    /// Replace the trailing bot entry with `text`.
    ///
    /// Returns `false` (and leaves the history untouched) when the last entry
    /// is not a bot entry, e.g. after the history was cleared.
    pub fn replace_last_reply(&mut self, text: impl Into<String>) -> bool {
        match self.entries.last_mut() {
            Some(entry) if entry.is_bot => {
                entry.text = text.into();
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::REPLY_PLACEHOLDER;

    #[test]
    fn exchange_appends_user_then_placeholder() {
        let mut history = ChatHistory::new();
        history.push_exchange("hi");
        assert_eq!(
            history.entries(),
            &[ChatEntry::user("hi"), ChatEntry::bot(REPLY_PLACEHOLDER)]
        );
    }

    #[test]
    fn reply_replaces_placeholder_in_place() {
        let mut history = ChatHistory::new();
        history.push_exchange("first");
        assert!(history.replace_last_reply("one"));
        history.push_exchange("second");
        assert!(history.replace_last_reply("two"));

        let texts: Vec<_> = history.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "one", "second", "two"]);
    }

    #[test]
    fn reply_after_clear_is_ignored() {
        let mut history = ChatHistory::new();
        history.push_exchange("hi");
        history.clear();
        assert!(!history.replace_last_reply("late"));
        assert!(history.is_empty());
    }

    #[test]
    fn every_change_bumps_revision() {
        let mut history = ChatHistory::new();
        let start = history.revision();
        history.push_exchange("hi");
        let after_push = history.revision();
        assert!(after_push > start);
        assert!(history.replace_last_reply("hello"));
        assert!(history.revision() > after_push);

        let before_clear = history.revision();
        history.clear();
        assert!(history.revision() > before_clear);

        let unchanged = history.revision();
        assert!(!history.replace_last_reply("late"));
        assert_eq!(history.revision(), unchanged);
    }

    #[test]
    fn reply_never_overwrites_user_entry() {
        let mut history = ChatHistory::new();
        history.push(ChatEntry::user("only me"));
        assert!(!history.replace_last_reply("bot"));
        assert_eq!(history.last(), Some(&ChatEntry::user("only me")));
    }
}
