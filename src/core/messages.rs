//! On-screen strings, looked up through an injected provider so hosts can
//! localize them.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Navigation hint shown above the table.
    Instructions,
    /// Printed after the user cancels.
    SelectionCancelled,
    /// Template with `{current}` and `{total}` placeholders.
    RowIndicator,
}

pub trait TextProvider {
    fn text(&self, key: MessageKey) -> String;

    fn row_indicator(&self, current: usize, total: usize) -> String {
        self.text(MessageKey::RowIndicator)
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishText;

impl TextProvider for EnglishText {
    fn text(&self, key: MessageKey) -> String {
        match key {
            MessageKey::Instructions => {
                "Use ↑/↓ to move, Enter to select, Esc or q to cancel.".to_string()
            }
            MessageKey::SelectionCancelled => "Selection cancelled.".to_string(),
            MessageKey::RowIndicator => "Row {current} of {total}".to_string(),
        }
    }
}

/// Overrides layered on top of a fallback provider.
pub struct ConfiguredText {
    overrides: HashMap<MessageKey, String>,
    fallback: Box<dyn TextProvider>,
}

impl ConfiguredText {
    pub fn new(fallback: Box<dyn TextProvider>) -> Self {
        Self {
            overrides: HashMap::new(),
            fallback,
        }
    }

    pub fn with(mut self, key: MessageKey, text: impl Into<String>) -> Self {
        self.overrides.insert(key, text.into());
        self
    }
}

impl TextProvider for ConfiguredText {
    fn text(&self, key: MessageKey) -> String {
        match self.overrides.get(&key) {
            Some(text) => text.clone(),
            None => self.fallback.text(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_row_indicator() {
        assert_eq!(EnglishText.row_indicator(2, 3), "Row 2 of 3");
    }

    #[test]
    fn test_override_wins() {
        let text = ConfiguredText::new(Box::new(EnglishText))
            .with(MessageKey::SelectionCancelled, "Auswahl abgebrochen.");
        assert_eq!(
            text.text(MessageKey::SelectionCancelled),
            "Auswahl abgebrochen."
        );
        assert!(text.text(MessageKey::Instructions).contains("Enter"));
    }

    #[test]
    fn test_override_template_is_filled() {
        let text = ConfiguredText::new(Box::new(EnglishText))
            .with(MessageKey::RowIndicator, "Zeile {current}/{total}");
        assert_eq!(text.row_indicator(1, 9), "Zeile 1/9");
    }
}
