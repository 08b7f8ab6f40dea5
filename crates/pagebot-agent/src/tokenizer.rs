//! Token cost estimation for context-window budgeting
//!
//! Approximates the provider's subword tokenizer with a bytes/4 heuristic.
//! Exactness does not matter here; determinism and monotonicity do, because
//! the window builder's budget invariant is computed from these numbers.

use pagebot_ai::ChatMessage;

/// Fixed token overhead charged per message for role/formatting tokens.
pub const MESSAGE_OVERHEAD: u32 = 4;

/// Fixed token overhead charged once per request for reply priming.
pub const REPLY_PRIMING: u32 = 2;

/// Estimate the token cost of a piece of text.
///
/// Pure and total: the same input always yields the same count, appending
/// text never lowers it, and unencodable input cannot occur (the count is
/// over bytes).
pub fn count_text(text: &str) -> u32 {
    (text.len() as u32).div_ceil(4)
}

/// Estimate the token cost of one message, including the per-message
/// overhead.
pub fn count_message(message: &ChatMessage) -> u32 {
    MESSAGE_OVERHEAD + count_text(message.role.as_str()) + count_text(&message.content)
}

/// Estimate the token cost of a full message window, including reply
/// priming.
pub fn count_window(messages: &[ChatMessage]) -> u32 {
    REPLY_PRIMING + messages.iter().map(count_message).sum::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_free() {
        assert_eq!(count_text(""), 0);
    }

    #[test]
    fn test_count_rounds_up() {
        assert_eq!(count_text("a"), 1);
        assert_eq!(count_text("abcd"), 1);
        assert_eq!(count_text("abcde"), 2);
    }

    #[test]
    fn test_count_is_deterministic() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(count_text(text), count_text(text));
    }

    #[test]
    fn test_count_monotone_under_concatenation() {
        let samples = [
            "",
            "a",
            "hello",
            "hello world",
            "Ünïcödé text with ✨ emoji",
            "a much longer sentence that should cost rather more tokens than the short ones",
            "{\"plan\": [], \"nextAction\": {\"type\": \"Respond\"}}",
        ];
        for a in samples {
            for b in samples {
                let joined = format!("{a}{b}");
                assert!(
                    count_text(&joined) >= count_text(a),
                    "count({joined:?}) < count({a:?})"
                );
                assert!(
                    count_text(&joined) >= count_text(b),
                    "count({joined:?}) < count({b:?})"
                );
            }
        }
    }

    #[test]
    fn test_message_overhead() {
        let msg = ChatMessage::user("abcd");
        // 4 overhead + 1 for "user" + 1 for the content
        assert_eq!(count_message(&msg), 6);
    }

    #[test]
    fn test_window_adds_priming() {
        let messages = vec![ChatMessage::user("abcd"), ChatMessage::assistant("efgh")];
        let per_message: u32 = messages.iter().map(count_message).sum();
        assert_eq!(count_window(&messages), per_message + REPLY_PRIMING);
    }
}
