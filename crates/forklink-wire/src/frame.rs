//! Frame constants and completeness classification.
//!
//! A frame is a transient token list: magic, opcode, then category-specific
//! fields. Classification runs after every token is appended, so the decoder
//! can stop accumulating the moment the category's exact arity is reached,
//! or abandon the frame and resynchronize when it can never become valid.

use crate::opcode::{CommandOpcode, EventOpcode};

/// The reserved token separator. Never appears inside a field, because
/// fields are Base64-encoded or the single-character placeholder.
pub const SEPARATOR: u8 = b':';

/// Single-character token meaning "field intentionally absent".
pub const PLACEHOLDER: &str = "-";

/// Magic token opening every event frame (worker → coordinator).
pub const EVENT_MAGIC: &str = "forklink-event";

/// Magic token opening every command frame (coordinator → worker).
pub const COMMAND_MAGIC: &str = "forklink-command";

/// Whether a token list is a complete frame, can still become one, or never will.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCompletion {
    NotComplete,
    Complete,
    Malformed,
}

/// Classify an event-frame token list.
///
/// Malformed as soon as the magic token mismatches or the opcode token
/// resolves to no known opcode; complete exactly when the token count equals
/// the opcode category's arity.
pub fn classify_event_frame(tokens: &[String]) -> FrameCompletion {
    if !tokens.is_empty() && tokens[0] != EVENT_MAGIC {
        return FrameCompletion::Malformed;
    }

    if tokens.len() >= 2 {
        let Some(opcode) = EventOpcode::by_code(&tokens[1]) else {
            return FrameCompletion::Malformed;
        };
        if tokens.len() == opcode.category().arity() {
            return FrameCompletion::Complete;
        }
    }
    FrameCompletion::NotComplete
}

/// Classify a command-frame token list.
///
/// Commands carry either no data token (arity 2) or exactly one (arity 3),
/// fixed per opcode.
pub fn classify_command_frame(tokens: &[String]) -> FrameCompletion {
    if !tokens.is_empty() && tokens[0] != COMMAND_MAGIC {
        return FrameCompletion::Malformed;
    }

    if tokens.len() >= 2 {
        let Some(opcode) = CommandOpcode::by_code(&tokens[1]) else {
            return FrameCompletion::Malformed;
        };
        let arity = if opcode.has_data() { 3 } else { 2 };
        if tokens.len() == arity {
            return FrameCompletion::Complete;
        }
    }
    FrameCompletion::NotComplete
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_token_list_is_not_complete() {
        assert_eq!(classify_event_frame(&[]), FrameCompletion::NotComplete);
    }

    #[test]
    fn wrong_magic_is_malformed() {
        assert_eq!(
            classify_event_frame(&toks(&["BAD"])),
            FrameCompletion::Malformed
        );
        assert_eq!(
            classify_command_frame(&toks(&["BAD", "noop"])),
            FrameCompletion::Malformed
        );
    }

    #[test]
    fn unknown_opcode_is_always_malformed() {
        // Regardless of how many tokens follow.
        assert_eq!(
            classify_event_frame(&toks(&[EVENT_MAGIC, "no-such-opcode"])),
            FrameCompletion::Malformed
        );
        assert_eq!(
            classify_event_frame(&toks(&[EVENT_MAGIC, "no-such-opcode", "a", "b", "c"])),
            FrameCompletion::Malformed
        );
    }

    #[test]
    fn control_frame_completes_at_two_tokens() {
        assert_eq!(
            classify_event_frame(&toks(&[EVENT_MAGIC])),
            FrameCompletion::NotComplete
        );
        assert_eq!(
            classify_event_frame(&toks(&[EVENT_MAGIC, "bye"])),
            FrameCompletion::Complete
        );
    }

    #[test]
    fn console_frame_completes_at_exact_arity() {
        let mut tokens = toks(&[EVENT_MAGIC, "console-info", "UTF-8"]);
        assert_eq!(classify_event_frame(&tokens), FrameCompletion::NotComplete);
        tokens.push("aGk=".to_string());
        assert_eq!(classify_event_frame(&tokens), FrameCompletion::Complete);
    }

    #[test]
    fn test_lifecycle_frame_needs_fourteen_tokens() {
        let mut tokens = toks(&[EVENT_MAGIC, "test-succeeded"]);
        while tokens.len() < 13 {
            assert_eq!(classify_event_frame(&tokens), FrameCompletion::NotComplete);
            tokens.push(PLACEHOLDER.to_string());
        }
        tokens.push(PLACEHOLDER.to_string());
        assert_eq!(tokens.len(), 14);
        assert_eq!(classify_event_frame(&tokens), FrameCompletion::Complete);
    }

    #[test]
    fn command_arity_depends_on_opcode() {
        assert_eq!(
            classify_command_frame(&toks(&[COMMAND_MAGIC, "noop"])),
            FrameCompletion::Complete
        );
        assert_eq!(
            classify_command_frame(&toks(&[COMMAND_MAGIC, "run-testset"])),
            FrameCompletion::NotComplete
        );
        assert_eq!(
            classify_command_frame(&toks(&[COMMAND_MAGIC, "run-testset", "MyTest"])),
            FrameCompletion::Complete
        );
    }
}
