//! Typed commands (coordinator → worker) and their translation.

use crate::error::{Result, WireError};
use crate::opcode::CommandOpcode;

/// One command frame: an opcode plus an optional single data string.
///
/// Command data travels raw on the wire (never Base64-encoded), so it must
/// not contain the token separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub opcode: CommandOpcode,
    pub data: Option<String>,
}

impl Command {
    /// A command with no data token.
    pub fn new(opcode: CommandOpcode) -> Self {
        Self { opcode, data: None }
    }

    /// A command carrying a data token.
    pub fn with_data(opcode: CommandOpcode, data: impl Into<String>) -> Self {
        Self {
            opcode,
            data: Some(data.into()),
        }
    }

    /// Translate a complete command frame's token list.
    pub fn from_tokens(tokens: &[String]) -> Result<Command> {
        let opcode_token = tokens.get(1).ok_or(WireError::TokenCount {
            expected: 2,
            actual: tokens.len(),
        })?;
        let opcode = CommandOpcode::by_code(opcode_token)
            .ok_or_else(|| WireError::UnknownOpcode(opcode_token.clone()))?;

        let expected = if opcode.has_data() { 3 } else { 2 };
        if tokens.len() != expected {
            return Err(WireError::TokenCount {
                expected,
                actual: tokens.len(),
            });
        }
        Ok(Command {
            opcode,
            data: tokens.get(2).cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::COMMAND_MAGIC;

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dataless_command_translates() {
        let cmd = Command::from_tokens(&toks(&[COMMAND_MAGIC, "noop"])).unwrap();
        assert_eq!(cmd, Command::new(CommandOpcode::Noop));
    }

    #[test]
    fn data_command_keeps_raw_token() {
        let cmd = Command::from_tokens(&toks(&[COMMAND_MAGIC, "run-testset", "MyTest"])).unwrap();
        assert_eq!(cmd, Command::with_data(CommandOpcode::RunTestset, "MyTest"));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let err = Command::from_tokens(&toks(&[COMMAND_MAGIC, "run-testset"])).unwrap_err();
        assert!(matches!(
            err,
            WireError::TokenCount {
                expected: 3,
                actual: 2
            }
        ));
        let err = Command::from_tokens(&toks(&[COMMAND_MAGIC, "noop", "extra"])).unwrap_err();
        assert!(matches!(
            err,
            WireError::TokenCount {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn unknown_command_opcode_is_rejected() {
        let err = Command::from_tokens(&toks(&[COMMAND_MAGIC, "self-destruct"])).unwrap_err();
        assert!(matches!(err, WireError::UnknownOpcode(op) if op == "self-destruct"));
    }
}
