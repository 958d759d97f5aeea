//! Frame encoders: typed events/commands → wire bytes.
//!
//! This is the worker-facing half of the codec. Encoding is infallible:
//! absent fields become the placeholder, text fields become Base64 in the
//! chosen encoding, and the separator can therefore never appear inside a
//! field token.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::command::Command;
use crate::encoding::TextEncoding;
use crate::event::{Event, ReportEntry, StackTrace};
use crate::frame::{COMMAND_MAGIC, EVENT_MAGIC, PLACEHOLDER, SEPARATOR};

/// Encode one event into a complete wire frame.
pub fn encode_event(event: &Event, encoding: TextEncoding) -> Vec<u8> {
    let mut tokens: Vec<String> = vec![EVENT_MAGIC.to_string(), event.opcode().code().to_string()];

    match event {
        Event::ControlBye | Event::ControlStopOnNextTest | Event::ControlNextTest => {}
        Event::ConsoleInfo { message }
        | Event::ConsoleDebug { message }
        | Event::ConsoleWarning { message } => {
            tokens.push(encoding.name().to_string());
            tokens.push(text_token(message.as_deref(), encoding));
        }
        Event::ConsoleError { trace } | Event::ProcessExitError { trace } => {
            tokens.push(encoding.name().to_string());
            push_trace(&mut tokens, trace.as_ref(), encoding);
        }
        Event::StdOut { run_mode, output }
        | Event::StdOutEol { run_mode, output }
        | Event::StdErr { run_mode, output }
        | Event::StdErrEol { run_mode, output } => {
            tokens.push(run_mode.code().to_string());
            tokens.push(encoding.name().to_string());
            tokens.push(text_token(output.as_deref(), encoding));
        }
        Event::SysProp {
            run_mode,
            key,
            value,
        } => {
            tokens.push(run_mode.code().to_string());
            tokens.push(encoding.name().to_string());
            tokens.push(text_token(key.as_deref(), encoding));
            tokens.push(text_token(value.as_deref(), encoding));
        }
        Event::TestsetStarting { run_mode, report }
        | Event::TestsetCompleted { run_mode, report }
        | Event::TestStarting { run_mode, report }
        | Event::TestSucceeded { run_mode, report }
        | Event::TestFailed { run_mode, report }
        | Event::TestSkipped { run_mode, report }
        | Event::TestError { run_mode, report }
        | Event::TestAssumptionFailure { run_mode, report } => {
            tokens.push(run_mode.code().to_string());
            tokens.push(encoding.name().to_string());
            push_report(&mut tokens, report, encoding);
        }
    }

    frame_bytes(&tokens)
}

/// Encode one command into a complete wire frame.
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut tokens: Vec<String> = vec![
        COMMAND_MAGIC.to_string(),
        command.opcode.code().to_string(),
    ];
    if let Some(data) = &command.data {
        tokens.push(data.clone());
    }
    frame_bytes(&tokens)
}

fn text_token(value: Option<&str>, encoding: TextEncoding) -> String {
    match value {
        None => PLACEHOLDER.to_string(),
        Some(text) => STANDARD.encode(encoding.encode(text)),
    }
}

fn push_trace(tokens: &mut Vec<String>, trace: Option<&StackTrace>, encoding: TextEncoding) {
    match trace {
        None => {
            for _ in 0..3 {
                tokens.push(PLACEHOLDER.to_string());
            }
        }
        Some(trace) => {
            tokens.push(text_token(trace.message.as_deref(), encoding));
            tokens.push(text_token(trace.smart_trimmed.as_deref(), encoding));
            tokens.push(text_token(trace.trace.as_deref(), encoding));
        }
    }
}

fn push_report(tokens: &mut Vec<String>, report: &ReportEntry, encoding: TextEncoding) {
    tokens.push(text_token(report.source.as_deref(), encoding));
    tokens.push(text_token(report.source_text.as_deref(), encoding));
    tokens.push(text_token(report.name.as_deref(), encoding));
    tokens.push(text_token(report.name_text.as_deref(), encoding));
    tokens.push(text_token(report.group.as_deref(), encoding));
    tokens.push(text_token(report.message.as_deref(), encoding));
    tokens.push(match report.elapsed {
        None => PLACEHOLDER.to_string(),
        Some(elapsed) => elapsed.to_string(),
    });
    push_trace(tokens, report.trace.as_ref(), encoding);
}

fn frame_bytes(tokens: &[String]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(|t| t.len() + 1).sum::<usize>() + 1);
    out.push(SEPARATOR);
    for token in tokens {
        out.extend_from_slice(token.as_bytes());
        out.push(SEPARATOR);
    }
    out
}
