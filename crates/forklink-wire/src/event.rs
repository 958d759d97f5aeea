//! Typed events and the token-list → event translation.
//!
//! Translation consumes a classified-complete frame's tokens strictly in
//! category order: run-mode tag where the category carries one, then the
//! encoding name, then the payload fields. A `-` token decodes to the absent
//! state, never to an empty string; every other field token is Base64 over
//! bytes in the frame's declared encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::encoding::TextEncoding;
use crate::error::{Result, WireError};
use crate::frame::PLACEHOLDER;
use crate::opcode::EventOpcode;

/// Which logical execution context an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunMode {
    NormalRun,
    RerunTestAfterFailure,
}

impl RunMode {
    /// Wire code. Run-mode tokens are never Base64-encoded.
    pub const fn code(self) -> &'static str {
        match self {
            RunMode::NormalRun => "normal-run",
            RunMode::RerunTestAfterFailure => "rerun-test-after-failure",
        }
    }

    /// Resolve a run mode by its wire code.
    pub fn by_code(code: &str) -> Result<Self> {
        match code {
            "normal-run" => Ok(RunMode::NormalRun),
            "rerun-test-after-failure" => Ok(RunMode::RerunTestAfterFailure),
            other => Err(WireError::UnknownRunMode(other.to_string())),
        }
    }
}

/// A raw message plus a smart-trimmed and a full rendering of a stack trace.
/// Each part is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackTrace {
    pub message: Option<String>,
    pub smart_trimmed: Option<String>,
    pub trace: Option<String>,
}

/// Payload of a test-lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportEntry {
    pub source: Option<String>,
    pub source_text: Option<String>,
    pub name: Option<String>,
    pub name_text: Option<String>,
    pub group: Option<String>,
    pub message: Option<String>,
    /// Elapsed milliseconds, absent when the worker did not measure.
    pub elapsed: Option<i32>,
    pub trace: Option<StackTrace>,
}

/// The typed result of decoding one event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ControlBye,
    ControlStopOnNextTest,
    ControlNextTest,
    ConsoleInfo { message: Option<String> },
    ConsoleDebug { message: Option<String> },
    ConsoleWarning { message: Option<String> },
    ConsoleError { trace: Option<StackTrace> },
    StdOut { run_mode: RunMode, output: Option<String> },
    StdOutEol { run_mode: RunMode, output: Option<String> },
    StdErr { run_mode: RunMode, output: Option<String> },
    StdErrEol { run_mode: RunMode, output: Option<String> },
    SysProp { run_mode: RunMode, key: Option<String>, value: Option<String> },
    TestsetStarting { run_mode: RunMode, report: ReportEntry },
    TestsetCompleted { run_mode: RunMode, report: ReportEntry },
    TestStarting { run_mode: RunMode, report: ReportEntry },
    TestSucceeded { run_mode: RunMode, report: ReportEntry },
    TestFailed { run_mode: RunMode, report: ReportEntry },
    TestSkipped { run_mode: RunMode, report: ReportEntry },
    TestError { run_mode: RunMode, report: ReportEntry },
    TestAssumptionFailure { run_mode: RunMode, report: ReportEntry },
    ProcessExitError { trace: Option<StackTrace> },
}

impl Event {
    /// The opcode this event travels under.
    pub const fn opcode(&self) -> EventOpcode {
        match self {
            Event::ControlBye => EventOpcode::Bye,
            Event::ControlStopOnNextTest => EventOpcode::StopOnNextTest,
            Event::ControlNextTest => EventOpcode::NextTest,
            Event::ConsoleInfo { .. } => EventOpcode::ConsoleInfo,
            Event::ConsoleDebug { .. } => EventOpcode::ConsoleDebug,
            Event::ConsoleWarning { .. } => EventOpcode::ConsoleWarning,
            Event::ConsoleError { .. } => EventOpcode::ConsoleError,
            Event::StdOut { .. } => EventOpcode::StdOut,
            Event::StdOutEol { .. } => EventOpcode::StdOutEol,
            Event::StdErr { .. } => EventOpcode::StdErr,
            Event::StdErrEol { .. } => EventOpcode::StdErrEol,
            Event::SysProp { .. } => EventOpcode::SysProp,
            Event::TestsetStarting { .. } => EventOpcode::TestsetStarting,
            Event::TestsetCompleted { .. } => EventOpcode::TestsetCompleted,
            Event::TestStarting { .. } => EventOpcode::TestStarting,
            Event::TestSucceeded { .. } => EventOpcode::TestSucceeded,
            Event::TestFailed { .. } => EventOpcode::TestFailed,
            Event::TestSkipped { .. } => EventOpcode::TestSkipped,
            Event::TestError { .. } => EventOpcode::TestError,
            Event::TestAssumptionFailure { .. } => EventOpcode::TestAssumptionFailure,
            Event::ProcessExitError { .. } => EventOpcode::ProcessExitError,
        }
    }

    /// The run-mode tag, for categories that carry one.
    pub const fn run_mode(&self) -> Option<RunMode> {
        match self {
            Event::StdOut { run_mode, .. }
            | Event::StdOutEol { run_mode, .. }
            | Event::StdErr { run_mode, .. }
            | Event::StdErrEol { run_mode, .. }
            | Event::SysProp { run_mode, .. }
            | Event::TestsetStarting { run_mode, .. }
            | Event::TestsetCompleted { run_mode, .. }
            | Event::TestStarting { run_mode, .. }
            | Event::TestSucceeded { run_mode, .. }
            | Event::TestFailed { run_mode, .. }
            | Event::TestSkipped { run_mode, .. }
            | Event::TestError { run_mode, .. }
            | Event::TestAssumptionFailure { run_mode, .. } => Some(*run_mode),
            _ => None,
        }
    }

    /// Translate a complete event frame's token list into a typed event.
    ///
    /// Callers must only pass token lists classified `Complete`; a wrong
    /// token count or unknown opcode comes back as an error rather than a
    /// panic so the decode loop can drop the frame.
    pub fn from_tokens(tokens: &[String]) -> Result<Event> {
        let opcode_token = tokens.get(1).ok_or(WireError::TokenCount {
            expected: 2,
            actual: tokens.len(),
        })?;
        let opcode = EventOpcode::by_code(opcode_token)
            .ok_or_else(|| WireError::UnknownOpcode(opcode_token.clone()))?;

        let expected = opcode.category().arity();
        if tokens.len() != expected {
            return Err(WireError::TokenCount {
                expected,
                actual: tokens.len(),
            });
        }
        // Data tokens after magic and opcode.
        let f = &tokens[2..];

        let event = match opcode {
            EventOpcode::Bye => Event::ControlBye,
            EventOpcode::StopOnNextTest => Event::ControlStopOnNextTest,
            EventOpcode::NextTest => Event::ControlNextTest,
            EventOpcode::ConsoleInfo => Event::ConsoleInfo {
                message: console_message(f)?,
            },
            EventOpcode::ConsoleDebug => Event::ConsoleDebug {
                message: console_message(f)?,
            },
            EventOpcode::ConsoleWarning => Event::ConsoleWarning {
                message: console_message(f)?,
            },
            EventOpcode::ConsoleError => Event::ConsoleError {
                trace: error_trace(f)?,
            },
            EventOpcode::StdOut => {
                let (run_mode, output) = stream_fields(f)?;
                Event::StdOut { run_mode, output }
            }
            EventOpcode::StdOutEol => {
                let (run_mode, output) = stream_fields(f)?;
                Event::StdOutEol { run_mode, output }
            }
            EventOpcode::StdErr => {
                let (run_mode, output) = stream_fields(f)?;
                Event::StdErr { run_mode, output }
            }
            EventOpcode::StdErrEol => {
                let (run_mode, output) = stream_fields(f)?;
                Event::StdErrEol { run_mode, output }
            }
            EventOpcode::SysProp => {
                let run_mode = RunMode::by_code(&f[0])?;
                let enc = TextEncoding::for_name(&f[1])?;
                Event::SysProp {
                    run_mode,
                    key: text_field(&f[2], enc)?,
                    value: text_field(&f[3], enc)?,
                }
            }
            EventOpcode::TestsetStarting => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestsetStarting { run_mode, report }
            }
            EventOpcode::TestsetCompleted => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestsetCompleted { run_mode, report }
            }
            EventOpcode::TestStarting => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestStarting { run_mode, report }
            }
            EventOpcode::TestSucceeded => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestSucceeded { run_mode, report }
            }
            EventOpcode::TestFailed => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestFailed { run_mode, report }
            }
            EventOpcode::TestSkipped => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestSkipped { run_mode, report }
            }
            EventOpcode::TestError => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestError { run_mode, report }
            }
            EventOpcode::TestAssumptionFailure => {
                let (run_mode, report) = report_fields(f)?;
                Event::TestAssumptionFailure { run_mode, report }
            }
            EventOpcode::ProcessExitError => Event::ProcessExitError {
                trace: error_trace(f)?,
            },
        };
        Ok(event)
    }
}

/// Decode one Base64 field, honoring the absent-value placeholder.
pub(crate) fn text_field(token: &str, encoding: TextEncoding) -> Result<Option<String>> {
    if token == PLACEHOLDER {
        return Ok(None);
    }
    let bytes = STANDARD.decode(token.as_bytes())?;
    Ok(Some(encoding.decode(&bytes)))
}

/// Decode the elapsed-time field: placeholder, or a base-10 integer.
pub(crate) fn int_field(token: &str) -> Result<Option<i32>> {
    if token == PLACEHOLDER {
        return Ok(None);
    }
    token
        .parse::<i32>()
        .map(Some)
        .map_err(|source| WireError::InvalidElapsed {
            token: token.to_string(),
            source,
        })
}

/// Decode a trace block. The block is absent as a whole when the full-trace
/// token is blank or the placeholder; otherwise all three parts decode
/// independently and any of them may still be absent.
pub(crate) fn trace_block(
    message: &str,
    smart_trimmed: &str,
    trace: &str,
    encoding: TextEncoding,
) -> Result<Option<StackTrace>> {
    if trace.trim().is_empty() || trace == PLACEHOLDER {
        return Ok(None);
    }
    Ok(Some(StackTrace {
        message: text_field(message, encoding)?,
        smart_trimmed: text_field(smart_trimmed, encoding)?,
        trace: text_field(trace, encoding)?,
    }))
}

fn console_message(f: &[String]) -> Result<Option<String>> {
    let enc = TextEncoding::for_name(&f[0])?;
    text_field(&f[1], enc)
}

fn error_trace(f: &[String]) -> Result<Option<StackTrace>> {
    let enc = TextEncoding::for_name(&f[0])?;
    trace_block(&f[1], &f[2], &f[3], enc)
}

fn stream_fields(f: &[String]) -> Result<(RunMode, Option<String>)> {
    let run_mode = RunMode::by_code(&f[0])?;
    let enc = TextEncoding::for_name(&f[1])?;
    Ok((run_mode, text_field(&f[2], enc)?))
}

fn report_fields(f: &[String]) -> Result<(RunMode, ReportEntry)> {
    let run_mode = RunMode::by_code(&f[0])?;
    let enc = TextEncoding::for_name(&f[1])?;
    let report = ReportEntry {
        source: text_field(&f[2], enc)?,
        source_text: text_field(&f[3], enc)?,
        name: text_field(&f[4], enc)?,
        name_text: text_field(&f[5], enc)?,
        group: text_field(&f[6], enc)?,
        message: text_field(&f[7], enc)?,
        elapsed: int_field(&f[8])?,
        trace: trace_block(&f[9], &f[10], &f[11], enc)?,
    };
    Ok((run_mode, report))
}
