//! The closed opcode sets for both directions of the wire.
//!
//! Every event opcode belongs to exactly one category, and the category fixes
//! the exact number of tokens a complete frame carries (magic and opcode
//! included). Keeping the arity here as data lets frame classification and
//! event construction be tested independently.

/// Category of an event opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// Lifecycle signals with no payload.
    Control,
    /// Console log lines from the worker.
    Console,
    /// Console error with an attached stack trace block.
    ConsoleError,
    /// Captured standard output/error of the code under execution.
    StandardStream,
    /// A system property observed in the worker.
    SystemProperty,
    /// Test lifecycle transitions carrying a report entry.
    TestLifecycle,
    /// The worker process died with an error.
    ProcessExitError,
}

impl OpCategory {
    /// Exact token count of a complete frame in this category.
    pub const fn arity(self) -> usize {
        match self {
            OpCategory::Control => 2,
            OpCategory::Console => 4,
            OpCategory::ConsoleError => 6,
            OpCategory::StandardStream => 5,
            OpCategory::SystemProperty => 6,
            OpCategory::TestLifecycle => 14,
            OpCategory::ProcessExitError => 6,
        }
    }
}

/// Event opcode (worker → coordinator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventOpcode {
    Bye,
    StopOnNextTest,
    NextTest,
    ConsoleInfo,
    ConsoleDebug,
    ConsoleWarning,
    ConsoleError,
    StdOut,
    StdOutEol,
    StdErr,
    StdErrEol,
    SysProp,
    TestsetStarting,
    TestsetCompleted,
    TestStarting,
    TestSucceeded,
    TestFailed,
    TestSkipped,
    TestError,
    TestAssumptionFailure,
    ProcessExitError,
}

impl EventOpcode {
    /// All event opcodes, in wire-table order.
    pub const ALL: [EventOpcode; 21] = [
        EventOpcode::Bye,
        EventOpcode::StopOnNextTest,
        EventOpcode::NextTest,
        EventOpcode::ConsoleInfo,
        EventOpcode::ConsoleDebug,
        EventOpcode::ConsoleWarning,
        EventOpcode::ConsoleError,
        EventOpcode::StdOut,
        EventOpcode::StdOutEol,
        EventOpcode::StdErr,
        EventOpcode::StdErrEol,
        EventOpcode::SysProp,
        EventOpcode::TestsetStarting,
        EventOpcode::TestsetCompleted,
        EventOpcode::TestStarting,
        EventOpcode::TestSucceeded,
        EventOpcode::TestFailed,
        EventOpcode::TestSkipped,
        EventOpcode::TestError,
        EventOpcode::TestAssumptionFailure,
        EventOpcode::ProcessExitError,
    ];

    /// The short textual code this opcode has on the wire.
    pub const fn code(self) -> &'static str {
        match self {
            EventOpcode::Bye => "bye",
            EventOpcode::StopOnNextTest => "stop-on-next-test",
            EventOpcode::NextTest => "next-test",
            EventOpcode::ConsoleInfo => "console-info",
            EventOpcode::ConsoleDebug => "console-debug",
            EventOpcode::ConsoleWarning => "console-warning",
            EventOpcode::ConsoleError => "console-error",
            EventOpcode::StdOut => "std-out",
            EventOpcode::StdOutEol => "std-out-eol",
            EventOpcode::StdErr => "std-err",
            EventOpcode::StdErrEol => "std-err-eol",
            EventOpcode::SysProp => "sys-prop",
            EventOpcode::TestsetStarting => "testset-starting",
            EventOpcode::TestsetCompleted => "testset-completed",
            EventOpcode::TestStarting => "test-starting",
            EventOpcode::TestSucceeded => "test-succeeded",
            EventOpcode::TestFailed => "test-failed",
            EventOpcode::TestSkipped => "test-skipped",
            EventOpcode::TestError => "test-error",
            EventOpcode::TestAssumptionFailure => "test-assumption-failure",
            EventOpcode::ProcessExitError => "process-exit-error",
        }
    }

    /// Look up an opcode by its wire code. Unknown codes are not a parse
    /// error by themselves; the containing frame is rejected as malformed.
    pub fn by_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.code() == code)
    }

    /// The category this opcode belongs to.
    pub const fn category(self) -> OpCategory {
        match self {
            EventOpcode::Bye | EventOpcode::StopOnNextTest | EventOpcode::NextTest => {
                OpCategory::Control
            }
            EventOpcode::ConsoleInfo | EventOpcode::ConsoleDebug | EventOpcode::ConsoleWarning => {
                OpCategory::Console
            }
            EventOpcode::ConsoleError => OpCategory::ConsoleError,
            EventOpcode::StdOut
            | EventOpcode::StdOutEol
            | EventOpcode::StdErr
            | EventOpcode::StdErrEol => OpCategory::StandardStream,
            EventOpcode::SysProp => OpCategory::SystemProperty,
            EventOpcode::TestsetStarting
            | EventOpcode::TestsetCompleted
            | EventOpcode::TestStarting
            | EventOpcode::TestSucceeded
            | EventOpcode::TestFailed
            | EventOpcode::TestSkipped
            | EventOpcode::TestError
            | EventOpcode::TestAssumptionFailure => OpCategory::TestLifecycle,
            EventOpcode::ProcessExitError => OpCategory::ProcessExitError,
        }
    }
}

/// Command opcode (coordinator → worker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandOpcode {
    RunTestset,
    TestsetFinished,
    SkipSinceNextTest,
    Shutdown,
    Noop,
    ByeAck,
}

impl CommandOpcode {
    /// All command opcodes.
    pub const ALL: [CommandOpcode; 6] = [
        CommandOpcode::RunTestset,
        CommandOpcode::TestsetFinished,
        CommandOpcode::SkipSinceNextTest,
        CommandOpcode::Shutdown,
        CommandOpcode::Noop,
        CommandOpcode::ByeAck,
    ];

    /// The short textual code this opcode has on the wire.
    pub const fn code(self) -> &'static str {
        match self {
            CommandOpcode::RunTestset => "run-testset",
            CommandOpcode::TestsetFinished => "testset-finished",
            CommandOpcode::SkipSinceNextTest => "skip-since-next-test",
            CommandOpcode::Shutdown => "shutdown",
            CommandOpcode::Noop => "noop",
            CommandOpcode::ByeAck => "bye-ack",
        }
    }

    /// Look up a command opcode by its wire code.
    pub fn by_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.code() == code)
    }

    /// Whether a complete frame for this opcode carries a data token.
    pub const fn has_data(self) -> bool {
        matches!(self, CommandOpcode::RunTestset | CommandOpcode::Shutdown)
    }
}
