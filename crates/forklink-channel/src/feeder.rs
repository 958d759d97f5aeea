//! Background task serializing outbound command frames.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use forklink_wire::encode_command;
use tracing::{debug, error};

use crate::channel::CommandSource;
use crate::error::Result;

/// A command feeder task, not yet running.
///
/// Blocks on its source for the next command, encodes it, writes it, and
/// repeats until the source is exhausted or the stream fails. Mirrors the
/// event consumer in the opposite direction: stopping it means closing the
/// stream (or exhausting the source), and the disable signal drops commands
/// without terminating the pull loop.
pub struct CommandFeeder {
    name: String,
    stream: Box<dyn Write + Send>,
    source: Box<dyn CommandSource>,
    disabled: Arc<AtomicBool>,
}

impl std::fmt::Debug for CommandFeeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandFeeder")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CommandFeeder {
    pub(crate) fn new(
        name: String,
        stream: Box<dyn Write + Send>,
        source: Box<dyn CommandSource>,
    ) -> Self {
        Self {
            name,
            stream,
            source,
            disabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Task name, used as the thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the feed loop on a named background thread.
    pub fn start(self) -> Result<CommandFeederHandle> {
        let name = self.name.clone();
        let disabled = Arc::clone(&self.disabled);
        let join = thread::Builder::new().name(name.clone()).spawn(move || {
            self.run();
        })?;
        Ok(CommandFeederHandle {
            name,
            disabled,
            join,
        })
    }

    fn run(self) {
        let CommandFeeder {
            name,
            mut stream,
            mut source,
            disabled,
        } = self;

        while let Some(command) = source.next_command() {
            if disabled.load(Ordering::Acquire) {
                continue;
            }
            let frame = encode_command(&command);
            if let Err(err) = stream.write_all(&frame).and_then(|()| stream.flush()) {
                debug!(task = %name, %err, "command stream failed");
                return;
            }
        }
        debug!(task = %name, "command source exhausted");
    }
}

/// Handle to a running command feeder.
pub struct CommandFeederHandle {
    name: String,
    disabled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl CommandFeederHandle {
    /// Drop further commands without terminating the pull loop.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the task to end.
    pub fn join(self) {
        if self.join.join().is_err() {
            error!(task = %self.name, "command feeder panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::os::unix::net::UnixStream;

    use forklink_wire::{Command, CommandOpcode, CommandStreamDecoder};

    use super::*;

    struct VecSource(std::vec::IntoIter<Command>);

    impl CommandSource for VecSource {
        fn next_command(&mut self) -> Option<Command> {
            self.0.next()
        }
    }

    #[test]
    fn feeds_commands_until_source_exhausted() {
        let (tx, rx) = UnixStream::pair().unwrap();
        let commands = vec![
            Command::with_data(CommandOpcode::RunTestset, "MyTest"),
            Command::new(CommandOpcode::TestsetFinished),
            Command::new(CommandOpcode::ByeAck),
        ];
        let feeder = CommandFeeder::new(
            "commands-worker-1".to_string(),
            Box::new(tx),
            Box::new(VecSource(commands.clone().into_iter())),
        );
        let handle = feeder.start().unwrap();
        handle.join();

        let mut decoder = CommandStreamDecoder::new(rx);
        let mut received = Vec::new();
        while let Some(cmd) = decoder.next_command().unwrap() {
            received.push(cmd);
        }
        assert_eq!(received, commands);
    }

    #[test]
    fn stops_quietly_when_stream_breaks() {
        let (tx, rx) = UnixStream::pair().unwrap();
        drop(rx);

        // Enough writes to outrun any socket buffering and hit the error.
        let commands = vec![Command::new(CommandOpcode::Noop); 64];
        let feeder = CommandFeeder::new(
            "commands-worker-1".to_string(),
            Box::new(tx),
            Box::new(VecSource(commands.into_iter())),
        );
        feeder.start().unwrap().join();
    }

    struct MpscSource(std::sync::mpsc::Receiver<Command>);

    impl CommandSource for MpscSource {
        fn next_command(&mut self) -> Option<Command> {
            self.0.recv().ok()
        }
    }

    #[test]
    fn disable_drops_commands_without_stopping_the_loop() {
        let (stream_tx, mut stream_rx) = UnixStream::pair().unwrap();
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel();

        let feeder = CommandFeeder::new(
            "commands-worker-1".to_string(),
            Box::new(stream_tx),
            Box::new(MpscSource(cmd_rx)),
        );
        let handle = feeder.start().unwrap();

        // Disable before any command becomes available, then feed some.
        handle.disable();
        for _ in 0..4 {
            cmd_tx.send(Command::new(CommandOpcode::Noop)).unwrap();
        }
        drop(cmd_tx);
        handle.join();

        let mut buf = Vec::new();
        stream_rx.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty(), "disabled feeder must not write frames");
    }
}
