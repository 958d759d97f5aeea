//! Background task decoding inbound event frames.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use forklink_wire::EventStreamDecoder;
use tracing::{debug, error};

use crate::channel::EventHandler;
use crate::closer::SharedCloser;
use crate::error::Result;

/// An event consumer task, not yet running.
///
/// Runs the decode loop over its inbound stream until end-of-input or an I/O
/// failure; either way it releases the shared closer on exit. Stopping an
/// in-progress read is done by closing the underlying transport (which
/// surfaces here as end-of-input), not by polling a flag. The separate
/// disable signal suppresses dispatch without terminating the loop, so
/// shared-close bookkeeping still completes during a drain-and-discard
/// shutdown.
pub struct EventConsumer {
    name: String,
    stream: Box<dyn Read + Send>,
    handler: Box<dyn EventHandler>,
    closer: SharedCloser,
    disabled: Arc<AtomicBool>,
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl EventConsumer {
    pub(crate) fn new(
        name: String,
        stream: Box<dyn Read + Send>,
        handler: Box<dyn EventHandler>,
        closer: SharedCloser,
    ) -> Self {
        Self {
            name,
            stream,
            handler,
            closer,
            disabled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Task name, used as the thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the decode loop on a named background thread.
    pub fn start(self) -> Result<EventConsumerHandle> {
        let name = self.name.clone();
        let disabled = Arc::clone(&self.disabled);
        let join = thread::Builder::new().name(name.clone()).spawn(move || {
            self.run();
        })?;
        Ok(EventConsumerHandle {
            name,
            disabled,
            join,
        })
    }

    fn run(self) {
        let EventConsumer {
            name,
            stream,
            mut handler,
            closer,
            disabled,
        } = self;

        let mut decoder = EventStreamDecoder::new(stream);
        loop {
            match decoder.next_event() {
                Ok(Some(event)) => {
                    if !disabled.load(Ordering::Acquire) {
                        handler.handle_event(event);
                    }
                }
                Ok(None) => {
                    debug!(task = %name, "event stream ended");
                    break;
                }
                // Transport teardown is the authoritative failure signal;
                // the task just ends.
                Err(err) => {
                    debug!(task = %name, %err, "event stream failed");
                    break;
                }
            }
        }

        if let Err(err) = closer.release() {
            error!(task = %name, %err, "shared closer release failed");
        }
    }
}

/// Handle to a running event consumer.
pub struct EventConsumerHandle {
    name: String,
    disabled: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl EventConsumerHandle {
    /// Suppress dispatch of further events. Frames are still decoded; the
    /// read loop keeps running until its stream closes.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Release);
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the task to end. It ends when its stream does.
    pub fn join(self) {
        if self.join.join().is_err() {
            error!(task = %self.name, "event consumer panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use forklink_wire::{encode_event, Event, TextEncoding};

    use super::*;

    fn collecting_handler(sink: Arc<Mutex<Vec<Event>>>) -> Box<dyn EventHandler> {
        Box::new(move |event: Event| {
            sink.lock().unwrap().push(event);
        })
    }

    fn wait_for<F: Fn() -> bool>(cond: F) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for condition");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn dispatches_in_order_and_releases_closer_on_eof() {
        let (mut tx, rx) = UnixStream::pair().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let closed_flag = Arc::clone(&closed);
        let closer = SharedCloser::new(1, move || closed_flag.store(true, Ordering::SeqCst));

        let consumer = EventConsumer::new(
            "events-worker-1".to_string(),
            Box::new(rx),
            collecting_handler(Arc::clone(&events)),
            closer,
        );
        let handle = consumer.start().unwrap();

        tx.write_all(&encode_event(
            &Event::ControlNextTest,
            TextEncoding::Utf8,
        ))
        .unwrap();
        tx.write_all(&encode_event(&Event::ControlBye, TextEncoding::Utf8))
            .unwrap();
        drop(tx);

        handle.join();
        assert_eq!(
            *events.lock().unwrap(),
            vec![Event::ControlNextTest, Event::ControlBye]
        );
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn disable_suppresses_dispatch_without_stopping_the_loop() {
        let (mut tx, rx) = UnixStream::pair().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let closer = SharedCloser::new(1, || {});

        let consumer = EventConsumer::new(
            "events-worker-1".to_string(),
            Box::new(rx),
            collecting_handler(Arc::clone(&events)),
            closer,
        );
        let handle = consumer.start().unwrap();

        tx.write_all(&encode_event(&Event::ControlNextTest, TextEncoding::Utf8))
            .unwrap();
        let seen = Arc::clone(&events);
        wait_for(move || seen.lock().unwrap().len() == 1);

        handle.disable();
        tx.write_all(&encode_event(&Event::ControlBye, TextEncoding::Utf8))
            .unwrap();
        drop(tx);

        handle.join();
        // Second frame decoded but not dispatched.
        assert_eq!(*events.lock().unwrap(), vec![Event::ControlNextTest]);
    }

    #[test]
    fn closer_released_even_when_stream_fails() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(std::io::ErrorKind::ConnectionReset))
            }
        }

        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        let closer = SharedCloser::new(1, move || flag.store(true, Ordering::SeqCst));

        let consumer = EventConsumer::new(
            "events-worker-1".to_string(),
            Box::new(FailingReader),
            Box::new(|_event: Event| {}),
            closer,
        );
        consumer.start().unwrap().join();
        assert!(released.load(Ordering::SeqCst));
    }
}
