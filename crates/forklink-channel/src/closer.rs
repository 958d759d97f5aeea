//! Reference-counted shutdown of a jointly-owned resource.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{ChannelError, Result};

type CloseFn = Box<dyn FnOnce() + Send>;

/// Coordinates the single physical close of a resource shared by multiple
/// threads.
///
/// Created with the number of cooperating holders; each holder calls
/// [`release`](SharedCloser::release) exactly once when it is done. The close
/// action runs on the transition to zero and never again; releasing past
/// zero is refused as a programming error.
#[derive(Clone)]
pub struct SharedCloser {
    remaining: Arc<AtomicUsize>,
    close: Arc<Mutex<Option<CloseFn>>>,
}

impl SharedCloser {
    pub fn new(holders: usize, close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(holders)),
            close: Arc::new(Mutex::new(Some(Box::new(close)))),
        }
    }

    /// Release one holder. Returns `Ok(true)` from the release that
    /// physically closed the resource, `Ok(false)` otherwise.
    pub fn release(&self) -> Result<bool> {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| ChannelError::ReleaseOverflow)?;

        if previous == 1 {
            let action = self
                .close
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(action) = action {
                debug!("last holder released, closing shared resource");
                action();
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Holders that have not released yet.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for SharedCloser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCloser")
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use super::*;

    #[test]
    fn closes_only_after_all_holders_release() {
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closed);
        let closer = SharedCloser::new(3, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!closer.release().unwrap());
        assert_eq!(closed.load(Ordering::SeqCst), 0);
        assert!(!closer.release().unwrap());
        assert_eq!(closed.load(Ordering::SeqCst), 0);
        assert!(closer.release().unwrap());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_past_zero_is_refused() {
        let closer = SharedCloser::new(1, || {});
        closer.release().unwrap();
        let err = closer.release().unwrap_err();
        assert!(matches!(err, ChannelError::ReleaseOverflow));
    }

    #[test]
    fn concurrent_releases_close_exactly_once() {
        const HOLDERS: usize = 16;
        let closed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closed);
        let closer = SharedCloser::new(HOLDERS, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let threads: Vec<_> = (0..HOLDERS)
            .map(|_| {
                let closer = closer.clone();
                thread::spawn(move || closer.release().unwrap())
            })
            .collect();

        let physical_closes = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|&closed_here| closed_here)
            .count();

        assert_eq!(physical_closes, 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(closer.remaining(), 0);
    }

    #[test]
    fn remaining_tracks_releases() {
        let closer = SharedCloser::new(2, || {});
        assert_eq!(closer.remaining(), 2);
        closer.release().unwrap();
        assert_eq!(closer.remaining(), 1);
    }
}
