//! Background expiry sweeper
//!
//! A named thread that runs a purge closure every interval until stopped.
//! Stopping wakes the thread through a condvar and joins it, so the thread
//! never outlives its owner.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

const THREAD_NAME: &str = "stashcache-sweeper";

#[derive(Default)]
struct Signal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Handle to a running sweeper thread
pub(crate) struct Sweeper {
    signal: Arc<Signal>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweeper. `purge` returns how many entries it removed.
    pub fn spawn<F>(interval: Duration, mut purge: F) -> std::io::Result<Self>
    where
        F: FnMut() -> usize + Send + 'static,
    {
        let signal = Arc::new(Signal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                debug!(?interval, "sweeper started");
                loop {
                    {
                        let mut stopped = thread_signal.stopped.lock();
                        if !*stopped {
                            thread_signal.wake.wait_for(&mut stopped, interval);
                        }
                        if *stopped {
                            break;
                        }
                    }

                    let removed = purge();
                    if removed > 0 {
                        debug!(removed, "swept expired entries");
                    } else {
                        trace!("sweep found nothing to remove");
                    }
                }
                debug!("sweeper stopped");
            })?;

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit. Safe to call twice.
    pub fn stop(&mut self) {
        {
            let mut stopped = self.signal.stopped.lock();
            *stopped = true;
        }
        self.signal.wake.notify_all();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_sweeper_ticks() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let mut sweeper = Sweeper::spawn(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        sweeper.stop();

        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_sweeper_stop_is_prompt() {
        let mut sweeper = Sweeper::spawn(Duration::from_secs(3600), || 0).unwrap();

        let start = Instant::now();
        sweeper.stop();
        assert!(start.elapsed() < Duration::from_secs(5));

        // second stop is a no-op
        sweeper.stop();
    }

    #[test]
    fn test_sweeper_no_ticks_after_stop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let sweeper = Sweeper::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();

        thread::sleep(Duration::from_millis(30));
        drop(sweeper);

        let after_stop = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }
}
