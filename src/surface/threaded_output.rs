//! Threaded surface output
//!
//! Messages are queued on an unbounded crossbeam channel and written by a
//! dedicated thread, so the engine never blocks on the MIDI driver. A
//! pending counter lets shutdown wait until the queue drained.

use anyhow::{Context, Result};
use crossbeam::channel::{self, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::SurfaceOutput;
use crate::midi::format_hex;

pub struct ThreadedOutput {
    tx: Option<Sender<[u8; 3]>>,
    pending: Arc<AtomicUsize>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadedOutput {
    /// Start a writer thread calling `writer` for every queued message
    pub fn spawn<W>(name: &str, mut writer: W) -> Result<Self>
    where
        W: FnMut(&[u8]) -> Result<()> + Send + 'static,
    {
        let (tx, rx) = channel::unbounded::<[u8; 3]>();
        let pending = Arc::new(AtomicUsize::new(0));
        let counter = pending.clone();

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for message in rx.iter() {
                    if let Err(e) = writer(&message) {
                        warn!("Surface write failed for {}: {}", format_hex(&message), e);
                    }
                    counter.fetch_sub(1, Ordering::AcqRel);
                }
                debug!("Surface writer thread stopped");
            })
            .context("Failed to spawn surface writer thread")?;

        Ok(Self {
            tx: Some(tx),
            pending,
            handle: Some(handle),
        })
    }

    /// Messages queued but not yet written
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

impl SurfaceOutput for ThreadedOutput {
    fn send(&mut self, message: [u8; 3]) {
        let Some(tx) = &self.tx else {
            return;
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        if tx.send(message).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            warn!("Surface writer gone, dropped {}", format_hex(&message));
        }
    }

    fn wait_drained(&mut self, timeout: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.pending() == 0 {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(poll.min(deadline - now));
        }
    }
}

impl Drop for ThreadedOutput {
    fn drop(&mut self) {
        // closing the channel ends the writer loop
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if self.pending() == 0 {
                let _ = handle.join();
            } else {
                warn!(
                    "Releasing surface writer with {} messages unwritten",
                    self.pending()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_messages_written_in_order() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = written.clone();
        let mut output = ThreadedOutput::spawn("test-writer", move |data| {
            sink.lock().unwrap().push(data.to_vec());
            Ok(())
        })
        .unwrap();

        output.send([0xB1, 0x01, 0x7F]);
        output.send([0xB1, 0x02, 0x00]);
        assert!(output.wait_drained(Duration::from_secs(2), Duration::from_millis(5)));
        assert_eq!(output.pending(), 0);

        let written = written.lock().unwrap();
        assert_eq!(
            *written,
            vec![vec![0xB1, 0x01, 0x7F], vec![0xB1, 0x02, 0x00]]
        );
    }

    #[test]
    fn test_wait_drained_times_out() {
        let mut output = ThreadedOutput::spawn("slow-writer", |_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        })
        .unwrap();

        for _ in 0..5 {
            output.send([0xB0, 0x00, 0x00]);
        }
        assert!(!output.wait_drained(Duration::from_millis(20), Duration::from_millis(5)));
        assert!(output.pending() > 0);
    }

    #[test]
    fn test_write_errors_are_counted_as_done() {
        let mut output =
            ThreadedOutput::spawn("failing-writer", |_| anyhow::bail!("port closed")).unwrap();

        output.send([0xB0, 0x5D, 0x00]);
        assert!(output.wait_drained(Duration::from_secs(2), Duration::from_millis(5)));
    }
}
