//! Capture pump: the thread that pushes frames into the pipeline.
//!
//! Frames flow through a bounded channel with capacity one. When the
//! consumer is still busy, `try_send` fails and the frame is dropped on the
//! floor; dropping is the backpressure strategy, there is no queue. Delivery
//! is serialized: one pump thread per source.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::FrameSource;
use crate::frame::RawFrame;

/// Counters shared between the pump thread and the daemon's health log.
#[derive(Debug, Default)]
pub struct PumpStats {
    produced: AtomicU64,
    dropped: AtomicU64,
}

impl PumpStats {
    /// Frames captured from the source.
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Frames dropped because the consumer was busy.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle to a running capture pump.
pub struct PumpHandle {
    stop: Arc<AtomicBool>,
    stats: Arc<PumpStats>,
    join: JoinHandle<()>,
}

impl PumpHandle {
    /// Flag that stops the pump when set. Cloneable into signal handlers.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn stats(&self) -> Arc<PumpStats> {
        Arc::clone(&self.stats)
    }

    /// Stop the pump and wait for the thread to exit.
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.join.join();
    }
}

/// Spawn the capture thread.
///
/// Pulls frames from `source` at `target_fps` and pushes them into the
/// returned channel. Stops when the stop flag is set or the receiver is
/// dropped.
pub fn spawn_pump(
    mut source: Box<dyn FrameSource>,
    target_fps: u32,
) -> (PumpHandle, Receiver<RawFrame>) {
    let (tx, rx) = sync_channel::<RawFrame>(1);
    let stop = Arc::new(AtomicBool::new(false));
    let stats = Arc::new(PumpStats::default());

    let thread_stop = Arc::clone(&stop);
    let thread_stats = Arc::clone(&stats);
    let frame_interval = Duration::from_millis(1_000 / target_fps.max(1) as u64);

    let join = std::thread::spawn(move || {
        while !thread_stop.load(Ordering::SeqCst) {
            let frame = match source.next_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("capture failed: {:#}", e);
                    std::thread::sleep(frame_interval);
                    continue;
                }
            };

            thread_stats.produced.fetch_add(1, Ordering::Relaxed);
            match tx.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    thread_stats.dropped.fetch_add(1, Ordering::Relaxed);
                    log::trace!("frame dropped: consumer busy");
                }
                Err(TrySendError::Disconnected(_)) => break,
            }

            std::thread::sleep(frame_interval);
        }
        log::info!("capture pump stopped");
    });

    (
        PumpHandle { stop, stats, join },
        rx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticSource;

    #[test]
    fn pump_delivers_frames_and_stops() {
        let mut source = SyntheticSource::new("stub://pump".to_string(), 32, 32);
        source.connect().unwrap();

        let (pump, frames) = spawn_pump(Box::new(source), 100);
        let stats = pump.stats();

        let frame = frames
            .recv_timeout(Duration::from_secs(5))
            .expect("pump delivers a frame");
        assert_eq!(frame.width, 32);
        assert!(stats.produced() >= 1);

        pump.stop();
    }

    #[test]
    fn pump_exits_when_receiver_drops() {
        let mut source = SyntheticSource::new("stub://pump".to_string(), 16, 16);
        source.connect().unwrap();

        let (pump, frames) = spawn_pump(Box::new(source), 200);
        let _ = frames.recv_timeout(Duration::from_secs(5));
        drop(frames);

        // The thread notices the disconnect on its next send and exits.
        pump.stop();
    }
}
