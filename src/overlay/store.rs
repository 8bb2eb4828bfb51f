//! Shared overlay state between the pipeline and the renderer.
//!
//! The store holds the current overlay sequence and a redraw generation.
//! `replace` swaps the whole sequence and bumps the generation exactly once;
//! there are no partial updates. Single-writer discipline: only the
//! pipeline's publish task writes, and readers take whole-sequence
//! snapshots, so a partially written sequence is never observable.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::overlay::record::OverlayRecord;

#[derive(Default)]
struct StoreInner {
    records: Vec<OverlayRecord>,
    generation: u64,
}

pub struct OverlayStore {
    inner: Mutex<StoreInner>,
    redraw: Condvar,
}

impl OverlayStore {
    /// Empty store at generation zero.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            redraw: Condvar::new(),
        }
    }

    // The swap is a single assignment, so a panicking writer cannot leave a
    // half-written sequence behind; a poisoned lock is safe to enter.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the current sequence, empty or not, and signal one redraw.
    pub fn replace(&self, records: Vec<OverlayRecord>) {
        let mut inner = self.lock();
        inner.records = records;
        inner.generation += 1;
        drop(inner);
        self.redraw.notify_all();
    }

    /// Current generation and a copy of the current sequence.
    pub fn snapshot(&self) -> (u64, Vec<OverlayRecord>) {
        let inner = self.lock();
        (inner.generation, inner.records.clone())
    }

    /// Current redraw generation. Bumped exactly once per `replace`.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Block until the generation exceeds `seen` or `timeout` passes.
    /// Returns the new generation when a redraw is due.
    pub fn wait_for_redraw(&self, seen: u64, timeout: Duration) -> Option<u64> {
        let deadline = std::time::Instant::now() + timeout;
        let mut inner = self.lock();
        while inner.generation <= seen {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, _) = self
                .redraw
                .wait_timeout(inner, remaining)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            inner = guard;
        }
        Some(inner.generation)
    }
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::overlay::record::{LabelFont, OverlayRecord};
    use std::sync::Arc;

    fn record(label: &str) -> OverlayRecord {
        let font = LabelFont::fixed(14.0);
        OverlayRecord {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            label: label.to_string(),
            label_size: font.measure(label),
            color: crate::geometry::Color::rgb(255, 0, 0),
            font,
        }
    }

    #[test]
    fn starts_empty_at_generation_zero() {
        let store = OverlayStore::new();
        let (generation, records) = store.snapshot();
        assert_eq!(generation, 0);
        assert!(records.is_empty());
    }

    #[test]
    fn replace_bumps_generation_exactly_once() {
        let store = OverlayStore::new();
        store.replace(vec![record("a"), record("b")]);
        assert_eq!(store.generation(), 1);

        let (generation, records) = store.snapshot();
        assert_eq!(generation, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "a");
        assert_eq!(records[1].label, "b");
    }

    #[test]
    fn empty_replace_clears_and_still_signals() {
        let store = OverlayStore::new();
        store.replace(vec![record("stale")]);
        store.replace(Vec::new());

        let (generation, records) = store.snapshot();
        assert_eq!(generation, 2);
        assert!(records.is_empty());
    }

    #[test]
    fn wait_for_redraw_times_out_without_writes() {
        let store = OverlayStore::new();
        assert_eq!(
            store.wait_for_redraw(0, Duration::from_millis(10)),
            None
        );
    }

    #[test]
    fn wait_for_redraw_wakes_on_replace() {
        let store = Arc::new(OverlayStore::new());
        let writer = Arc::clone(&store);

        let handle = std::thread::spawn(move || {
            writer.replace(vec![record("late")]);
        });

        let generation = store.wait_for_redraw(0, Duration::from_secs(5));
        assert_eq!(generation, Some(1));
        handle.join().unwrap();
    }
}
