//! Inference cadence control.
//!
//! `CadenceGate` throttles detector invocation to at most once per fixed
//! minimum interval, independent of the incoming frame rate. Frames arriving
//! between admitted calls are dropped from inference by the orchestration.

/// Decides, per incoming frame, whether an inference call is permitted now.
///
/// State is a single timestamp: the time of the last permitted call. It is
/// `None` until the first admit so the first frame is always admitted even
/// when the caller's clock starts near zero, and it only moves forward
/// (updates happen solely on admission, with a non-negative elapsed check).
pub struct CadenceGate {
    min_interval_ms: u64,
    last_admitted_ms: Option<u64>,
}

impl CadenceGate {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_admitted_ms: None,
        }
    }

    /// Admit or reject an inference call at `now_ms`.
    ///
    /// Admits when no call has been admitted yet, or when at least the
    /// minimum interval has elapsed since the last admitted call. The
    /// elapsed check uses `checked_sub`, so a clock that moves backward
    /// rejects (and never panics) until it catches back up.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        let admitted = match self.last_admitted_ms {
            None => true,
            Some(last) => now_ms
                .checked_sub(last)
                .is_some_and(|elapsed| elapsed >= self.min_interval_ms),
        };
        if admitted {
            self.last_admitted_ms = Some(now_ms);
        }
        admitted
    }

    /// Time of the last admitted call, if any.
    pub fn last_admitted_ms(&self) -> Option<u64> {
        self.last_admitted_ms
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_always_admitted() {
        let mut gate = CadenceGate::new(200);
        assert!(gate.admit(0));
        assert_eq!(gate.last_admitted_ms(), Some(0));
    }

    #[test]
    fn rejects_inside_interval_and_admits_after() {
        let mut gate = CadenceGate::new(200);
        assert!(gate.admit(0));

        // 150ms elapsed: rejected, state unchanged.
        assert!(!gate.admit(150));
        assert_eq!(gate.last_admitted_ms(), Some(0));

        // 250ms elapsed: admitted, state moves.
        assert!(gate.admit(250));
        assert_eq!(gate.last_admitted_ms(), Some(250));
    }

    #[test]
    fn recheck_with_unchanged_now_never_double_admits() {
        let mut gate = CadenceGate::new(200);
        assert!(gate.admit(500));
        assert!(!gate.admit(500));
        assert_eq!(gate.last_admitted_ms(), Some(500));
    }

    #[test]
    fn exact_interval_boundary_admits() {
        let mut gate = CadenceGate::new(200);
        assert!(gate.admit(100));
        assert!(gate.admit(300));
    }

    #[test]
    fn backward_clock_never_admits() {
        let mut gate = CadenceGate::new(200);
        assert!(gate.admit(1_000));

        // Clock jumped backward: rejected regardless of magnitude.
        assert!(!gate.admit(500));
        assert!(!gate.admit(0));
        assert_eq!(gate.last_admitted_ms(), Some(1_000));

        // Clock recovered past the interval: admitted again.
        assert!(gate.admit(1_200));
    }

    #[test]
    fn admitted_count_matches_elapsed_rule() {
        let mut gate = CadenceGate::new(100);
        let times = [0u64, 30, 90, 100, 150, 199, 210, 400];
        let admitted: Vec<u64> = times
            .iter()
            .copied()
            .filter(|&t| gate.admit(t))
            .collect();
        assert_eq!(admitted, vec![0, 100, 210, 400]);
    }
}
