use log::debug;

use crate::config::TimelineConfig;

/// Movement below this many px between frames counts as standing still.
const STILL_EPSILON: f64 = 0.5;

/// Outcome of feeding one animation frame to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStatus {
    /// No programmatic scroll in flight.
    Idle,
    /// Still moving, or not yet still for long enough.
    Pending,
    /// Position held for the required number of frames; guard cleared.
    Settled,
    /// The hard timeout fired before the position settled; guard cleared.
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: u64,
    target: f64,
    started_at: f64,
    last_position: Option<f64>,
    still_frames: u32,
}

/// Guard flag plus settle polling for programmatic scrolls.
///
/// [`begin`](Self::begin) arms the guard. The host then calls
/// [`on_frame`](Self::on_frame) once per animation frame with the current
/// scroll position until it reports `Settled` or `TimedOut`. Arming again
/// while a scroll is in flight supersedes it: the older generation is no
/// longer [`is_current`](Self::is_current) and host frame loops holding it
/// should stop.
#[derive(Debug, Clone)]
pub struct SettleDetector {
    settle_frames: u32,
    timeout_ms: f64,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl SettleDetector {
    pub fn new(settle_frames: u32, timeout_ms: f64) -> Self {
        Self {
            settle_frames: settle_frames.max(1),
            timeout_ms,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn from_config(config: &TimelineConfig) -> Self {
        Self::new(config.settle_frames, config.settle_timeout_ms)
    }

    /// Apply new tuning. Any scroll in flight is dropped; generations keep
    /// counting so old ones stay stale.
    pub fn reconfigure(&mut self, config: &TimelineConfig) {
        self.settle_frames = config.settle_frames.max(1);
        self.timeout_ms = config.settle_timeout_ms;
        self.in_flight = None;
    }

    /// Arm the guard for a scroll towards `target`, started at `now` (ms).
    pub fn begin(&mut self, target: f64, now: f64) -> u64 {
        self.generation += 1;
        if let Some(previous) = self.in_flight {
            debug!(
                "scroll generation {} superseded by {} (target {} -> {target})",
                previous.generation, self.generation, previous.target
            );
        }
        self.in_flight = Some(InFlight {
            generation: self.generation,
            target,
            started_at: now,
            last_position: None,
            still_frames: 0,
        });
        self.generation
    }

    pub fn on_frame(&mut self, position: f64, now: f64) -> SettleStatus {
        let Some(flight) = self.in_flight.as_mut() else {
            return SettleStatus::Idle;
        };

        if now - flight.started_at >= self.timeout_ms {
            debug!(
                "scroll generation {} timed out after {}ms at {position}",
                flight.generation,
                now - flight.started_at
            );
            self.in_flight = None;
            return SettleStatus::TimedOut;
        }

        match flight.last_position {
            Some(last) if (position - last).abs() <= STILL_EPSILON => flight.still_frames += 1,
            _ => flight.still_frames = 0,
        }
        flight.last_position = Some(position);

        if flight.still_frames >= self.settle_frames {
            debug!("scroll generation {} settled at {position}", flight.generation);
            self.in_flight = None;
            SettleStatus::Settled
        } else {
            SettleStatus::Pending
        }
    }

    /// Drop a scroll whose timeout has passed even though no frame reported
    /// it. Hosts whose frame loop stopped would otherwise keep the guard
    /// armed forever. Returns whether a flight expired.
    pub fn expire(&mut self, now: f64) -> bool {
        match self.in_flight {
            Some(flight) if now - flight.started_at >= self.timeout_ms => {
                debug!(
                    "scroll generation {} expired without frames after {}ms",
                    flight.generation,
                    now - flight.started_at
                );
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_guarding(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight.is_some_and(|f| f.generation == generation)
    }

    /// Target of the scroll in flight.
    pub fn target(&self) -> Option<f64> {
        self.in_flight.map(|f| f.target)
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }
}
