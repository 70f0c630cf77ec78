//! Quadrature position feedback.
//!
//! The interrupt-visible surface is exactly one atomic edge counter.
//! Edge handlers perform a single atomic add each and never touch the
//! actuator record; translation from counts to an angle happens only on
//! the cooperative context. A read can lag the shaft by at most one
//! tick and can never tear.

use crate::config::SensorConfig;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

/// Shared quadrature edge counter.
#[derive(Debug, Default)]
pub struct QuadratureCounter {
    counts: AtomicI32,
}

impl QuadratureCounter {
    /// New counter at zero.
    pub const fn new() -> Self {
        Self {
            counts: AtomicI32::new(0),
        }
    }

    /// One forward edge. Single atomic op, interrupt safe.
    #[inline]
    pub fn tick_up(&self) {
        self.counts.fetch_add(1, Ordering::Relaxed);
    }

    /// One reverse edge. Single atomic op, interrupt safe.
    #[inline]
    pub fn tick_down(&self) {
        self.counts.fetch_sub(1, Ordering::Relaxed);
    }

    /// Running edge count.
    #[inline]
    pub fn raw(&self) -> i32 {
        self.counts.load(Ordering::Relaxed)
    }

    /// Overwrite the count. The simulation backend mirrors its modeled
    /// shaft through this; hardware paths only ever tick.
    #[inline]
    pub fn store(&self, counts: i32) {
        self.counts.store(counts, Ordering::Relaxed);
    }
}

/// Most recent position observation. `timestamp` is milliseconds since
/// controller start; both fields stay zero until the first enabled
/// control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleSample {
    /// Shaft angle [rad].
    pub radians: f64,
    /// Sample time [ms since start].
    pub timestamp: u32,
}

/// Cloneable handle a drive adapter uses to read the shaft position
/// and, in simulation, to produce it.
#[derive(Debug, Clone)]
pub struct FeedbackHandle {
    counter: Arc<QuadratureCounter>,
    counts_per_rev: u32,
}

impl FeedbackHandle {
    /// Raw edge count.
    #[inline]
    pub fn raw(&self) -> i32 {
        self.counter.raw()
    }

    /// Current shaft angle [rad].
    #[inline]
    pub fn radians(&self) -> f64 {
        f64::from(self.counter.raw()) * TAU / f64::from(self.counts_per_rev)
    }

    /// Counts per mechanical revolution.
    #[inline]
    pub fn counts_per_rev(&self) -> u32 {
        self.counts_per_rev
    }

    /// Mirror a modeled shaft angle into the counter, quantized to
    /// whole encoder ticks. Simulation-side write path.
    pub fn store_radians(&self, radians: f64) {
        let counts = (radians / TAU * f64::from(self.counts_per_rev)).round() as i32;
        self.counter.store(counts);
    }
}

/// Quadrature encoder front end owned by the control unit.
///
/// `init()` claims the pins and zeroes the counter;
/// `enable_interrupts()` arms the edge handlers. From that point the
/// counter may change between any two reads.
#[derive(Debug)]
pub struct QuadratureSensor {
    counter: Arc<QuadratureCounter>,
    config: SensorConfig,
    armed: bool,
}

impl QuadratureSensor {
    /// New sensor front end for the given wiring.
    pub fn new(config: SensorConfig) -> Self {
        Self {
            counter: Arc::new(QuadratureCounter::new()),
            config,
            armed: false,
        }
    }

    /// Claim the encoder pins and zero the counter.
    pub fn init(&mut self) {
        self.counter.store(0);
        tracing::debug!(
            pin_a = self.config.pin_a,
            pin_b = self.config.pin_b,
            resolution = self.config.resolution,
            "encoder initialized"
        );
    }

    /// Arm the edge handlers. On hardware this binds the A/B channel
    /// interrupts to the counter's tick operations.
    pub fn enable_interrupts(&mut self) {
        self.armed = true;
    }

    /// Whether the edge handlers are armed.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Translate the current count to an angle sample stamped `now_ms`.
    pub fn sample(&self, now_ms: u32) -> AngleSample {
        AngleSample {
            radians: f64::from(self.counter.raw()) * TAU
                / f64::from(self.config.counts_per_rev()),
            timestamp: now_ms,
        }
    }

    /// Handle for the drive side of the feedback loop.
    pub fn feedback(&self) -> FeedbackHandle {
        FeedbackHandle {
            counter: Arc::clone(&self.counter),
            counts_per_rev: self.config.counts_per_rev(),
        }
    }
}
