//! Pointer motion: the held-direction accumulator and the periodic pump.
//!
//! The accumulator is a running sum of the unit vectors of every held
//! movement note, packed into a single atomic so the pump can never observe
//! `x` and `y` from different updates. Sensitivity is applied when the sum
//! is read, which keeps press/release pairs exact inverses of each other.

use crate::action::{Action, Direction};
use crate::error::{Error, Result};
use crate::event::NoteState;
use crate::shutdown::ShutdownSignal;
use crate::sink::InputSink;
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default pump interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5);

/// Default pixels per tick for one held direction.
pub const DEFAULT_SENSITIVITY: f64 = 4.0;

#[inline]
fn pack(x: i32, y: i32) -> u64 {
    (u64::from(x as u32) << 32) | u64::from(y as u32)
}

#[inline]
fn unpack(v: u64) -> (i32, i32) {
    ((v >> 32) as u32 as i32, v as u32 as i32)
}

/// Sum of the currently held movement directions.
#[derive(Debug)]
pub struct MotionAccumulator {
    held: AtomicU64,
    sensitivity: f64,
}

impl MotionAccumulator {
    /// Create an accumulator at rest.
    pub fn new(sensitivity: f64) -> Self {
        Self {
            held: AtomicU64::new(pack(0, 0)),
            sensitivity,
        }
    }

    /// Pixels per tick contributed by one held direction.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Add (on) or subtract (off) a direction.
    ///
    /// Unmatched offs are applied as-is and can drive the sum negative.
    pub fn apply(&self, direction: Direction, state: NoteState) {
        let (dx, dy) = direction.unit();
        let sign = match state {
            NoteState::On => 1,
            NoteState::Off => -1,
        };

        // The closure always returns Some, so this cannot fail.
        let _ = self
            .held
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                let (x, y) = unpack(v);
                Some(pack(
                    x.wrapping_add(sign * dx),
                    y.wrapping_add(sign * dy),
                ))
            });
    }

    /// The held direction sum in unit steps.
    pub fn held(&self) -> (i32, i32) {
        unpack(self.held.load(Ordering::SeqCst))
    }

    /// The current motion vector, scaled by sensitivity. Does not reset.
    pub fn snapshot(&self) -> (f64, f64) {
        let (x, y) = self.held();
        (
            f64::from(x) * self.sensitivity,
            f64::from(y) * self.sensitivity,
        )
    }
}

impl Default for MotionAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

/// Convert a motion vector to a per-tick pixel delta.
///
/// A pure diagonal is scaled by sin 45° so it travels no faster than a
/// cardinal direction. Both axes are truncated toward zero and the
/// remainder is dropped.
pub fn pump_delta(x: f64, y: f64) -> (i32, i32) {
    let (x, y) = if x != 0.0 && x.abs() == y.abs() {
        (x * FRAC_1_SQRT_2, y * FRAC_1_SQRT_2)
    } else {
        (x, y)
    };
    (x as i32, y as i32)
}

/// Periodic task that turns the accumulator into relative mouse moves.
#[derive(Debug, Clone)]
pub struct MotionPump {
    accumulator: Arc<MotionAccumulator>,
    interval: Duration,
    emit_idle: bool,
}

impl MotionPump {
    /// Create a pump that ticks every `interval`.
    pub fn new(accumulator: Arc<MotionAccumulator>, interval: Duration) -> Self {
        Self {
            accumulator,
            interval,
            emit_idle: true,
        }
    }

    /// Whether to emit `MouseMove(0, 0)` on ticks with no motion (default on).
    pub fn emit_idle(mut self, emit_idle: bool) -> Self {
        self.emit_idle = emit_idle;
        self
    }

    /// The tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sample the accumulator once and emit the resulting move.
    ///
    /// Returns the emitted delta, or `None` if an idle tick was skipped.
    pub fn tick<S: InputSink + ?Sized>(&self, sink: &S) -> Result<Option<(i32, i32)>> {
        let (x, y) = self.accumulator.snapshot();
        let (dx, dy) = pump_delta(x, y);

        if dx == 0 && dy == 0 && !self.emit_idle {
            return Ok(None);
        }

        sink.emit(&Action::MouseMove { dx, dy })?;
        Ok(Some((dx, dy)))
    }

    /// Tick until `shutdown` is triggered.
    ///
    /// A failed injection is logged and the next tick proceeds normally. Any
    /// other error means the sink cannot work at all: it triggers `shutdown`
    /// and is returned.
    pub fn run<S: InputSink + ?Sized>(&self, sink: &S, shutdown: &ShutdownSignal) -> Result<()> {
        let mut failing = false;

        while !shutdown.is_triggered() {
            match self.tick(sink) {
                Ok(_) if failing => {
                    log::info!("mouse movement recovered");
                    failing = false;
                }
                Ok(_) => {}
                Err(e) if e.is_fatal() => {
                    shutdown.trigger();
                    return Err(e);
                }
                Err(e) if failing => log::debug!("mouse movement failed: {e}"),
                Err(e) => {
                    log::warn!("mouse movement failed: {e}");
                    failing = true;
                }
            }

            if shutdown.wait_timeout(self.interval) {
                break;
            }
        }
        Ok(())
    }

    /// Run the pump on a background thread.
    pub fn spawn<S>(self, sink: Arc<S>, shutdown: ShutdownSignal) -> Result<JoinHandle<Result<()>>>
    where
        S: InputSink + ?Sized + 'static,
    {
        thread::Builder::new()
            .name("midiator-pump".into())
            .spawn(move || self.run(&*sink, &shutdown))
            .map_err(|e| Error::ThreadError(format!("failed to spawn mouse pump: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::testing::{DeniedSink, FailingSink, RecordingSink};

    #[test]
    fn test_pack_round_trip() {
        for (x, y) in [(0, 0), (1, -1), (-4, 7), (i32::MIN, i32::MAX)] {
            assert_eq!(unpack(pack(x, y)), (x, y));
        }
    }

    #[test]
    fn test_apply_and_release() {
        let acc = MotionAccumulator::new(4.0);
        acc.apply(Direction::Right, NoteState::On);
        assert_eq!(acc.snapshot(), (4.0, 0.0));

        acc.apply(Direction::Down, NoteState::On);
        assert_eq!(acc.snapshot(), (4.0, 4.0));

        acc.apply(Direction::Right, NoteState::Off);
        assert_eq!(acc.snapshot(), (0.0, 4.0));

        acc.apply(Direction::Down, NoteState::Off);
        assert_eq!(acc.snapshot(), (0.0, 0.0));
    }

    #[test]
    fn test_press_release_is_exact_inverse() {
        let acc = MotionAccumulator::new(0.1);
        acc.apply(Direction::Left, NoteState::On);
        acc.apply(Direction::Up, NoteState::On);
        let before = acc.snapshot();

        acc.apply(Direction::Right, NoteState::On);
        acc.apply(Direction::Down, NoteState::On);
        acc.apply(Direction::Right, NoteState::Off);
        acc.apply(Direction::Down, NoteState::Off);

        assert_eq!(acc.snapshot(), before);
    }

    #[test]
    fn test_stray_off_goes_negative() {
        let acc = MotionAccumulator::new(4.0);
        acc.apply(Direction::Right, NoteState::Off);
        assert_eq!(acc.snapshot(), (-4.0, 0.0));
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let acc = MotionAccumulator::new(4.0);
        acc.apply(Direction::Left, NoteState::On);
        acc.apply(Direction::Right, NoteState::On);
        assert_eq!(acc.snapshot(), (0.0, 0.0));
    }

    #[test]
    fn test_pump_delta() {
        assert_eq!(pump_delta(4.0, 0.0), (4, 0));
        assert_eq!(pump_delta(0.0, -4.0), (0, -4));
        assert_eq!(pump_delta(4.0, 4.0), (2, 2));
        assert_eq!(pump_delta(-4.0, 4.0), (-2, 2));
        assert_eq!(pump_delta(-4.0, -4.0), (-2, -2));
        assert_eq!(pump_delta(8.0, 4.0), (8, 4));
        assert_eq!(pump_delta(0.0, 0.0), (0, 0));
    }

    #[test]
    fn test_pump_delta_drops_remainder() {
        // 1 * 0.7071 truncates to zero on every tick
        assert_eq!(pump_delta(1.0, 1.0), (0, 0));
        assert_eq!(pump_delta(0.9, 0.0), (0, 0));
        assert_eq!(pump_delta(-2.5, 0.0), (-2, 0));
    }

    #[test]
    fn test_tick_emits_move() {
        let acc = Arc::new(MotionAccumulator::new(4.0));
        let pump = MotionPump::new(acc.clone(), DEFAULT_INTERVAL);
        let sink = RecordingSink::default();

        assert_eq!(pump.tick(&sink).unwrap(), Some((0, 0)));
        acc.apply(Direction::Right, NoteState::On);
        acc.apply(Direction::Up, NoteState::On);
        assert_eq!(pump.tick(&sink).unwrap(), Some((2, -2)));

        assert_eq!(
            sink.actions(),
            vec![
                Action::MouseMove { dx: 0, dy: 0 },
                Action::MouseMove { dx: 2, dy: -2 },
            ]
        );
    }

    #[test]
    fn test_tick_skips_idle_when_configured() {
        let acc = Arc::new(MotionAccumulator::new(4.0));
        let pump = MotionPump::new(acc.clone(), DEFAULT_INTERVAL).emit_idle(false);
        let sink = RecordingSink::default();

        assert_eq!(pump.tick(&sink).unwrap(), None);
        acc.apply(Direction::Left, NoteState::On);
        assert_eq!(pump.tick(&sink).unwrap(), Some((-4, 0)));
        assert_eq!(sink.actions(), vec![Action::MouseMove { dx: -4, dy: 0 }]);
    }

    #[test]
    fn test_failed_tick_is_reported() {
        let pump = MotionPump::new(Arc::new(MotionAccumulator::default()), DEFAULT_INTERVAL);
        assert!(matches!(
            pump.tick(&FailingSink),
            Err(Error::InjectionFailed(_))
        ));
    }

    #[test]
    fn test_spawned_pump_survives_failures_and_stops() {
        let pump = MotionPump::new(
            Arc::new(MotionAccumulator::default()),
            Duration::from_millis(1),
        );
        let shutdown = ShutdownSignal::new();
        let handle = pump.spawn(Arc::new(FailingSink), shutdown.clone()).unwrap();

        thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished());

        shutdown.trigger();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_spawned_pump_emits_repeatedly() {
        let acc = Arc::new(MotionAccumulator::new(4.0));
        acc.apply(Direction::Down, NoteState::On);
        let sink = Arc::new(RecordingSink::default());
        let shutdown = ShutdownSignal::new();

        let handle = MotionPump::new(acc, Duration::from_millis(1))
            .spawn(sink.clone(), shutdown.clone())
            .unwrap();
        thread::sleep(Duration::from_millis(30));
        shutdown.trigger();
        handle.join().unwrap().unwrap();

        let actions = sink.actions();
        assert!(actions.len() >= 2);
        assert!(actions.iter().all(|a| *a == Action::MouseMove { dx: 0, dy: 4 }));
    }

    #[test]
    fn test_spawned_pump_stops_on_fatal_error() {
        let pump = MotionPump::new(
            Arc::new(MotionAccumulator::default()),
            Duration::from_millis(1),
        );
        let shutdown = ShutdownSignal::new();
        let handle = pump.spawn(Arc::new(DeniedSink), shutdown.clone()).unwrap();

        assert!(matches!(
            handle.join().unwrap(),
            Err(Error::PermissionDenied(_))
        ));
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_sensitivity_scales_snapshot() {
        let acc = MotionAccumulator::new(2.5);
        assert_eq!(acc.sensitivity(), 2.5);
        acc.apply(Direction::Up, NoteState::On);
        assert_eq!(acc.snapshot(), (0.0, -2.5));
    }
}
