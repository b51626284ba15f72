//! Tick/time conversion.
//!
//! LMMS stores every position and length in ticks. The constants assume 4/4
//! and are used regardless of the project's declared time signature.

/// Ticks in one bar.
pub const TICKS_PER_BAR: i64 = 192;

/// Ticks in one beat.
pub const TICKS_PER_BEAT: i64 = 48;

/// Whole bars in `ticks`, rounding toward negative infinity.
pub fn ticks_to_bars(ticks: i64) -> i64 {
    ticks.div_euclid(TICKS_PER_BAR)
}

/// Length in whole bars, never less than one.
pub fn ticks_to_bar_length(ticks: i64) -> i64 {
    ticks_to_bars(ticks).max(1)
}

pub fn bars_to_ticks(bars: u32) -> i64 {
    i64::from(bars) * TICKS_PER_BAR
}

/// Fractional beats in `ticks`.
pub fn ticks_to_beats(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_BEAT as f64
}

/// Nearest tick for a beat value; sub-tick precision is lost.
pub fn beats_to_ticks(beats: f64) -> i64 {
    (beats * TICKS_PER_BEAT as f64).round() as i64
}

/// Ticks covered by one step when a bar is divided into `steps`.
pub fn ticks_per_step(steps: u32) -> i64 {
    TICKS_PER_BAR / i64::from(steps.max(1))
}

/// Scale a 0.0..=2.0 gain (or -1.0..=1.0 pan) to the integer percent the file stores.
pub fn to_percent(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

pub fn from_percent(percent: f64) -> f64 {
    percent / 100.0
}
