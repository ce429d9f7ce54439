//! The `M73` build-progress directive
//!
//! See https://reprap.org/wiki/G-code#M73:_Set.2FGet_build_percentage

use uom::si::f64::Time;
use uom::si::time::{minute, second};

/// Comment attached to the directive written at the start of the file
pub const TOTAL_TIME_COMMENT: &str = "set total time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct M73 {
    pub percent: i64,
    pub remaining_minutes: i64,
    pub comment: Option<&'static str>,
}

impl M73 {
    /// Directive announcing the full print duration before any progress.
    ///
    /// `None` when the minutes do not fit an `i64`.
    pub fn total(total: Time) -> Option<Self> {
        Some(Self {
            percent: 0,
            remaining_minutes: whole_minutes(total)?,
            comment: Some(TOTAL_TIME_COMMENT),
        })
    }

    /// Progress at `elapsed` into a print of `total`.
    ///
    /// Remaining time goes negative when the slicer's estimate drifts past
    /// the total; it is not clamped. `None` when either value does not fit
    /// an `i64`.
    pub fn progress(elapsed: Time, total: Time) -> Option<Self> {
        let ratio = elapsed.get::<second>() * 100.0 / total.get::<second>();
        Some(Self {
            percent: round_to_int(ratio)?,
            remaining_minutes: whole_minutes(total - elapsed)?,
            comment: None,
        })
    }
}

impl std::fmt::Display for M73 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "M73 P{} R{}", self.percent, self.remaining_minutes)?;
        if let Some(comment) = self.comment {
            write!(f, " ; {}", comment)?;
        }
        Ok(())
    }
}

pub fn seconds(value: f64) -> Time {
    Time::new::<second>(value)
}

fn whole_minutes(time: Time) -> Option<i64> {
    round_to_int(time.get::<minute>())
}

// Half away from zero; `as` also folds -0.0 into 0.
// i64::MAX as f64 is 2^63, itself out of range.
fn round_to_int(value: f64) -> Option<i64> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}
