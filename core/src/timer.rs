use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::ParseDurationError;

/// Monotonic millisecond source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `web_time`, which maps to `performance.now()` in browsers.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Accumulating stopwatch; all readings take the current time from the caller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    running_since: Option<u64>,
    accumulated_ms: u64,
    started: bool,
}

impl Stopwatch {
    pub fn start(&mut self, now_ms: u64) {
        if self.running_since.is_none() {
            self.running_since = Some(now_ms);
            self.started = true;
        }
    }

    /// Folds the running span into the accumulated time.
    pub fn pause(&mut self, now_ms: u64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += now_ms.saturating_sub(since);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let running = self
            .running_since
            .map_or(0, |since| now_ms.saturating_sub(since));
        self.accumulated_ms + running
    }
}

/// Largest hour count whose millisecond total still fits in a `u64`.
pub const MAX_HOURS: u64 = u64::MAX / 3_600_000 - 1;

/// A duration split the way the timer displays it. Precision stops at centiseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationParts {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub centis: u8,
}

impl DurationParts {
    pub fn from_ms(ms: u64) -> Self {
        let secs = ms / 1000;
        Self {
            hours: secs / 3600,
            minutes: ((secs / 60) % 60) as u8,
            seconds: (secs % 60) as u8,
            centis: ((ms % 1000) / 10) as u8,
        }
    }

    /// Saturates at `u64::MAX` for hour counts above [`MAX_HOURS`].
    pub fn to_ms(self) -> u64 {
        self.hours
            .saturating_mul(3_600_000)
            .saturating_add(u64::from(self.minutes) * 60_000)
            .saturating_add(u64::from(self.seconds) * 1000)
            .saturating_add(u64::from(self.centis) * 10)
    }
}

/// `MM:SS:CC`, or `HH:MM:SS:CC` with `show_hours`. Minutes wrap at 60 either way.
pub fn format_duration(ms: u64, show_hours: bool) -> String {
    let parts = DurationParts::from_ms(ms);
    let tail = format!(
        "{:02}:{:02}:{:02}",
        parts.minutes, parts.seconds, parts.centis
    );
    if show_hours {
        format!("{:02}:{}", parts.hours, tail)
    } else {
        tail
    }
}

pub fn parse_duration(text: &str) -> Result<DurationParts, ParseDurationError> {
    let fields: Vec<&str> = text.trim().split(':').collect();
    let (hours, rest) = match fields.as_slice() {
        [minutes, seconds, centis] => (0, [*minutes, *seconds, *centis]),
        [hours, minutes, seconds, centis] => {
            (parse_hours(hours)?, [*minutes, *seconds, *centis])
        }
        other => return Err(ParseDurationError::FieldCount(other.len())),
    };
    let [minutes, seconds, centis] = rest;
    Ok(DurationParts {
        hours,
        minutes: parse_field(minutes, Some(60))? as u8,
        seconds: parse_field(seconds, Some(60))? as u8,
        centis: parse_field(centis, Some(100))? as u8,
    })
}

fn parse_hours(field: &str) -> Result<u64, ParseDurationError> {
    if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) && field.len() > 19 {
        return Err(ParseDurationError::OutOfRange {
            field: field.to_owned(),
            limit: MAX_HOURS + 1,
        });
    }
    match parse_field(field, None)? {
        hours if hours > MAX_HOURS => Err(ParseDurationError::OutOfRange {
            field: field.to_owned(),
            limit: MAX_HOURS + 1,
        }),
        hours => Ok(hours),
    }
}

fn parse_field(field: &str, limit: Option<u64>) -> Result<u64, ParseDurationError> {
    let digits_ok = !field.is_empty()
        && field.bytes().all(|b| b.is_ascii_digit())
        && (limit.is_none() || field.len() == 2);
    if !digits_ok {
        return Err(ParseDurationError::InvalidField(field.to_owned()));
    }
    let value: u64 = field
        .parse()
        .map_err(|_| ParseDurationError::InvalidField(field.to_owned()))?;
    match limit {
        Some(limit) if value >= limit => Err(ParseDurationError::OutOfRange {
            field: field.to_owned(),
            limit,
        }),
        _ => Ok(value),
    }
}
