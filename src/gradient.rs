use std::fmt;
use tracing::instrument;

/// Number of interpolated colours in a gradient.
pub const GRADIENT_STEPS: usize = 100;

/// 24-bit colour for branch annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses six hex digits, e.g. "FF8800". No leading '#'.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Running (min, max) over every heat value accepted during a run.
///
/// The empty state is the inverted sentinel `min > max`; updates are
/// monotonic, min only ever shrinks and max only ever grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Default for Range {
    fn default() -> Self {
        Self::new()
    }
}

impl Range {
    pub fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn update(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        !self.is_empty() && value >= self.min && value <= self.max
    }
}

/// Fixed-length colour ramp with percentile mapping.
///
/// Index 0 sits at the start-colour end of the ramp, index
/// `GRADIENT_STEPS - 1` at the end-colour end. The ramp is computed once at
/// construction and never changes.
#[derive(Debug, Clone)]
pub struct Gradient {
    colours: Vec<Rgb>,
}

impl Gradient {
    #[instrument(level = "debug")]
    pub fn new(start: Rgb, end: Rgb) -> Self {
        let mut colours = Vec::with_capacity(GRADIENT_STEPS);
        for i in 1..=GRADIENT_STEPS {
            let t = i as f64 / GRADIENT_STEPS as f64;
            colours.push(Rgb {
                r: blend(start.r, end.r, t),
                g: blend(start.g, end.g, t),
                b: blend(start.b, end.b, t),
            });
        }
        Self { colours }
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    pub fn colour(&self, index: usize) -> Option<Rgb> {
        self.colours.get(index).copied()
    }

    /// Position of `value` within `range`, as a gradient index.
    ///
    /// Returns None when the range is still empty or the value falls outside
    /// it. In-range values scale linearly to [0, 100); a value exactly at the
    /// top edge lands on the last colour rather than one past it.
    pub fn percent_index(value: f64, range: &Range) -> Option<usize> {
        if !range.contains(value) {
            return None;
        }
        let min = range.min()?;
        let max = range.max()?;
        let span = max - min;
        if span == 0.0 {
            return Some(0);
        }
        let scaled = (value - min) / span * GRADIENT_STEPS as f64;
        Some((scaled as usize).min(GRADIENT_STEPS - 1))
    }

    /// Maps a heat value to its ramp colour, or None ("no colour") when the
    /// value cannot be placed in the range. Callers leave the existing
    /// annotation untouched in the None case.
    pub fn map(&self, value: f64, range: &Range) -> Option<Rgb> {
        Self::percent_index(value, range).map(|index| self.colours[index])
    }
}

fn blend(start: u8, end: u8, t: f64) -> u8 {
    (start as f64 * (1.0 - t) + end as f64 * t).round() as u8
}
