//! Fixed-point number formatting with an explicit precision value.
//!
//! Nothing here touches stream state; every call receives the precision it uses.

/// Highest accepted precision: 0.1 nm in distance, 1e-15 degrees in angle
pub const MAX_PRECISION: u8 = 10;

/// Default number of decimals for planar coordinates
pub const DEFAULT_PRECISION: u8 = 6;

/// Decimal precision clamped into `[0, MAX_PRECISION]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision(u8);

impl Precision {
    /// Clamp a requested precision into range
    pub fn clamped(requested: i64) -> Self {
        Self(requested.clamp(0, MAX_PRECISION as i64) as u8)
    }

    /// Number of decimals
    #[inline]
    pub fn digits(self) -> usize {
        self.0 as usize
    }

    /// Number of decimals after adding `extra` more
    #[inline]
    pub fn plus(self, extra: usize) -> usize {
        self.digits() + extra
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(DEFAULT_PRECISION)
    }
}

/// Formatting options passed to each output operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatConfig {
    pub precision: Precision,
    /// Geographic pairs are read and written longitude first
    pub longfirst: bool,
}

/// Format `value` with `digits` decimals; non-finite values print as `nan`, `inf` or `-inf`
pub fn format_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{value:.digits$}")
    }
}
