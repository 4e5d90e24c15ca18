//! Parameter metadata: ranges, units, normalization curves and flags.
//!
//! Every [`Parameter`](crate::Parameter) carries a [`ParamDescriptor`] that
//! describes how its plain value maps to the host-facing normalized
//! \[0.0, 1.0\] range, how it should be displayed, and which capabilities a
//! host may rely on.
//!
//! # Example
//!
//! ```rust
//! use paramsync_core::{ParamDescriptor, ParamScale, ParamUnit};
//!
//! let cutoff = ParamDescriptor::new("Cutoff", 20.0, 20000.0, 1000.0)
//!     .with_unit(ParamUnit::Hertz)
//!     .with_scale(ParamScale::Logarithmic);
//!
//! assert!((cutoff.normalize(20.0) - 0.0).abs() < 1e-9);
//! assert!((cutoff.denormalize(1.0) - 20000.0).abs() < 1e-6);
//! ```

/// Scaling curve for parameter normalization.
///
/// # Normalization Formulas
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min)).powf(1.0 / exp)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default). Equal resolution across the range.
    #[default]
    Linear,
    /// Logarithmic mapping. More resolution at low values.
    /// Requires `min > 0.0`.
    Logarithmic,
    /// Power curve mapping with configurable exponent.
    /// exponent < 1.0 → more resolution at low end.
    /// exponent > 1.0 → more resolution at high end.
    Power(f64),
}

/// Parameter capability flags for host communication.
///
/// Use [`union`](Self::union) to combine.
///
/// ```rust
/// use paramsync_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!flags.contains(ParamFlags::READ_ONLY));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps (integer and boolean values).
    pub const STEPPED: Self = Self(1 << 1);
    /// Parameter is read-only (metering, display only). Scheduled changes
    /// to it are refused.
    pub const READ_ONLY: Self = Self(1 << 2);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamUnit {
    /// Decibels (dB) - for gain, threshold, and level parameters.
    Decibels,
    /// Hertz (Hz) - for frequency parameters like filter cutoff or LFO rate.
    Hertz,
    /// Milliseconds (ms) - for time parameters like delay, attack, release.
    Milliseconds,
    /// Percentage (%) - for mix, blend, and normalized parameters.
    Percent,
    /// Ratio (n:1) - for compressor ratios and similar.
    Ratio,
    /// No unit - for dimensionless or custom parameters.
    #[default]
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use paramsync_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }
}

/// Describes a single parameter's metadata for display and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Delay Time").
    pub name: String,
    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f64,
    /// Maximum allowed value.
    pub max: f64,
    /// Value the parameter starts with.
    pub default: f64,
    /// Normalization curve. Default: [`ParamScale::Linear`].
    pub scale: ParamScale,
    /// Capability flags. Default: [`ParamFlags::AUTOMATABLE`].
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    /// Creates a linear, unitless descriptor.
    ///
    /// `min` and `max` are swapped if given in the wrong order, and the
    /// default is clamped into the resulting range. A NaN bound takes the
    /// value of the other bound (or `0.0` if both are NaN).
    pub fn new(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        let (min, max) = match (min.is_nan(), max.is_nan()) {
            (true, true) => (0.0, 0.0),
            (true, false) => (max, max),
            (false, true) => (min, min),
            (false, false) => (min, max),
        };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let mut descriptor = Self {
            name: name.into(),
            unit: ParamUnit::None,
            min,
            max,
            default: min,
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
        };
        descriptor.default = descriptor.clamp(default);
        descriptor
    }

    /// Whether scheduled changes to this parameter are refused.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(ParamFlags::READ_ONLY)
    }

    /// Sets the display unit.
    pub fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the normalization scale.
    pub fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the parameter flags.
    pub fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// NaN collapses to `min`.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() || value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Converts a plain value to normalized range (0.0 to 1.0).
    ///
    /// A zero-width range always normalizes to `0.0`.
    ///
    /// ```rust
    /// use paramsync_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::new("Mix", 0.0, 100.0, 50.0);
    /// assert_eq!(desc.normalize(50.0), 0.5);
    /// ```
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                (value / self.min).ln() / (self.max / self.min).ln()
            }
            ParamScale::Power(exp) => ((value - self.min) / range).powf(1.0 / exp),
        }
    }

    /// Converts a normalized value (0.0 to 1.0) to the actual parameter range.
    ///
    /// Inverse of [`normalize`](Self::normalize). Input outside \[0, 1\] is
    /// clamped first.
    #[inline]
    pub fn denormalize(&self, normalized: f64) -> f64 {
        let normalized = if normalized.is_nan() {
            0.0
        } else {
            normalized.clamp(0.0, 1.0)
        };
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * (self.max / self.min).powf(normalized)
            }
            ParamScale::Power(exp) => self.min + normalized.powf(exp) * (self.max - self.min),
        }
    }
}

/// Builds the key used for name lookup.
///
/// Keeps ASCII alphanumerics only and lower-cases them, so `"Filter Cutoff"`,
/// `"filter_cutoff"` and `"FILTER-CUTOFF"` all resolve to `"filtercutoff"`.
pub fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
