// Copyright 2026 the Reactive Property Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Length-unit tags and pixel conversion.
//!
//! Numeric properties accept unit-tagged magnitudes (`(10, "pt")`, `"10dp"`).
//! Conversion to pixels depends on three display scalars — DPI, density, and
//! font scale — that are external to this crate. They are resolved through a
//! process-wide [`metrics`] lookup exactly once, on first use, and are
//! immutable for the rest of the process lifetime.
//!
//! Hosts that know their display configuration install a supplier before the
//! first conversion:
//!
//! ```ignore
//! reactive_property::install_metrics_source(|| DisplayMetrics {
//!     dpi: 120.0,
//!     density: 1.25,
//!     fontscale: 1.0,
//! });
//! ```
//!
//! Without an installed supplier, [`DisplayMetrics::default`] (96 DPI,
//! density 1, font scale 1) applies.

use alloc::boxed::Box;
use core::fmt;
use once_cell::race::OnceBox;

use crate::error::{PropertyError, Result};

/// A length or density unit tag.
///
/// `Px` doubles as the "unconverted" marker: a numeric property that was
/// never assigned a unit-tagged value reports `Px` as its format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Raw pixels (no conversion).
    #[default]
    Px,
    /// Inches.
    In,
    /// Density-independent pixels.
    Dp,
    /// Scale-independent pixels (density times font scale).
    Sp,
    /// Points (1/72 inch).
    Pt,
    /// Centimeters.
    Cm,
    /// Millimeters.
    Mm,
}

impl Unit {
    /// All recognized two-character unit codes.
    pub const ALL: [Self; 7] = [
        Self::Px,
        Self::In,
        Self::Dp,
        Self::Sp,
        Self::Pt,
        Self::Cm,
        Self::Mm,
    ];

    /// Parses a two-character unit code.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "px" => Some(Self::Px),
            "in" => Some(Self::In),
            "dp" => Some(Self::Dp),
            "sp" => Some(Self::Sp),
            "pt" => Some(Self::Pt),
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            _ => None,
        }
    }

    /// Parses a unit code, reporting failures against a property name.
    pub(crate) fn parse_for(property: &'static str, tag: &str) -> Result<Self> {
        Self::parse(tag).ok_or_else(|| {
            PropertyError::invalid(property, alloc::format!("unknown unit tag '{tag}'"))
        })
    }

    /// The two-character code for this unit.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::In => "in",
            Self::Dp => "dp",
            Self::Sp => "sp",
            Self::Pt => "pt",
            Self::Cm => "cm",
            Self::Mm => "mm",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display scalars the unit conversion depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisplayMetrics {
    /// Dots per inch of the display.
    pub dpi: f64,
    /// Pixel density multiplier (`dp` scale).
    pub density: f64,
    /// User font scale multiplier (`sp` applies this on top of density).
    pub fontscale: f64,
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            density: 1.0,
            fontscale: 1.0,
        }
    }
}

impl DisplayMetrics {
    /// Converts a magnitude in the given unit to pixels.
    #[must_use]
    pub fn to_pixels(&self, magnitude: f64, unit: Unit) -> f64 {
        match unit {
            Unit::Px => magnitude,
            Unit::In => magnitude * self.dpi,
            Unit::Dp => magnitude * self.density,
            Unit::Sp => magnitude * self.density * self.fontscale,
            Unit::Pt => magnitude * self.dpi / 72.0,
            Unit::Cm => magnitude * self.dpi / 2.54,
            Unit::Mm => magnitude * self.dpi / 25.4,
        }
    }
}

type MetricsSource = Box<dyn Fn() -> DisplayMetrics + Send + Sync>;

static SOURCE: OnceBox<MetricsSource> = OnceBox::new();
static RESOLVED: OnceBox<DisplayMetrics> = OnceBox::new();

/// Installs the external supplier the process-wide metrics are resolved from.
///
/// Returns `false` if a source was already installed. Installing a source
/// after [`metrics`] has resolved has no effect; install at startup, before
/// any unit-tagged value is converted.
pub fn install_metrics_source<F>(source: F) -> bool
where
    F: Fn() -> DisplayMetrics + Send + Sync + 'static,
{
    SOURCE.set(Box::new(Box::new(source))).is_ok()
}

/// The process-wide display metrics, resolved exactly once on first use.
#[must_use]
pub fn metrics() -> &'static DisplayMetrics {
    RESOLVED.get_or_init(|| {
        let resolved = SOURCE.get().map_or_else(DisplayMetrics::default, |f| f());
        Box::new(resolved)
    })
}

/// Converts a magnitude in the given unit to pixels using the process-wide
/// metrics.
#[must_use]
pub fn to_pixels(magnitude: f64, unit: Unit) -> f64 {
    metrics().to_pixels(magnitude, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        for unit in Unit::ALL {
            assert_eq!(Unit::parse(unit.as_str()), Some(unit));
        }
        assert_eq!(Unit::parse("em"), None);
        assert_eq!(Unit::parse(""), None);
    }

    #[test]
    fn conversion_formulas() {
        let m = DisplayMetrics {
            dpi: 120.0,
            density: 2.0,
            fontscale: 1.5,
        };
        assert_eq!(m.to_pixels(3.0, Unit::Px), 3.0);
        assert_eq!(m.to_pixels(2.0, Unit::In), 240.0);
        assert_eq!(m.to_pixels(4.0, Unit::Dp), 8.0);
        assert_eq!(m.to_pixels(4.0, Unit::Sp), 12.0);
        assert_eq!(m.to_pixels(72.0, Unit::Pt), 120.0);
        assert_eq!(m.to_pixels(2.54, Unit::Cm), 120.0);
        assert_eq!(m.to_pixels(25.4, Unit::Mm), 120.0);
    }

    #[test]
    fn default_metrics() {
        let m = DisplayMetrics::default();
        assert_eq!(m.dpi, 96.0);
        assert_eq!(m.density, 1.0);
        assert_eq!(m.fontscale, 1.0);
    }

    // No test installs a custom source: the resolved metrics are
    // process-wide, so every test observes the defaults deterministically.
    #[test]
    fn global_conversion_uses_resolved_metrics() {
        let m = *metrics();
        assert_eq!(to_pixels(10.0, Unit::Pt), m.to_pixels(10.0, Unit::Pt));
        assert_eq!(to_pixels(5.0, Unit::Px), 5.0);
    }
}
