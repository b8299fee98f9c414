//! Spans and per-element boundaries.
//!
//! A [`Span`] is an immutable 2D interval in whatever coordinate system its
//! document element uses: character offsets for text (y fixed at 0), pixels
//! for images and keyframes, frame numbers for videos. A [`Boundary`] is the
//! maximum extent of one element in that same system and knows how to
//! validate a span against itself and how to shrink an overflowing span back
//! in bounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable 2D interval `(start_x,start_y)-(end_x,end_y)`.
///
/// Text spans keep `start_y == end_y == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start coordinate on the x axis.
    pub start_x: f64,
    /// Start coordinate on the y axis.
    pub start_y: f64,
    /// End coordinate on the x axis.
    pub end_x: f64,
    /// End coordinate on the y axis.
    pub end_y: f64,
}

impl Span {
    /// Create a span from raw coordinates.
    #[must_use]
    pub fn new(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    /// A text span over character offsets `[start, end]`.
    #[must_use]
    pub fn text(start: f64, end: f64) -> Self {
        Self::new(start, 0.0, end, 0.0)
    }

    /// True iff `start <= end` on both axes.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start_x <= self.end_x && self.start_y <= self.end_y
    }

    /// Extent product, treating a degenerate axis as extent 1.
    ///
    /// Used by the shrink-only correction invariant: correction never grows
    /// the area of a span.
    #[must_use]
    pub fn area(&self) -> f64 {
        let dx = (self.end_x - self.start_x).max(0.0);
        let dy = (self.end_y - self.start_y).max(0.0);
        dx.max(1.0) * dy.max(1.0)
    }
}

/// Render a coordinate the way it appears in response files: integral
/// values without a fractional part.
pub(crate) fn format_coord(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            format_coord(self.start_x),
            format_coord(self.start_y),
            format_coord(self.end_x),
            format_coord(self.end_y)
        )
    }
}

/// Maximum extent of a document element (or keyframe) in its own
/// coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    max: Span,
}

impl Boundary {
    /// Boundary covering `max` exactly.
    #[must_use]
    pub fn new(max: Span) -> Self {
        Self { max }
    }

    /// Text boundary over `[0, length]` character offsets.
    #[must_use]
    pub fn text(length: f64) -> Self {
        Self::new(Span::text(0.0, length))
    }

    /// Image or keyframe boundary over a `width x height` pixel box.
    #[must_use]
    pub fn image(width: f64, height: f64) -> Self {
        Self::new(Span::new(0.0, 0.0, width, height))
    }

    /// The covered extent.
    #[must_use]
    pub fn max(&self) -> Span {
        self.max
    }

    /// True iff `span` lies entirely within this boundary and is ordered.
    #[must_use]
    pub fn validate(&self, span: &Span) -> bool {
        span.is_ordered()
            && span.start_x >= self.max.start_x
            && span.start_y >= self.max.start_y
            && span.end_x <= self.max.end_x
            && span.end_y <= self.max.end_y
    }

    /// Best-effort in-bounds replacement for `span`.
    ///
    /// Clamps end coordinates down to the boundary maximum; never extends.
    /// Returns `None` when no shrink can help: the span starts beyond the
    /// boundary, so the clamped span would be empty or inverted. Already
    /// valid spans come back unchanged.
    #[must_use]
    pub fn correct(&self, span: &Span) -> Option<Span> {
        if !span.is_ordered() {
            return None;
        }
        if span.start_x > self.max.end_x || span.start_y > self.max.end_y {
            return None;
        }
        Some(Span::new(
            span.start_x,
            span.start_y,
            span.end_x.min(self.max.end_x),
            span.end_y.min(self.max.end_y),
        ))
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_response_format() {
        assert_eq!(Span::text(17.0, 42.0).to_string(), "(17,0)-(42,0)");
        assert_eq!(
            Span::new(0.5, 1.0, 2.5, 3.0).to_string(),
            "(0.5,1)-(2.5,3)"
        );
    }

    #[test]
    fn validate_checks_containment_and_order() {
        let b = Boundary::image(100.0, 50.0);
        assert!(b.validate(&Span::new(0.0, 0.0, 100.0, 50.0)));
        assert!(b.validate(&Span::new(10.0, 5.0, 20.0, 15.0)));
        assert!(!b.validate(&Span::new(10.0, 5.0, 120.0, 15.0)));
        assert!(!b.validate(&Span::new(30.0, 5.0, 20.0, 15.0)));
        assert!(!b.validate(&Span::new(-1.0, 0.0, 20.0, 15.0)));
    }

    #[test]
    fn correct_is_identity_on_valid_spans() {
        let b = Boundary::text(120.0);
        let s = Span::text(10.0, 100.0);
        assert!(b.validate(&s));
        assert_eq!(b.correct(&s), Some(s));
    }

    #[test]
    fn correct_clamps_end_down() {
        let b = Boundary::text(120.0);
        let s = Span::text(10.0, 400.0);
        let corrected = b.correct(&s).unwrap();
        assert_eq!(corrected, Span::text(10.0, 120.0));
        assert!(b.validate(&corrected));
        assert!(corrected.area() <= s.area());
    }

    #[test]
    fn correct_rejects_span_starting_beyond_boundary() {
        let b = Boundary::text(120.0);
        assert_eq!(b.correct(&Span::text(130.0, 200.0)), None);
        let b = Boundary::image(100.0, 50.0);
        assert_eq!(b.correct(&Span::new(10.0, 60.0, 20.0, 70.0)), None);
    }
}
