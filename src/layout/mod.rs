//! Resizable pane layout driven by gutter drag gestures
//!
//! The screen is split along two axes. Each axis is described by a
//! [`TrackSpec`]: proportional tracks interleaved with fixed-width gutters.
//! Dragging a gutter rewrites the proportional tracks of that axis only.
//!
//! ```text
//!   columns:  [ Fraction(a) | Fixed(1) | Fraction(total - a) ]
//!   rows:     [ Fraction(b) | Fixed(1) | Fraction(total - b) ]
//! ```
//!
//! The engine never fails: degenerate geometry and malformed events are
//! absorbed by clamping or by skipping the update.

use ratatui::layout::{Constraint, Rect};

/// Default lower clamp for a dragged fraction
pub const DEFAULT_MIN_FRACTION: f64 = 0.05;

/// Default upper clamp for a dragged fraction
pub const DEFAULT_MAX_FRACTION: f64 = 0.95;

/// Fixed unit the proportional tracks of an axis always sum to
pub const DEFAULT_TOTAL: u16 = 1000;

/// A single track of a layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Fixed width in cells (gutters)
    Fixed(u16),
    /// Proportional share out of the axis total
    Fraction(u16),
}

/// Which axis a drag gesture is currently resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragAxis {
    #[default]
    None,
    /// Columns: the gutter between the source pane and the output column (x coordinate)
    Horizontal,
    /// Rows: the gutter between the console and the rich output pane (y coordinate)
    Vertical,
}

/// Clamping bounds and quantization total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionBounds {
    pub min: f64,
    pub max: f64,
    pub total: u16,
}

impl FractionBounds {
    /// Build bounds, repairing inverted or out-of-range limits
    pub fn new(min: f64, max: f64, total: u16) -> Self {
        let min = if min.is_finite() { min.clamp(0.0, 1.0) } else { DEFAULT_MIN_FRACTION };
        let max = if max.is_finite() { max.clamp(0.0, 1.0) } else { DEFAULT_MAX_FRACTION };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        FractionBounds {
            min,
            max,
            total: total.max(1),
        }
    }

    /// Clamp a fraction and quantize it to an integer share of `total`
    pub fn quantize(&self, fraction: f64) -> u16 {
        let clamped = fraction.clamp(self.min, self.max);
        let share = (clamped * self.total as f64).round() as u16;
        share.min(self.total)
    }
}

impl Default for FractionBounds {
    fn default() -> Self {
        FractionBounds::new(DEFAULT_MIN_FRACTION, DEFAULT_MAX_FRACTION, DEFAULT_TOTAL)
    }
}

/// Ordered track specification for one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSpec {
    tracks: Vec<Track>,
}

impl TrackSpec {
    /// Two proportional tracks around one gutter
    pub fn split(first: u16, gutter: u16, total: u16) -> Self {
        let first = first.min(total);
        TrackSpec {
            tracks: vec![
                Track::Fraction(first),
                Track::Fixed(gutter),
                Track::Fraction(total - first),
            ],
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Sum of every fixed-width track
    pub fn fixed_sum(&self) -> u16 {
        self.tracks
            .iter()
            .map(|t| match t {
                Track::Fixed(w) => *w,
                Track::Fraction(_) => 0,
            })
            .sum()
    }

    /// Width of the fixed tracks in front of the first proportional track
    pub fn leading_fixed(&self) -> u16 {
        self.tracks
            .iter()
            .take_while(|t| matches!(t, Track::Fixed(_)))
            .map(|t| match t {
                Track::Fixed(w) => *w,
                Track::Fraction(_) => 0,
            })
            .sum()
    }

    /// Width of the first gutter (the one being dragged)
    pub fn gutter(&self) -> u16 {
        self.tracks
            .iter()
            .skip_while(|t| matches!(t, Track::Fixed(_)))
            .find_map(|t| match t {
                Track::Fixed(w) => Some(*w),
                Track::Fraction(_) => None,
            })
            .unwrap_or(0)
    }

    /// Sum of the proportional tracks
    pub fn fraction_sum(&self) -> u32 {
        self.tracks
            .iter()
            .map(|t| match t {
                Track::Fraction(n) => *n as u32,
                Track::Fixed(_) => 0,
            })
            .sum()
    }

    /// Share of the first proportional track
    pub fn first_fraction(&self) -> u16 {
        self.tracks
            .iter()
            .find_map(|t| match t {
                Track::Fraction(n) => Some(*n),
                Track::Fixed(_) => None,
            })
            .unwrap_or(0)
    }

    /// Map to ratatui constraints: gutters are lengths, fractions fill
    pub fn constraints(&self) -> Vec<Constraint> {
        self.tracks
            .iter()
            .map(|t| match t {
                Track::Fixed(w) => Constraint::Length(*w),
                Track::Fraction(n) => Constraint::Fill(*n),
            })
            .collect()
    }
}

/// What the gesture was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    HorizontalGutter,
    VerticalGutter,
    Other,
}

/// Coordinate source of a pointer event.
///
/// Mouse events carry the position directly. Touch events carry a list of
/// changed touch points; the first one is used.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerCoords {
    Mouse { x: f64, y: f64 },
    Touch { changed: Vec<(f64, f64)> },
}

impl PointerCoords {
    /// Resolve to a single point, or `None` if there is nothing usable
    pub fn point(&self) -> Option<(f64, f64)> {
        let (x, y) = match self {
            PointerCoords::Mouse { x, y } => (*x, *y),
            PointerCoords::Touch { changed } => *changed.first()?,
        };
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }
}

/// A pointer or touch event routed to the layout engine
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub target: PointerTarget,
    pub coords: PointerCoords,
}

impl PointerEvent {
    pub fn mouse(target: PointerTarget, x: f64, y: f64) -> Self {
        PointerEvent {
            target,
            coords: PointerCoords::Mouse { x, y },
        }
    }

    pub fn touch(target: PointerTarget, changed: Vec<(f64, f64)>) -> Self {
        PointerEvent {
            target,
            coords: PointerCoords::Touch { changed },
        }
    }
}

/// Whether the engine took the event (and default handling must be suppressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Consumed,
    Ignored,
}

impl Disposition {
    pub fn is_consumed(self) -> bool {
        self == Disposition::Consumed
    }
}

/// Column and row track specifications plus the active drag axis
#[derive(Debug, Clone, PartialEq)]
pub struct PaneLayout {
    columns: TrackSpec,
    rows: TrackSpec,
    active: DragAxis,
    bounds: FractionBounds,
}

impl PaneLayout {
    /// Create a layout with initial shares given as fractions of each axis
    pub fn new(bounds: FractionBounds, column_share: f64, row_share: f64, gutter: u16) -> Self {
        let column_share = if column_share.is_finite() { column_share } else { 0.5 };
        let row_share = if row_share.is_finite() { row_share } else { 0.5 };
        PaneLayout {
            columns: TrackSpec::split(bounds.quantize(column_share), gutter, bounds.total),
            rows: TrackSpec::split(bounds.quantize(row_share), gutter, bounds.total),
            active: DragAxis::None,
            bounds,
        }
    }

    pub fn active_axis(&self) -> DragAxis {
        self.active
    }

    pub fn bounds(&self) -> FractionBounds {
        self.bounds
    }

    pub fn columns(&self) -> &TrackSpec {
        &self.columns
    }

    pub fn rows(&self) -> &TrackSpec {
        &self.rows
    }

    /// Start a drag if the event lands on a gutter
    pub fn begin_drag(&mut self, event: &PointerEvent) -> Disposition {
        let axis = match event.target {
            PointerTarget::HorizontalGutter => DragAxis::Horizontal,
            PointerTarget::VerticalGutter => DragAxis::Vertical,
            PointerTarget::Other => return Disposition::Ignored,
        };
        self.active = axis;
        tracing::trace!(?axis, "drag started");
        Disposition::Consumed
    }

    /// Resize the active axis from the pointer position inside `container`
    pub fn update_drag(&mut self, event: &PointerEvent, container: Rect) -> Disposition {
        let spec = match self.active {
            DragAxis::None => return Disposition::Ignored,
            DragAxis::Horizontal => &self.columns,
            DragAxis::Vertical => &self.rows,
        };
        let Some((x, y)) = event.coords.point() else {
            return Disposition::Ignored;
        };
        let (coord, origin, extent) = match self.active {
            DragAxis::Horizontal => (x, container.x as f64, container.width as f64),
            _ => (y, container.y as f64, container.height as f64),
        };

        let usable = extent - spec.fixed_sum() as f64;
        if usable <= 0.0 {
            return Disposition::Ignored;
        }

        let fraction = (coord - origin - spec.leading_fixed() as f64) / usable;
        let share = self.bounds.quantize(fraction);
        let rebuilt = TrackSpec::split(share, spec.gutter(), self.bounds.total);

        match self.active {
            DragAxis::Horizontal => self.columns = rebuilt,
            _ => self.rows = rebuilt,
        }
        tracing::trace!(axis = ?self.active, share, "drag updated");
        Disposition::Consumed
    }

    /// Finish any drag in progress
    pub fn end_drag(&mut self) {
        self.active = DragAxis::None;
    }

    /// Constraints for rendering one axis
    pub fn constraints(&self, axis: DragAxis) -> Vec<Constraint> {
        match axis {
            DragAxis::Vertical => self.rows.constraints(),
            _ => self.columns.constraints(),
        }
    }
}

impl Default for PaneLayout {
    fn default() -> Self {
        PaneLayout::new(FractionBounds::default(), 0.5, 0.7, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_fixed_counts_only_prefix() {
        let spec = TrackSpec {
            tracks: vec![
                Track::Fixed(2),
                Track::Fraction(400),
                Track::Fixed(1),
                Track::Fraction(600),
            ],
        };
        assert_eq!(spec.leading_fixed(), 2);
        assert_eq!(spec.fixed_sum(), 3);
        assert_eq!(spec.gutter(), 1);
        assert_eq!(spec.first_fraction(), 400);
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let bounds = FractionBounds::new(0.9, 0.1, 100);
        assert_eq!(bounds.min, 0.1);
        assert_eq!(bounds.max, 0.9);
    }
}
