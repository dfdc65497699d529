//! The placement resolver.
//!
//! Candidates are tried in priority order. The first one whose natural-size
//! rectangle fits inside the viewport wins. When none fits, every candidate is
//! shrunk to the space available on its side of the anchor and the one with
//! the largest remaining area is used.

use crate::geometry::{Offset, Region, Size};

use super::placement::{Placement, DEFAULT_PRIORITIES};
use super::PositionError;

/// Where a popup ends up, consumed directly as render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecalcResult {
    /// The side of the anchor the popup was attached to.
    pub anchor_position: Placement,
    /// Distance along the popup's cross axis from its origin to the anchor's
    /// centre. Hosts use it to draw a pointer arrow.
    pub anchor_offset: i32,
    pub popup_x: i32,
    pub popup_y: i32,
    pub constrained_popup_width: i32,
    pub constrained_popup_height: i32,
}

impl RecalcResult {
    /// The popup rectangle in viewport coordinates.
    pub fn popup_region(&self) -> Region {
        Region::new(
            self.popup_x,
            self.popup_y,
            self.constrained_popup_width,
            self.constrained_popup_height,
        )
    }

    /// Whether the popup had to be shrunk below its natural `size`.
    pub fn is_clipped(&self, size: Size) -> bool {
        self.constrained_popup_width < size.width || self.constrained_popup_height < size.height
    }
}

/// Compute the on-screen rectangle for a popup attached to `anchor`.
///
/// An empty `priorities` slice means [`DEFAULT_PRIORITIES`]. `anchor == None`
/// means the anchor is gone and yields `Ok(None)`; callers dismiss the popup
/// rather than retrying.
///
/// With `use_inner_positioning` only the first priority is considered and the
/// popup overlaps the anchor, flush with the named edge.
///
/// # Errors
///
/// [`PositionError::InnerContext`] when inner positioning is requested with a
/// leading [`Placement::Context`].
pub fn recalc_position(
    viewport: Size,
    anchor: Option<Region>,
    popup: Size,
    priorities: &[Placement],
    use_inner_positioning: bool,
) -> Result<Option<RecalcResult>, PositionError> {
    let priorities = if priorities.is_empty() {
        &DEFAULT_PRIORITIES[..]
    } else {
        priorities
    };

    if use_inner_positioning && priorities[0] == Placement::Context {
        return Err(PositionError::InnerContext);
    }

    let Some(anchor) = anchor else {
        return Ok(None);
    };

    if use_inner_positioning {
        let placement = priorities[0];
        let rect = inner_candidate(placement, viewport, anchor, popup);
        return Ok(Some(finish(placement, viewport, anchor, rect)));
    }

    let mut best: Option<(Placement, Region)> = None;
    for &placement in priorities {
        let rect = adjacent_candidate(placement, viewport, anchor, popup);
        if rect.size() == popup {
            return Ok(Some(finish(placement, viewport, anchor, rect)));
        }
        let better = match best {
            Some((_, current)) => rect.area() > current.area(),
            None => true,
        };
        if better {
            best = Some((placement, rect));
        }
    }

    Ok(best.map(|(placement, rect)| finish(placement, viewport, anchor, rect)))
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Fit `extent` into `0..limit` starting from `origin`, shrinking if needed.
fn clamp_cross(origin: i32, extent: i32, limit: i32) -> (i32, i32) {
    if extent >= limit {
        (0, limit.max(0))
    } else {
        (origin.clamp(0, limit - extent), extent)
    }
}

/// The popup placed next to the anchor, constrained to the viewport.
fn adjacent_candidate(placement: Placement, viewport: Size, anchor: Region, popup: Size) -> Region {
    let (vw, vh) = (viewport.width, viewport.height);
    match placement {
        Placement::Bottom => {
            let start = anchor.bottom().max(0);
            let height = popup.height.min((vh - start).max(0));
            let (x, width) = clamp_cross(anchor.left(), popup.width, vw);
            Region::new(x, start, width, height)
        }
        Placement::Top => {
            let end = anchor.top().min(vh);
            let height = popup.height.min(end.max(0));
            let (x, width) = clamp_cross(anchor.left(), popup.width, vw);
            Region::new(x, end - height, width, height)
        }
        Placement::Right => {
            let start = anchor.right().max(0);
            let width = popup.width.min((vw - start).max(0));
            let (y, height) = clamp_cross(anchor.top(), popup.height, vh);
            Region::new(start, y, width, height)
        }
        Placement::Left => {
            let end = anchor.left().min(vw);
            let width = popup.width.min(end.max(0));
            let (y, height) = clamp_cross(anchor.top(), popup.height, vh);
            Region::new(end - width, y, width, height)
        }
        Placement::Context => {
            let (x, width) = context_axis(anchor.left(), anchor.right(), popup.width, vw);
            let (y, height) = context_axis(anchor.top(), anchor.bottom(), popup.height, vh);
            Region::new(x, y, width, height)
        }
    }
}

/// One axis of a context placement: prefer the far side of the anchor, flip to
/// the near side, otherwise take whichever side has more room.
fn context_axis(near: i32, far: i32, extent: i32, limit: i32) -> (i32, i32) {
    let after = far.max(0);
    let before = near.min(limit);
    if after + extent <= limit {
        return (after, extent);
    }
    if before - extent >= 0 {
        return (before - extent, extent);
    }
    let room_after = (limit - after).max(0);
    let room_before = before.max(0);
    if room_after >= room_before {
        (after, room_after)
    } else {
        (before - room_before, room_before)
    }
}

/// The popup overlapping the anchor, flush with the edge named by `placement`.
fn inner_candidate(placement: Placement, viewport: Size, anchor: Region, popup: Size) -> Region {
    let (x, y) = match placement {
        Placement::Bottom => (anchor.left(), anchor.bottom() - popup.height),
        Placement::Top => (anchor.left(), anchor.top()),
        Placement::Right => (anchor.right() - popup.width, anchor.top()),
        Placement::Left => (anchor.left(), anchor.top()),
        Placement::Context => (anchor.left(), anchor.top()),
    };
    let (x, width) = clamp_cross(x, popup.width, viewport.width);
    let (y, height) = clamp_cross(y, popup.height, viewport.height);
    Region::new(x, y, width, height)
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

fn finish(placement: Placement, viewport: Size, anchor: Region, rect: Region) -> RecalcResult {
    // Never hand out a zero-sized popup; keep the sliver on screen.
    let width = rect.width.max(1);
    let height = rect.height.max(1);
    let x = rect.x.clamp(0, (viewport.width - width).max(0));
    let y = rect.y.clamp(0, (viewport.height - height).max(0));

    let center: Offset = anchor.center();
    let anchor_offset = match placement {
        Placement::Top | Placement::Bottom => (center.x - x).clamp(0, width),
        Placement::Left | Placement::Right => (center.y - y).clamp(0, height),
        Placement::Context => 0,
    };

    RecalcResult {
        anchor_position: placement,
        anchor_offset,
        popup_x: x,
        popup_y: y,
        constrained_popup_width: width,
        constrained_popup_height: height,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ANCHOR: Region = Region::new(10, 10, 100, 30);

    fn resolve(viewport: Size, anchor: Region, popup: Size, priorities: &[Placement]) -> RecalcResult {
        recalc_position(viewport, Some(anchor), popup, priorities, false)
            .unwrap()
            .unwrap()
    }

    // ── Scenarios ────────────────────────────────────────────────────

    #[test]
    fn roomy_viewport_places_below() {
        let result = resolve(Size::new(800, 600), ANCHOR, Size::new(200, 150), &[]);
        assert_eq!(
            result,
            RecalcResult {
                anchor_position: Placement::Bottom,
                anchor_offset: 50,
                popup_x: 10,
                popup_y: 40,
                constrained_popup_width: 200,
                constrained_popup_height: 150,
            }
        );
    }

    #[test]
    fn short_viewport_falls_back_to_side() {
        let popup = Size::new(200, 150);
        let result = resolve(Size::new(800, 45), ANCHOR, popup, &DEFAULT_PRIORITIES);
        assert_eq!(result.anchor_position, Placement::Right);
        assert_eq!(result.popup_x, 110);
        assert_eq!(result.popup_y, 0);
        assert_eq!(result.constrained_popup_width, 200);
        assert_eq!(result.constrained_popup_height, 45);
        assert!(result.is_clipped(popup));
    }

    #[test]
    fn no_room_below_picks_top() {
        let anchor = Region::new(10, 500, 100, 30);
        let priorities = [Placement::Bottom, Placement::Top];
        let result = resolve(Size::new(800, 600), anchor, Size::new(200, 150), &priorities);
        assert_eq!(result.anchor_position, Placement::Top);
        assert_eq!(result.popup_y, 350);
        assert_eq!(result.popup_region().bottom(), anchor.top());
    }

    #[test]
    fn left_placement_touches_anchor_left_edge() {
        let anchor = Region::new(500, 100, 50, 20);
        let result = resolve(Size::new(800, 600), anchor, Size::new(100, 40), &[Placement::Left]);
        assert_eq!(result.anchor_position, Placement::Left);
        assert_eq!(result.popup_x, 400);
        assert_eq!(result.popup_y, 100);
        assert_eq!(result.anchor_offset, 10);
    }

    #[test]
    fn cross_axis_is_clamped_into_viewport() {
        let anchor = Region::new(750, 10, 40, 20);
        let result = resolve(Size::new(800, 600), anchor, Size::new(200, 100), &[Placement::Bottom]);
        assert_eq!(result.popup_x, 600);
        assert_eq!(result.constrained_popup_width, 200);
        assert_eq!(result.anchor_offset, 170);
    }

    #[test]
    fn context_prefers_bottom_right_corner() {
        let anchor = Region::new(100, 100, 1, 1);
        let result = resolve(Size::new(800, 600), anchor, Size::new(80, 60), &[Placement::Context]);
        assert_eq!(result.anchor_position, Placement::Context);
        assert_eq!((result.popup_x, result.popup_y), (101, 101));
        assert_eq!(result.anchor_offset, 0);
    }

    #[test]
    fn context_flips_near_viewport_corner() {
        let anchor = Region::new(780, 590, 1, 1);
        let result = resolve(Size::new(800, 600), anchor, Size::new(80, 60), &[Placement::Context]);
        assert_eq!((result.popup_x, result.popup_y), (700, 530));
        assert!(!result.is_clipped(Size::new(80, 60)));
    }

    // ── Inner positioning ────────────────────────────────────────────

    #[test]
    fn inner_positioning_overlaps_anchor() {
        let anchor = Region::new(100, 100, 200, 100);
        let result = recalc_position(
            Size::new(800, 600),
            Some(anchor),
            Size::new(150, 40),
            &[Placement::Bottom, Placement::Top],
            true,
        )
        .unwrap()
        .unwrap();
        assert_eq!(result.anchor_position, Placement::Bottom);
        assert_eq!((result.popup_x, result.popup_y), (100, 160));
        assert!(anchor.contains_region(result.popup_region()));
    }

    #[test]
    fn inner_positioning_rejects_context() {
        let err = recalc_position(
            Size::new(800, 600),
            Some(ANCHOR),
            Size::new(10, 10),
            &[Placement::Context],
            true,
        );
        assert_eq!(err, Err(PositionError::InnerContext));
    }

    // ── Edge cases ───────────────────────────────────────────────────

    #[test]
    fn missing_anchor_yields_none() {
        let result = recalc_position(Size::new(800, 600), None, Size::new(10, 10), &[], false);
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn tiny_viewport_never_returns_zero_size() {
        let result = resolve(Size::new(5, 5), Region::new(0, 0, 5, 5), Size::new(50, 50), &[]);
        assert!(result.constrained_popup_width > 0);
        assert!(result.constrained_popup_height > 0);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[test]
    fn anchors_with_room_on_all_sides_use_first_priority() {
        let viewport = Size::new(1000, 1000);
        let popup = Size::new(120, 80);
        for x in (200..=600).step_by(50) {
            for y in (200..=600).step_by(50) {
                let anchor = Region::new(x, y, 60, 20);
                let result = resolve(viewport, anchor, popup, &[]);
                assert_eq!(result.anchor_position, Placement::Bottom);
                assert!(!result.is_clipped(popup));
            }
        }
    }

    #[test]
    fn clipped_results_stay_within_viewport() {
        let popup = Size::new(300, 300);
        for vw in [50, 120, 310] {
            for vh in [40, 90, 250] {
                let viewport = Size::new(vw, vh);
                for (ax, ay) in [(0, 0), (10, 10), (vw / 2, vh / 2), (vw - 5, vh - 5)] {
                    let anchor = Region::new(ax, ay, 5, 5);
                    let result = resolve(viewport, anchor, popup, &[]);
                    assert!(result.constrained_popup_width > 0);
                    assert!(result.constrained_popup_height > 0);
                    assert!(result.constrained_popup_width <= vw);
                    assert!(result.constrained_popup_height <= vh);
                    assert!(viewport.to_region().contains_region(result.popup_region()));
                }
            }
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let args = (Size::new(800, 45), Some(ANCHOR), Size::new(200, 150));
        let first = recalc_position(args.0, args.1, args.2, &DEFAULT_PRIORITIES, false);
        let second = recalc_position(args.0, args.1, args.2, &DEFAULT_PRIORITIES, false);
        assert_eq!(first, second);
    }
}
