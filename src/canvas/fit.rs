//! Auto-fit: choose a zoom and pan that show the tree.
//!
//! With six or more cards the box is built from the 5th to 95th percentile
//! of x and y (independently), so a single far-away card does not shrink
//! everything else to a dot.

use crate::model::{Point, Rect, Size};

/// Below this many nodes the full extent is used.
pub const TRIM_MIN_NODES: usize = 6;

const LOW_PERCENTILE: f64 = 0.05;
const HIGH_PERCENTILE: f64 = 0.95;

/// Parameters for [`fit_view`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub card: Size,
    pub padding: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

/// Canvas-space box that auto-fit tries to show, card extents and padding
/// included. `None` when there are no centers.
pub fn content_bounds(centers: &[Point], params: &FitParams) -> Option<Rect> {
    if centers.is_empty() {
        return None;
    }
    let mut xs: Vec<f64> = centers.iter().map(|p| p.x).collect();
    let mut ys: Vec<f64> = centers.iter().map(|p| p.y).collect();
    xs.sort_by(f64::total_cmp);
    ys.sort_by(f64::total_cmp);

    let (x0, x1, y0, y1) = if centers.len() >= TRIM_MIN_NODES {
        (
            percentile(&xs, LOW_PERCENTILE),
            percentile(&xs, HIGH_PERCENTILE),
            percentile(&ys, LOW_PERCENTILE),
            percentile(&ys, HIGH_PERCENTILE),
        )
    } else {
        (xs[0], xs[xs.len() - 1], ys[0], ys[ys.len() - 1])
    };

    let hw = params.card.width / 2.0 + params.padding;
    let hh = params.card.height / 2.0 + params.padding;
    Some(Rect::new(Point::new(x0 - hw, y0 - hh), Point::new(x1 + hw, y1 + hh)))
}

/// Zoom and pan that center [`content_bounds`] in a viewport of
/// `viewport` size. `None` when there is nothing to fit or the viewport has
/// no size yet.
pub fn fit_view(centers: &[Point], viewport: Size, params: &FitParams) -> Option<(f64, Point)> {
    if viewport.is_empty() {
        return None;
    }
    let bounds = content_bounds(centers, params)?;
    let zoom = (viewport.width / bounds.width())
        .min(viewport.height / bounds.height())
        .clamp(params.min_zoom, params.max_zoom);
    let screen_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
    Some((zoom, screen_center - bounds.center() * zoom))
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FitParams {
        FitParams { card: Size::new(150.0, 180.0), padding: 40.0, min_zoom: 0.3, max_zoom: 2.0 }
    }

    #[test]
    fn test_single_card_is_centered_at_max_zoom() {
        let (zoom, pan) = fit_view(&[Point::new(100.0, 50.0)], Size::new(1000.0, 1000.0), &params()).unwrap();
        assert_eq!(zoom, 2.0);
        assert_eq!(Point::new(100.0, 50.0) * zoom + pan, Point::new(500.0, 500.0));
    }

    #[test]
    fn test_outlier_is_trimmed() {
        let mut centers: Vec<Point> = (0..20).map(|i| Point::new(i as f64 * 210.0, 0.0)).collect();
        centers.push(Point::new(1.0e6, 0.0));
        let bounds = content_bounds(&centers, &params()).unwrap();
        assert!(bounds.max.x < 1.0e5);
    }

    #[test]
    fn test_few_nodes_use_full_extent() {
        let centers = [Point::new(0.0, 0.0), Point::new(5000.0, 0.0)];
        let bounds = content_bounds(&centers, &params()).unwrap();
        assert_eq!(bounds.max.x, 5000.0 + 75.0 + 40.0);
    }

    #[test]
    fn test_no_viewport_or_no_nodes() {
        assert!(fit_view(&[Point::ZERO], Size::default(), &params()).is_none());
        assert!(fit_view(&[], Size::new(800.0, 600.0), &params()).is_none());
    }
}
