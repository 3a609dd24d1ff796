//! Card anchor points.

use crate::model::{Point, Size};

/// Connection points on a card, derived from its center and the fixed
/// card size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardAnchors {
    pub top: Point,
    pub bottom: Point,
    pub mid_left: Point,
    pub mid_right: Point,
}

impl CardAnchors {
    pub fn new(center: Point, card: Size) -> Self {
        let (hw, hh) = (card.width / 2.0, card.height / 2.0);
        Self {
            top: Point::new(center.x, center.y - hh),
            bottom: Point::new(center.x, center.y + hh),
            mid_left: Point::new(center.x - hw, center.y),
            mid_right: Point::new(center.x + hw, center.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_card_anchors() {
        let a = CardAnchors::new(Point::new(100.0, 200.0), Size::new(150.0, 180.0));
        assert_eq!(a.top, Point::new(100.0, 110.0));
        assert_eq!(a.bottom, Point::new(100.0, 290.0));
        assert_eq!(a.mid_left, Point::new(25.0, 200.0));
        assert_eq!(a.mid_right, Point::new(175.0, 200.0));
    }
}
