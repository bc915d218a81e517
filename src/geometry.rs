//! Screen-space geometry used for hot-zone hit testing.

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in screen coordinates.
///
/// `right()` and `bottom()` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Strip of `height` pixels along the top edge, same horizontal extent.
    pub fn top_strip(&self, height: i32) -> Rect {
        Rect::new(self.x, self.y, self.width, height.max(0))
    }

    /// Half-open containment: left/top inclusive, right/bottom exclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::new(0, 0, 1200, 800);
        assert!(rect.contains(Point::new(0, 0)));
        assert!(rect.contains(Point::new(1199, 799)));
        assert!(!rect.contains(Point::new(1200, 10)));
        assert!(!rect.contains(Point::new(10, 800)));
        assert!(!rect.contains(Point::new(-1, 10)));
    }

    #[test]
    fn top_strip_keeps_horizontal_extent() {
        let rect = Rect::new(100, 50, 800, 600);
        let strip = rect.top_strip(5);

        assert_eq!(strip, Rect::new(100, 50, 800, 5));
        assert!(strip.contains(Point::new(100, 54)));
        assert!(!strip.contains(Point::new(100, 55)));
        assert!(!strip.contains(Point::new(99, 50)));
    }

    #[test]
    fn negative_strip_height_is_empty() {
        let strip = Rect::new(0, 0, 100, 100).top_strip(-3);
        assert!(!strip.contains(Point::new(0, 0)));
    }
}
