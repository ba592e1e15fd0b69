use serde::{Deserialize, Serialize};

/// One row of a [`Footprint`]: pixels `x0..=x1` on row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub y: i32,
    pub x0: i32,
    pub x1: i32,
}

impl Span {
    pub fn new(y: i32, x0: i32, x1: i32) -> Self {
        Span { y, x0, x1 }
    }

    pub fn len(&self) -> usize {
        if self.x1 < self.x0 {
            0
        } else {
            self.x1.abs_diff(self.x0) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Set of pixels belonging to one frame, stored as horizontal spans.
///
/// The order of the spans, and of the pixels within each span, defines the order of the
/// frame's slice in the flattened pixel vector of a [`Grid`](crate::grid::Grid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    spans: Vec<Span>,
}

impl Footprint {
    pub fn new(spans: Vec<Span>) -> Self {
        Footprint { spans }
    }

    /// Rectangular footprint with its lower-left corner at `(x0, y0)`.
    ///
    /// A non-positive width or height gives an empty footprint; a box reaching past
    /// `i32::MAX` is cut at the end of the coordinate range.
    pub fn from_box(x0: i32, y0: i32, width: i32, height: i32) -> Self {
        if width <= 0 || height <= 0 {
            return Footprint::default();
        }
        let x1 = i32::try_from(i64::from(x0) + i64::from(width) - 1).unwrap_or(i32::MAX);
        let spans = (i64::from(y0)..i64::from(y0) + i64::from(height))
            .map_while(|y| i32::try_from(y).ok())
            .map(|y| Span::new(y, x0, x1))
            .collect();
        Footprint { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }

    /// Pixel coordinates `(x, y)` in flattening order.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.spans
            .iter()
            .flat_map(|span| (span.x0..=span.x1).map(move |x| (x, span.y)))
    }
}

#[cfg(test)]
mod footprint_test {
    use super::*;

    #[test]
    fn test_area_matches_pixel_iteration() {
        let fp = Footprint::new(vec![Span::new(0, 2, 4), Span::new(1, 0, 0), Span::new(2, 5, 3)]);
        assert_eq!(fp.area(), 4);
        assert_eq!(fp.pixels().count(), fp.area());
        assert_eq!(
            fp.pixels().collect::<Vec<_>>(),
            vec![(2, 0), (3, 0), (4, 0), (0, 1)]
        );
    }

    #[test]
    fn test_extreme_coordinates() {
        assert_eq!(Span::new(0, i32::MIN, 0).len(), 1usize << 31 | 1);
        assert!(Span::new(0, i32::MAX, i32::MIN).is_empty());

        let fp = Footprint::from_box(i32::MAX - 1, i32::MAX, 5, 3);
        assert_eq!(fp.spans(), &[Span::new(i32::MAX, i32::MAX - 1, i32::MAX)]);
        assert_eq!(fp.area(), 2);

        let fp = Footprint::from_box(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(fp.area(), i32::MAX as usize);
        assert_eq!(Footprint::from_box(0, 0, 0, 3).area(), 0);
        assert_eq!(Footprint::from_box(0, 0, 3, -1).area(), 0);
    }

    #[test]
    fn test_box() {
        let fp = Footprint::from_box(10, 20, 3, 2);
        assert_eq!(fp.area(), 6);
        assert_eq!(fp.spans()[1], Span::new(21, 10, 12));
    }
}
