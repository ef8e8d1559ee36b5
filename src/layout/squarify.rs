//! Squarified treemap layout (Bruls, Huizing, van Wijk: "Squarified Treemaps").

use super::rect::Rect;
use super::sort::sort_descending;

/// Anything the squarifier can place: a target pixel area and a settable rectangle.
pub trait LayoutItem {
    /// Target area in layout units (pixels²). Must be >= 0.
    fn size(&self) -> f64;

    fn bounds(&self) -> Rect;

    fn set_bounds(&mut self, bounds: Rect);
}

impl<T: LayoutItem + ?Sized> LayoutItem for &mut T {
    fn size(&self) -> f64 {
        (**self).size()
    }

    fn bounds(&self) -> Rect {
        (**self).bounds()
    }

    fn set_bounds(&mut self, bounds: Rect) {
        (**self).set_bounds(bounds)
    }
}

/// Assign a rectangle inside `bounds` to every item.
///
/// Item sizes are expected to add up to `bounds.area()`; they are not
/// re-normalized. Items are laid out largest first, but `items` keeps its
/// order. Every item's bounds are overwritten.
pub fn layout<T: LayoutItem>(items: &mut [T], bounds: Rect) {
    if items.is_empty() {
        return;
    }

    let mut sorted: Vec<&mut T> = items.iter_mut().collect();
    sort_descending(&mut sorted);
    layout_sorted(&mut sorted, bounds);
}

/// Squarify items already sorted by descending size.
pub fn layout_sorted<T: LayoutItem>(items: &mut [T], bounds: Rect) {
    let Some(end) = items.len().checked_sub(1) else {
        return;
    };

    let mut start = 0;
    let mut bounds = bounds;
    while start < end {
        // Grow the row while the worst aspect ratio strictly improves.
        // Ties keep the shorter row.
        let mut mid = start;
        let mut worst = highest_aspect(items, start, mid, bounds);
        while mid < end {
            let candidate = highest_aspect(items, start, mid + 1, bounds);
            if worst > candidate {
                mid += 1;
                worst = candidate;
            } else {
                break;
            }
        }

        tracing::trace!(
            "Row [{}..={}] worst aspect {:.3} in {:.1}x{:.1}",
            start,
            mid,
            worst,
            bounds.w,
            bounds.h
        );

        bounds = layout_row(items, start, mid, bounds);
        start = mid + 1;
    }

    // A lone remaining item takes whatever space is left
    if start == end {
        items[end].set_bounds(bounds);
    }
}

/// Lay out `items[start..=end]` as one row in `bounds` and report the
/// worst (largest) aspect ratio among them.
pub fn highest_aspect<T: LayoutItem>(items: &mut [T], start: usize, end: usize, bounds: Rect) -> f64 {
    layout_row(items, start, end, bounds);
    items[start..=end]
        .iter()
        .map(|item| item.bounds().aspect_ratio())
        .fold(0.0, f64::max)
}

/// Place `items[start..=end]` in a strip along one edge of `bounds` and
/// return the space left over.
///
/// In a wide `bounds` the strip runs down the left edge with items stacked
/// vertically; otherwise it runs along the top edge with items side by side.
pub fn layout_row<T: LayoutItem>(items: &mut [T], start: usize, end: usize, bounds: Rect) -> Rect {
    let horizontal = bounds.w > bounds.h;
    let total = bounds.area();
    let row_size = total_size(&items[start..=end]);
    let row_ratio = if total > 0.0 { row_size / total } else { 0.0 };

    let mut offset = 0.0;
    for item in &mut items[start..=end] {
        let ratio = if row_size > 0.0 {
            item.size() / row_size
        } else {
            0.0
        };
        let r = if horizontal {
            Rect::new(
                bounds.x,
                bounds.y + bounds.h * offset,
                bounds.w * row_ratio,
                bounds.h * ratio,
            )
        } else {
            Rect::new(
                bounds.x + bounds.w * offset,
                bounds.y,
                bounds.w * ratio,
                bounds.h * row_ratio,
            )
        };
        item.set_bounds(r);
        offset += ratio;
    }

    if horizontal {
        let strip = bounds.w * row_ratio;
        Rect::new(bounds.x + strip, bounds.y, (bounds.w - strip).max(0.0), bounds.h)
    } else {
        let strip = bounds.h * row_ratio;
        Rect::new(bounds.x, bounds.y + strip, bounds.w, (bounds.h - strip).max(0.0))
    }
}

pub fn total_size<T: LayoutItem>(items: &[T]) -> f64 {
    items.iter().map(|item| item.size()).sum()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        size: f64,
        bounds: Rect,
    }

    impl LayoutItem for Item {
        fn size(&self) -> f64 {
            self.size
        }

        fn bounds(&self) -> Rect {
            self.bounds
        }

        fn set_bounds(&mut self, bounds: Rect) {
            self.bounds = bounds;
        }
    }

    /// Scale `weights` so their sizes fill `bounds` exactly.
    fn items_for(weights: &[f64], bounds: Rect) -> Vec<Item> {
        let total: f64 = weights.iter().sum();
        weights
            .iter()
            .map(|w| Item {
                size: w / total * bounds.area(),
                bounds: Rect::default(),
            })
            .collect()
    }

    fn assert_tiles(items: &[Item], bounds: Rect) {
        let covered: f64 = items.iter().map(|i| i.bounds.area()).sum();
        let tolerance = bounds.area() * 1e-9;
        assert!(
            (covered - bounds.area()).abs() <= tolerance,
            "covered {} of {}",
            covered,
            bounds.area()
        );

        for (i, a) in items.iter().enumerate() {
            let r = a.bounds;
            assert!(r.w >= 0.0 && r.h >= 0.0, "negative extent {:?}", r);
            assert!(r.x >= bounds.x - 1e-6 && r.right() <= bounds.right() + 1e-6);
            assert!(r.y >= bounds.y - 1e-6 && r.bottom() <= bounds.bottom() + 1e-6);
            for b in &items[i + 1..] {
                assert!(
                    r.intersection_area(&b.bounds) <= tolerance,
                    "{:?} overlaps {:?}",
                    r,
                    b.bounds
                );
            }
        }
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut items: Vec<Item> = Vec::new();
        layout(&mut items, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(items.is_empty());
    }

    #[test]
    fn single_item_fills_bounds() {
        let bounds = Rect::new(10.0, 20.0, 1920.0, 1080.0);
        let mut items = items_for(&[1.0], bounds);
        layout(&mut items, bounds);
        assert_eq!(items[0].bounds, bounds);
    }

    #[test]
    fn three_items_in_wide_bounds() {
        let bounds = Rect::new(0.0, 0.0, 1600.0, 800.0);
        let mut items = items_for(&[12.0, 12.0, 8.0], bounds);
        layout(&mut items, bounds);

        let expected = [
            Rect::new(0.0, 0.0, 600.0, 800.0),
            Rect::new(600.0, 0.0, 600.0, 800.0),
            Rect::new(1200.0, 0.0, 400.0, 800.0),
        ];
        // The two equal items may swap places
        let mut placed: Vec<Rect> = items.iter().map(|i| i.bounds).collect();
        placed.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        assert_eq!(items[2].bounds.x, placed[2].x);
        for (got, want) in placed.into_iter().zip(expected) {
            assert!((got.x - want.x).abs() < 1e-6, "{:?} vs {:?}", got, want);
            assert!((got.y - want.y).abs() < 1e-6, "{:?} vs {:?}", got, want);
            assert!((got.w - want.w).abs() < 1e-6, "{:?} vs {:?}", got, want);
            assert!((got.h - want.h).abs() < 1e-6, "{:?} vs {:?}", got, want);
        }
    }

    #[test]
    fn tied_aspect_ratio_keeps_the_shorter_row() {
        // One item alone and both together are both 2:1
        let bounds = Rect::new(0.0, 0.0, 2.0, 2.0);
        let mut items = vec![
            Item {
                size: 2.0,
                bounds: Rect::default(),
            },
            Item {
                size: 2.0,
                bounds: Rect::default(),
            },
        ];
        layout(&mut items, bounds);

        let mut placed: Vec<Rect> = items.iter().map(|i| i.bounds).collect();
        placed.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
        assert_eq!(
            placed,
            vec![Rect::new(0.0, 0.0, 2.0, 1.0), Rect::new(0.0, 1.0, 2.0, 1.0)]
        );
    }

    #[test]
    fn caller_order_is_preserved() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut items = items_for(&[1.0, 3.0, 2.0], bounds);
        layout(&mut items, bounds);

        // Still small, large, middle
        assert!(items[0].size < items[2].size && items[2].size < items[1].size);
        for item in &items {
            assert!((item.bounds.area() - item.size).abs() < 1e-6);
        }
    }

    #[test]
    fn sample_set_tiles_bounds() {
        let bounds = Rect::new(0.0, 0.0, 1200.0, 800.0);
        let mut items = items_for(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], bounds);
        layout(&mut items, bounds);

        assert_tiles(&items, bounds);
        for item in &items {
            assert!(
                (item.bounds.area() - item.size).abs() < 1e-6,
                "area {} for size {}",
                item.bounds.area(),
                item.size
            );
        }
    }

    #[test]
    fn sample_set_beats_single_strip() {
        let bounds = Rect::new(0.0, 0.0, 1200.0, 800.0);
        let weights = [6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0];

        let mut squarified = items_for(&weights, bounds);
        layout(&mut squarified, bounds);
        let worst_squarified = squarified
            .iter()
            .map(|i| i.bounds.aspect_ratio())
            .fold(0.0, f64::max);

        let mut naive = items_for(&weights, bounds);
        layout_row(&mut naive, 0, weights.len() - 1, bounds);
        let worst_naive = naive
            .iter()
            .map(|i| i.bounds.aspect_ratio())
            .fold(0.0, f64::max);

        assert!(
            worst_squarified <= worst_naive,
            "squarified {} vs naive {}",
            worst_squarified,
            worst_naive
        );
        assert!(worst_squarified < 3.0);
    }

    #[test]
    fn layout_row_orientation_follows_bounds() {
        let mut items = vec![
            Item {
                size: 50.0,
                bounds: Rect::default(),
            },
            Item {
                size: 50.0,
                bounds: Rect::default(),
            },
        ];

        // Wide: strip down the left edge, items stacked
        let rest = layout_row(&mut items, 0, 0, Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(items[0].bounds, Rect::new(0.0, 0.0, 5.0, 10.0));
        assert_eq!(rest, Rect::new(5.0, 0.0, 15.0, 10.0));

        // Tall or square: strip along the top, items side by side
        let rest = layout_row(&mut items, 0, 1, Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(items[0].bounds, Rect::new(0.0, 0.0, 5.0, 10.0));
        assert_eq!(items[1].bounds, Rect::new(5.0, 0.0, 5.0, 10.0));
        assert_eq!(rest, Rect::new(0.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn zero_sized_items_get_empty_rects() {
        let bounds = Rect::new(0.0, 0.0, 2.0, 2.0);
        let mut items = vec![
            Item {
                size: 0.0,
                bounds: Rect::default(),
            },
            Item {
                size: 4.0,
                bounds: Rect::default(),
            },
            Item {
                size: 0.0,
                bounds: Rect::default(),
            },
        ];
        layout(&mut items, bounds);

        assert_eq!(items[1].bounds, bounds);
        assert_eq!(items[0].bounds.area(), 0.0);
        assert_eq!(items[2].bounds.area(), 0.0);
        for item in &items {
            assert!(item.bounds.w.is_finite() && item.bounds.h.is_finite());
        }
    }

    #[test]
    fn highest_aspect_reports_worst_member() {
        let mut items = vec![
            Item {
                size: 75.0,
                bounds: Rect::default(),
            },
            Item {
                size: 25.0,
                bounds: Rect::default(),
            },
        ];
        // Square 10x10: row along the top, 100% of the height, 7.5 and 2.5 wide
        let worst = highest_aspect(&mut items, 0, 1, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!((worst - 4.0).abs() < 1e-12);
        assert!((total_size(&items) - 100.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn arbitrary_sizes_tile_exactly(
            weights in prop::collection::vec(0.01f64..100.0, 1..30),
            w in 10.0f64..2000.0,
            h in 10.0f64..2000.0,
        ) {
            let bounds = Rect::new(0.0, 0.0, w, h);
            let mut items = items_for(&weights, bounds);
            layout(&mut items, bounds);
            assert_tiles(&items, bounds);
        }
    }
}
