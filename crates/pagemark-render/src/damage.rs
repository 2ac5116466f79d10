//! Damage (dirty-rect) tracking.
//!
//! Mutations that move or resize a single object enqueue the object's old
//! and new bounding boxes; clears, undo/redo and resizes mark the whole
//! canvas dirty. Rects are merged pairwise while any two overlap or touch,
//! so overlapping regions are never repainted twice.

use kurbo::Rect;

/// The damage accumulated since the last repaint.
#[derive(Debug, Clone, PartialEq)]
pub enum Damage {
    /// Repaint everything.
    Full,
    /// Repaint the listed regions.
    Rects(Vec<Rect>),
}

/// Collects dirty regions between frames.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    rects: Vec<Rect>,
    all: bool,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a region as needing repaint. Empty rects are ignored.
    pub fn mark_dirty(&mut self, rect: Rect) {
        if self.all || rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.rects.push(rect);
    }

    /// Mark the entire canvas as needing repaint.
    pub fn mark_all_dirty(&mut self) {
        self.all = true;
        self.rects.clear();
    }

    pub fn is_dirty(&self) -> bool {
        self.all || !self.rects.is_empty()
    }

    /// Take the accumulated damage, merged, leaving the tracker clean.
    pub fn take(&mut self) -> Option<Damage> {
        if self.all {
            self.all = false;
            self.rects.clear();
            return Some(Damage::Full);
        }
        if self.rects.is_empty() {
            return None;
        }
        let rects = merge_rects(std::mem::take(&mut self.rects));
        Some(Damage::Rects(rects))
    }
}

/// Whether two rects overlap or touch (share an edge or corner).
fn overlap_or_touch(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Merge rects by pairwise union until no two overlap or touch.
pub(crate) fn merge_rects(mut rects: Vec<Rect>) -> Vec<Rect> {
    loop {
        let mut merged_any = false;
        let mut result: Vec<Rect> = Vec::with_capacity(rects.len());

        'outer: for rect in rects {
            for existing in &mut result {
                if overlap_or_touch(*existing, rect) {
                    *existing = existing.union(rect);
                    merged_any = true;
                    continue 'outer;
                }
            }
            result.push(rect);
        }

        if !merged_any {
            return result;
        }
        rects = result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tracker_yields_nothing() {
        let mut tracker = DamageTracker::new();
        assert!(!tracker.is_dirty());
        assert!(tracker.take().is_none());
    }

    #[test]
    fn test_overlapping_rects_merge() {
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(0.0, 0.0, 50.0, 50.0));
        tracker.mark_dirty(Rect::new(25.0, 25.0, 100.0, 100.0));

        let damage = tracker.take().unwrap();
        assert_eq!(
            damage,
            Damage::Rects(vec![Rect::new(0.0, 0.0, 100.0, 100.0)])
        );
    }

    #[test]
    fn test_touching_rects_merge() {
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(0.0, 0.0, 50.0, 50.0));
        tracker.mark_dirty(Rect::new(50.0, 0.0, 100.0, 50.0));

        let damage = tracker.take().unwrap();
        assert_eq!(
            damage,
            Damage::Rects(vec![Rect::new(0.0, 0.0, 100.0, 50.0)])
        );
    }

    #[test]
    fn test_disjoint_rects_stay_separate() {
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(0.0, 0.0, 10.0, 10.0));
        tracker.mark_dirty(Rect::new(100.0, 100.0, 110.0, 110.0));

        match tracker.take().unwrap() {
            Damage::Rects(rects) => assert_eq!(rects.len(), 2),
            Damage::Full => panic!("expected partial damage"),
        }
    }

    #[test]
    fn test_chain_merges_transitively() {
        // A touches B, B touches C: all three collapse into one
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(0.0, 0.0, 10.0, 10.0));
        tracker.mark_dirty(Rect::new(20.0, 0.0, 30.0, 10.0));
        tracker.mark_dirty(Rect::new(10.0, 0.0, 20.0, 10.0));

        match tracker.take().unwrap() {
            Damage::Rects(rects) => {
                assert_eq!(rects.len(), 1);
                assert_eq!(rects[0], Rect::new(0.0, 0.0, 30.0, 10.0));
            }
            Damage::Full => panic!("expected partial damage"),
        }
    }

    #[test]
    fn test_full_damage_wins() {
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(0.0, 0.0, 10.0, 10.0));
        tracker.mark_all_dirty();
        tracker.mark_dirty(Rect::new(5.0, 5.0, 15.0, 15.0));

        assert_eq!(tracker.take().unwrap(), Damage::Full);
        // Tracker is clean afterwards
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_empty_rects_ignored() {
        let mut tracker = DamageTracker::new();
        tracker.mark_dirty(Rect::new(10.0, 10.0, 10.0, 50.0));
        assert!(!tracker.is_dirty());
    }
}
