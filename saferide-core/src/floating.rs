//! Floating SOS button placement.
//!
//! In floating mode the SOS button hovers over other apps and can be dragged
//! around. On release it is kept inside safe margins and snapped to the
//! nearest vertical screen edge.

use serde::{Deserialize, Serialize};

/// Button diameter in screen points.
pub const BUTTON_SIZE: f64 = 80.0;

/// Horizontal margin kept between the button and the screen edge.
pub const EDGE_MARGIN: f64 = 20.0;

/// Vertical margin kept clear for status and navigation bars.
pub const VERTICAL_MARGIN: f64 = 100.0;

/// Movement (in points, either axis) before a touch becomes a drag.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Top-left corner of the button in screen points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonPosition {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Screen dimensions the button is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingLayout {
    width: f64,
    height: f64,
}

impl FloatingLayout {
    /// Creates a layout for a screen of the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Where the button sits before the user ever moves it.
    #[must_use]
    pub fn default_position(&self) -> ButtonPosition {
        ButtonPosition {
            x: self.width - 100.0,
            y: self.height / 2.0,
        }
    }

    /// Whether a gesture has moved far enough to start dragging.
    #[must_use]
    pub fn should_start_drag(dx: f64, dy: f64) -> bool {
        dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD
    }

    /// Live position while the finger is down. Not clamped.
    #[must_use]
    pub fn drag(start: ButtonPosition, dx: f64, dy: f64) -> ButtonPosition {
        ButtonPosition {
            x: start.x + dx,
            y: start.y + dy,
        }
    }

    /// Final position after the finger is lifted.
    ///
    /// Clamps into the safe area, then snaps to the left or right edge
    /// depending on which half of the screen the button was dropped in.
    ///
    /// # Examples
    ///
    /// ```
    /// use saferide_core::floating::{ButtonPosition, FloatingLayout};
    ///
    /// let layout = FloatingLayout::new(400.0, 800.0);
    /// let start = ButtonPosition { x: 300.0, y: 400.0 };
    ///
    /// let dropped = layout.release(start, -250.0, 20.0);
    /// assert_eq!(dropped, ButtonPosition { x: 20.0, y: 420.0 });
    /// ```
    #[must_use]
    pub fn release(&self, start: ButtonPosition, dx: f64, dy: f64) -> ButtonPosition {
        let moved = Self::drag(start, dx, dy);
        let clamped = self.clamp(moved);

        let x = if clamped.x < self.width / 2.0 {
            EDGE_MARGIN
        } else {
            self.right_edge()
        };

        ButtonPosition { x, y: clamped.y }
    }

    /// Restricts a position to the safe area.
    ///
    /// On screens too small for the margins the minimum wins.
    #[must_use]
    pub fn clamp(&self, position: ButtonPosition) -> ButtonPosition {
        let max_x = self.right_edge();
        let max_y = self.height - BUTTON_SIZE - VERTICAL_MARGIN;

        ButtonPosition {
            x: position.x.min(max_x).max(EDGE_MARGIN),
            y: position.y.min(max_y).max(VERTICAL_MARGIN),
        }
    }

    fn right_edge(&self) -> f64 {
        self.width - BUTTON_SIZE - EDGE_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: FloatingLayout = FloatingLayout::new(400.0, 800.0);

    #[test]
    fn default_position_is_right_middle() {
        assert_eq!(
            LAYOUT.default_position(),
            ButtonPosition { x: 300.0, y: 400.0 }
        );
    }

    #[test]
    fn small_moves_are_taps() {
        assert!(!FloatingLayout::should_start_drag(5.0, -5.0));
        assert!(FloatingLayout::should_start_drag(5.1, 0.0));
        assert!(FloatingLayout::should_start_drag(0.0, -6.0));
    }

    #[test]
    fn drag_follows_finger() {
        let p = FloatingLayout::drag(ButtonPosition { x: 10.0, y: 10.0 }, -50.0, 30.0);
        assert_eq!(p, ButtonPosition { x: -40.0, y: 40.0 });
    }

    #[test]
    fn release_snaps_right() {
        let start = ButtonPosition { x: 100.0, y: 300.0 };
        let p = LAYOUT.release(start, 120.0, 0.0);
        assert_eq!(p, ButtonPosition { x: 300.0, y: 300.0 });
    }

    #[test]
    fn release_clamps_vertically() {
        let start = ButtonPosition { x: 300.0, y: 400.0 };
        assert_eq!(LAYOUT.release(start, 0.0, -1000.0).y, 100.0);
        assert_eq!(LAYOUT.release(start, 0.0, 1000.0).y, 620.0);
    }

    #[test]
    fn release_far_off_screen_still_lands_on_edge() {
        let start = ButtonPosition { x: 20.0, y: 400.0 };
        assert_eq!(LAYOUT.release(start, -500.0, 0.0).x, 20.0);
        assert_eq!(LAYOUT.release(start, 5000.0, 0.0).x, 300.0);
    }

    #[test]
    fn tiny_screen_prefers_minimum() {
        let tiny = FloatingLayout::new(100.0, 200.0);
        let p = tiny.clamp(ButtonPosition { x: 50.0, y: 50.0 });
        assert_eq!(p, ButtonPosition { x: 20.0, y: 100.0 });
    }
}
