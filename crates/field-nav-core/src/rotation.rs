//! Rotation and tilt gesture controller
//!
//! A secondary-button press is only a candidate rotation at first: the pointer
//! has to travel past a small dead zone before any heading changes, so a plain
//! right-click still opens the context menu. Once rotating, the heading tracks
//! the pointer's angle around the viewport center, and the context menu is
//! suppressed until release.

/// Dead zone around the press point before a candidate becomes a rotation
pub const DEAD_ZONE_PX: f32 = 8.0;

/// Tilt applied whenever an area selection exists
pub const TILT_AERIAL_DEG: f64 = 45.0;

/// A pixel position in the map widget's coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: ScreenPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Screen-space angle from `center` to this point, in degrees
    fn angle_from(self, center: ScreenPoint) -> f64 {
        let dy = (self.y - center.y) as f64;
        let dx = (self.x - center.x) as f64;
        dy.atan2(dx).to_degrees()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureState {
    Idle,
    /// Pressed but still within the dead zone
    Pending,
    Rotating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationController {
    state: GestureState,
    press_point: ScreenPoint,
    view_center: ScreenPoint,
    heading_at_start: f64,
}

impl Default for RotationController {
    fn default() -> Self {
        Self {
            state: GestureState::Idle,
            press_point: ScreenPoint::new(0.0, 0.0),
            view_center: ScreenPoint::new(0.0, 0.0),
            heading_at_start: 0.0,
        }
    }
}

impl RotationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Secondary-button press: start a candidate rotation
    pub fn press(&mut self, pointer: ScreenPoint, view_center: ScreenPoint, heading: f64) {
        self.state = GestureState::Pending;
        self.press_point = pointer;
        self.view_center = view_center;
        self.heading_at_start = heading;
    }

    /// Pointer moved while the secondary button is held.
    ///
    /// Returns the new heading once the pointer has left the dead zone, `None`
    /// while idle or still inside it. The heading delta is the change in
    /// angle-from-viewport-center between the press point and the current
    /// pointer position.
    pub fn movement(&mut self, pointer: ScreenPoint) -> Option<f64> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Pending => {
                if pointer.distance_to(self.press_point) <= DEAD_ZONE_PX {
                    return None;
                }
                self.state = GestureState::Rotating;
                Some(self.heading_for(pointer))
            }
            GestureState::Rotating => Some(self.heading_for(pointer)),
        }
    }

    /// Secondary-button release: end the gesture. Returns true when a rotation
    /// was actually in progress (the final heading should be persisted then).
    pub fn release(&mut self) -> bool {
        let was_rotating = self.state == GestureState::Rotating;
        self.state = GestureState::Idle;
        was_rotating
    }

    /// The default context-menu action is suppressed only while actively
    /// rotating, never for a plain press-and-release.
    pub fn context_menu_suppressed(&self) -> bool {
        self.state == GestureState::Rotating
    }

    pub fn is_rotating(&self) -> bool {
        self.state == GestureState::Rotating
    }

    fn heading_for(&self, pointer: ScreenPoint) -> f64 {
        let delta = pointer.angle_from(self.view_center) - self.press_point.angle_from(self.view_center);
        (self.heading_at_start - delta).rem_euclid(360.0)
    }
}

/// Tilt for the current selection state: pinned aerial while a selection
/// exists, flat otherwise. Never persisted; always recomputed from this.
pub fn tilt_for_selection(has_selection: bool) -> f64 {
    if has_selection { TILT_AERIAL_DEG } else { 0.0 }
}
