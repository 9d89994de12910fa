use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 2.5;
pub const DEFAULT_SCALE: f64 = 0.80;

/// Pan offset and zoom of the map.
///
/// `screen = world * scale + (ox, oy)`. Missing fields in a stored view take
/// their defaults individually.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub scale: f64,
    pub ox: f64,
    pub oy: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            scale: DEFAULT_SCALE,
            ox: 0.0,
            oy: 0.0,
        }
    }
}

impl ViewState {
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.ox) / self.scale, (sy - self.oy) / self.scale)
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (wx * self.scale + self.ox, wy * self.scale + self.oy)
    }

    /// Clamp and apply a zoom level, returning the scale actually applied
    pub fn set_zoom(&mut self, requested: f64) -> f64 {
        let requested = if requested.is_finite() { requested } else { DEFAULT_SCALE };
        self.scale = requested.clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.set_zoom(self.scale + delta)
    }

    /// Pan relative to where a pan gesture started. Unclamped.
    pub fn pan_from(&mut self, origin: (f64, f64), delta: (f64, f64)) {
        self.ox = origin.0 + delta.0;
        self.oy = origin.1 + delta.1;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_from((self.ox, self.oy), (dx, dy));
    }

    /// Put the world origin at the middle of a viewport
    pub fn center_on(&mut self, viewport_w: f64, viewport_h: f64) {
        self.ox = viewport_w * 0.5;
        self.oy = viewport_h * 0.5;
    }
}
