use crate::settings::ViewSettings;
use std::sync::{Arc, Mutex};

/// Viewport shared between the render loop and the hotkey hook thread.
pub type SharedViewport = Arc<Mutex<Viewport>>;

/// Size used for the placeholder shown before the first map arrives.
pub const PLACEHOLDER_SIZE: (f64, f64) = (800.0, 600.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen rectangle in floating point. Convert with [`ScreenRect::to_pixels`]
/// only when drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// Integer placement for blitting, truncating toward zero.
    pub fn to_pixels(self) -> (i32, i32, i32, i32) {
        (
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Zoom and pan state mapping image pixels to screen pixels.
///
/// The image is scaled about its own centre, centred in the viewport and
/// then shifted by the pan offset. Every mutation ends in
/// [`Viewport::enforce_constraints`], so the state observed between two
/// calls is always clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
    image_width: f64,
    image_height: f64,
    viewport_width: f64,
    viewport_height: f64,
    config: ViewSettings,
}

impl Viewport {
    pub fn new(config: ViewSettings, viewport_width: f64, viewport_height: f64) -> Self {
        let mut config = config;
        config.sanitize();
        let mut vp = Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            image_width: PLACEHOLDER_SIZE.0,
            image_height: PLACEHOLDER_SIZE.1,
            viewport_width,
            viewport_height,
            config,
        };
        vp.zoom = vp.zoom.clamp(vp.config.min_zoom, vp.config.max_zoom);
        vp.enforce_constraints();
        vp
    }

    pub fn shared(self) -> SharedViewport {
        Arc::new(Mutex::new(self))
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    pub fn viewport_size(&self) -> (f64, f64) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn config(&self) -> &ViewSettings {
        &self.config
    }

    /// Set the zoom directly, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        }
        self.enforce_constraints();
    }

    /// Set the pan offset directly; it is clamped afterwards.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.offset_x = x;
            self.offset_y = y;
        }
        self.enforce_constraints();
    }

    /// Map a point in image pixels to screen pixels.
    pub fn to_screen(&self, map: Point) -> Point {
        Point::new(
            self.viewport_width / 2.0 + (map.x - self.image_width / 2.0) * self.zoom + self.offset_x,
            self.viewport_height / 2.0
                + (map.y - self.image_height / 2.0) * self.zoom
                + self.offset_y,
        )
    }

    /// Inverse of [`Viewport::to_screen`].
    pub fn to_map(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.viewport_width / 2.0 - self.offset_x) / self.zoom
                + self.image_width / 2.0,
            (screen.y - self.viewport_height / 2.0 - self.offset_y) / self.zoom
                + self.image_height / 2.0,
        )
    }

    /// Where the whole image lands on screen.
    pub fn image_rect(&self) -> ScreenRect {
        let top_left = self.to_screen(Point::new(0.0, 0.0));
        ScreenRect {
            x: top_left.x,
            y: top_left.y,
            width: self.image_width * self.zoom,
            height: self.image_height * self.zoom,
        }
    }

    /// Step the zoom and rescale the offset by the zoom ratio so the point
    /// at the viewport centre stays put.
    pub fn apply_zoom(&mut self, direction: ZoomDirection) {
        let old_zoom = self.zoom;
        let step = match direction {
            ZoomDirection::In => self.config.zoom_step,
            ZoomDirection::Out => -self.config.zoom_step,
        };
        self.zoom = (old_zoom + step).clamp(self.config.min_zoom, self.config.max_zoom);

        let scale = self.zoom / old_zoom;
        self.offset_x *= scale;
        self.offset_y *= scale;
        self.enforce_constraints();
    }

    pub fn apply_pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.offset_x += dx;
            self.offset_y += dy;
        }
        self.enforce_constraints();
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0f64.clamp(self.config.min_zoom, self.config.max_zoom);
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.enforce_constraints();
    }

    /// Clamp the offset so the image cannot be panned past its edges. On an
    /// axis where the scaled image is smaller than the viewport the image
    /// is centred and the offset is zero. Idempotent.
    pub fn enforce_constraints(&mut self) {
        self.offset_x = clamp_axis(
            self.offset_x,
            self.image_width * self.zoom,
            self.viewport_width,
        );
        self.offset_y = clamp_axis(
            self.offset_y,
            self.image_height * self.zoom,
            self.viewport_height,
        );
    }

    /// A new image replaces the old one; the view starts over.
    pub fn set_image_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.image_width = width;
            self.image_height = height;
        }
        self.reset_view();
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.viewport_width = width;
            self.viewport_height = height;
        }
        self.enforce_constraints();
    }
}

fn clamp_axis(offset: f64, scaled: f64, viewport: f64) -> f64 {
    if scaled < viewport {
        0.0
    } else {
        let limit = (scaled - viewport) / 2.0;
        offset.clamp(-limit, limit)
    }
}
