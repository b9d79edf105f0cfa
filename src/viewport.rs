// src/viewport.rs
//
// Pan/zoom model of the deep-zoom surface. Coordinates come in two spaces:
// image pixels (origin at the image's top-left corner) and screen pixels
// (origin at the viewer container's top-left corner). `scale` is screen
// pixels per image pixel.

use crate::config::ViewerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Screen placement of the image: `screen = translate + image * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Exponential ease towards a target over a fixed duration (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    start: f64,
    target: f64,
    current: f64,
    start_time: f64,
    duration: f64,
}

impl Spring {
    const STIFFNESS: f64 = 6.5;

    pub fn new(value: f64, duration: f64) -> Self {
        Self {
            start: value,
            target: value,
            current: value,
            start_time: 0.0,
            duration: duration.max(0.0),
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn spring_to(&mut self, target: f64, now: f64) {
        self.start = self.current;
        self.target = target;
        self.start_time = now;
        if self.duration == 0.0 {
            self.current = target;
        }
    }

    /// Jump without animating.
    pub fn reset_to(&mut self, value: f64) {
        self.start = value;
        self.target = value;
        self.current = value;
    }

    /// Move `current` to its position at `now`. Returns true while still moving.
    pub fn update(&mut self, now: f64) -> bool {
        if self.current == self.target {
            return false;
        }
        let elapsed = now - self.start_time;
        if self.duration == 0.0 || elapsed >= self.duration {
            self.current = self.target;
            return false;
        }
        let t = (elapsed / self.duration).max(0.0);
        let eased = (1.0 - (-Self::STIFFNESS * t).exp()) / (1.0 - (-Self::STIFFNESS).exp());
        self.current = self.start + (self.target - self.start) * eased;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    image: Size,
    container: Size,
    min_zoom_level: f64,
    max_zoom_pixel_ratio: f64,
    pan_constrained: bool,
    // Zoom animates in log space so in/out steps feel symmetric.
    log_scale: Spring,
    center_x: Spring,
    center_y: Spring,
}

impl Viewport {
    /// A viewport showing the whole image centered (the home view).
    pub fn new(image: Size, container: Size, config: &ViewerConfig) -> Self {
        let mut viewport = Self {
            image,
            container,
            min_zoom_level: config.min_zoom_level,
            max_zoom_pixel_ratio: config.max_zoom_pixel_ratio,
            pan_constrained: config.pan_constrained,
            log_scale: Spring::new(0.0, config.animation_time),
            center_x: Spring::new(0.0, config.animation_time),
            center_y: Spring::new(0.0, config.animation_time),
        };
        let home = viewport.home_scale().ln();
        let center = image.center();
        viewport.log_scale.reset_to(home);
        viewport.center_x.reset_to(center.x);
        viewport.center_y.reset_to(center.y);
        viewport
    }

    /// Scale at which the whole image fits the container.
    pub fn home_scale(&self) -> f64 {
        if self.image.is_empty() || self.container.is_empty() {
            return 1.0;
        }
        (self.container.width / self.image.width).min(self.container.height / self.image.height)
    }

    pub fn min_scale(&self) -> f64 {
        (self.home_scale() * self.min_zoom_level).min(self.max_scale())
    }

    /// Never below the home scale, so a small image can always be shown whole.
    pub fn max_scale(&self) -> f64 {
        self.max_zoom_pixel_ratio.max(self.home_scale())
    }

    pub fn scale(&self) -> f64 {
        self.log_scale.current().exp()
    }

    pub fn target_scale(&self) -> f64 {
        self.log_scale.target().exp()
    }

    #[cfg(test)]
    /// Current zoom relative to the home view (1.0 = fit).
    pub fn zoom(&self) -> f64 {
        self.scale() / self.home_scale()
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x.current(), self.center_y.current())
    }

    pub fn target_center(&self) -> Point {
        Point::new(self.center_x.target(), self.center_y.target())
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.log_scale.current() != self.log_scale.target()
            || self.center_x.current() != self.center_x.target()
            || self.center_y.current() != self.center_y.target()
    }

    /// Multiply the zoom by `factor`, keeping `anchor` (screen pixels) over
    /// the same image point. Without an anchor the view center is kept.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<Point>, now: f64) {
        if !(factor > 0.0) || !factor.is_finite() {
            return;
        }
        let target = self.target_scale() * factor;
        self.zoom_to(target, anchor, now);
    }

    pub fn zoom_to(&mut self, scale: f64, anchor: Option<Point>, now: f64) {
        let old_scale = self.target_scale();
        let new_scale = scale.clamp(self.min_scale(), self.max_scale());
        let mut center = self.target_center();
        if let Some(anchor) = anchor {
            let half = self.container.center();
            let dx = anchor.x - half.x;
            let dy = anchor.y - half.y;
            let image_x = center.x + dx / old_scale;
            let image_y = center.y + dy / old_scale;
            center = Point::new(image_x - dx / new_scale, image_y - dy / new_scale);
        }
        let center = self.constrain(center);
        self.log_scale.spring_to(new_scale.ln(), now);
        self.center_x.spring_to(center.x, now);
        self.center_y.spring_to(center.y, now);
    }

    /// Drag the image by a screen-space delta. Applied immediately.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let scale = self.scale();
        let center = self.constrain(Point::new(
            self.center_x.current() - dx / scale,
            self.center_y.current() - dy / scale,
        ));
        self.center_x.reset_to(center.x);
        self.center_y.reset_to(center.y);
    }

    /// Animate the view center to an image point (navigator clicks).
    pub fn pan_to(&mut self, point: Point, now: f64) {
        let point = self.constrain(point);
        self.center_x.spring_to(point.x, now);
        self.center_y.spring_to(point.y, now);
    }

    pub fn go_home(&mut self, now: f64) {
        let center = self.image.center();
        self.log_scale.spring_to(self.home_scale().ln(), now);
        self.center_x.spring_to(center.x, now);
        self.center_y.spring_to(center.y, now);
    }

    /// The container changed size; keep the zoom relative to home.
    pub fn resize(&mut self, container: Size) {
        if container.is_empty() || container == self.container {
            return;
        }
        let relative = self.target_scale() / self.home_scale();
        self.container = container;
        let scale = (self.home_scale() * relative).clamp(self.min_scale(), self.max_scale());
        // Snap rather than animate from a scale computed for the old size.
        self.log_scale.reset_to(scale.ln());
    }

    pub fn update(&mut self, now: f64) -> bool {
        let zooming = self.log_scale.update(now);
        let moving_x = self.center_x.update(now);
        let moving_y = self.center_y.update(now);
        zooming || moving_x || moving_y
    }

    pub fn transform(&self) -> Transform {
        let scale = self.scale();
        let half = self.container.center();
        let center = self.center();
        Transform {
            translate_x: half.x - center.x * scale,
            translate_y: half.y - center.y * scale,
            scale,
        }
    }

    #[cfg(test)]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        let t = self.transform();
        Point::new(
            (screen.x - t.translate_x) / t.scale,
            (screen.y - t.translate_y) / t.scale,
        )
    }

    /// Region of the image currently visible, in image pixels. May extend
    /// past the image when zoomed out or panned away.
    pub fn visible_bounds(&self) -> Rect {
        let scale = self.scale();
        let width = self.container.width / scale;
        let height = self.container.height / scale;
        let center = self.center();
        Rect {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Size of the navigator thumbnail for a navigator of the given width.
    pub fn navigator_size(&self, width: f64) -> Size {
        if self.image.is_empty() {
            return Size::new(width, width);
        }
        Size::new(width, width * self.image.height / self.image.width)
    }

    /// Visible region mapped onto a navigator thumbnail of `navigator` size.
    pub fn navigator_region(&self, navigator: Size) -> Rect {
        let bounds = self.visible_bounds();
        let ratio = if self.image.is_empty() {
            0.0
        } else {
            navigator.width / self.image.width
        };
        Rect {
            x: bounds.x * ratio,
            y: bounds.y * ratio,
            width: bounds.width * ratio,
            height: bounds.height * ratio,
        }
    }

    /// Navigator pixel -> image pixel.
    pub fn navigator_to_image(&self, navigator: Size, point: Point) -> Point {
        if navigator.width <= 0.0 {
            return self.image.center();
        }
        let ratio = self.image.width / navigator.width;
        Point::new(point.x * ratio, point.y * ratio)
    }

    fn constrain(&self, center: Point) -> Point {
        if !self.pan_constrained {
            return center;
        }
        Point::new(
            center.x.clamp(0.0, self.image.width),
            center.y.clamp(0.0, self.image.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn instant() -> ViewerConfig {
        ViewerConfig {
            animation_time: 0.0,
            ..ViewerConfig::default()
        }
    }

    fn viewport() -> Viewport {
        // 4000x2000 image in an 800x600 container: home scale 0.2.
        Viewport::new(Size::new(4000.0, 2000.0), Size::new(800.0, 600.0), &instant())
    }

    #[test]
    fn test_home_view_fits_and_centers() {
        let v = viewport();
        assert!((v.scale() - 0.2).abs() < EPS);
        assert!((v.zoom() - 1.0).abs() < EPS);
        assert_eq!(v.center(), Point::new(2000.0, 1000.0));
        let t = v.transform();
        assert!(t.translate_x.abs() < 1e-6);
        assert!((t.translate_y - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_limits() {
        let mut v = viewport();
        assert!((v.min_scale() - 0.16).abs() < EPS);
        assert!((v.max_scale() - 2.0).abs() < EPS);

        for _ in 0..50 {
            v.zoom_by(1.5, None, 0.0);
        }
        assert!((v.scale() - 2.0).abs() < EPS);

        for _ in 0..50 {
            v.zoom_by(0.67, None, 0.0);
        }
        assert!((v.scale() - 0.16).abs() < EPS);
    }

    #[test]
    fn test_small_image_ceiling_is_raised_to_home() {
        let v = Viewport::new(Size::new(100.0, 100.0), Size::new(800.0, 600.0), &instant());
        assert!((v.home_scale() - 6.0).abs() < EPS);
        assert!((v.max_scale() - 6.0).abs() < EPS);
        assert!(v.min_scale() <= v.max_scale());
    }

    #[test]
    fn test_zoom_in_then_out_is_within_tolerance() {
        let mut v = viewport();
        v.zoom_by(2.0, None, 0.0);
        let before = v.scale();
        v.zoom_by(1.5, None, 0.0);
        v.zoom_by(0.67, None, 0.0);
        let drift = (v.scale() / before - 1.0).abs();
        assert!(drift <= 0.01, "drift {} exceeds 1%", drift);
        assert!((v.scale() / before - 1.005).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_stays_fixed_while_zooming() {
        let mut v = viewport();
        let anchor = Point::new(200.0, 150.0);
        let before = v.screen_to_image(anchor);
        v.zoom_by(1.2, Some(anchor), 0.0);
        let after = v.screen_to_image(anchor);
        assert!((before.x - after.x).abs() < 1e-6);
        assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn test_go_home_restores_fit() {
        let mut v = viewport();
        v.zoom_by(3.0, Some(Point::new(10.0, 10.0)), 0.0);
        v.pan_by(120.0, -40.0);
        v.go_home(0.0);
        assert!((v.scale() - v.home_scale()).abs() < EPS);
        assert_eq!(v.center(), Point::new(2000.0, 1000.0));
    }

    #[test]
    fn test_unconstrained_pan_can_leave_the_image() {
        let mut v = viewport();
        v.pan_by(-1_000_000.0, 0.0);
        let bounds = v.visible_bounds();
        assert!(bounds.x > 4000.0);
    }

    #[test]
    fn test_constrained_pan_keeps_center_on_image() {
        let config = ViewerConfig {
            animation_time: 0.0,
            pan_constrained: true,
            ..ViewerConfig::default()
        };
        let mut v = Viewport::new(Size::new(4000.0, 2000.0), Size::new(800.0, 600.0), &config);
        v.pan_by(-1_000_000.0, 1_000_000.0);
        assert_eq!(v.center(), Point::new(4000.0, 0.0));
    }

    #[test]
    fn test_animation_settles_on_target() {
        let config = ViewerConfig::default();
        let mut v = Viewport::new(Size::new(4000.0, 2000.0), Size::new(800.0, 600.0), &config);
        v.zoom_by(1.5, None, 10.0);
        assert!(v.is_animating());
        assert!((v.scale() - 0.2).abs() < EPS);

        assert!(v.update(10.25));
        let mid = v.scale();
        assert!(mid > 0.2 && mid < 0.3);

        assert!(!v.update(10.5));
        assert!((v.scale() - 0.3).abs() < EPS);
        assert!(!v.is_animating());
    }

    #[test]
    fn test_navigator_region_at_home() {
        let v = viewport();
        let nav = v.navigator_size(120.0);
        assert_eq!(nav, Size::new(120.0, 60.0));
        let region = v.navigator_region(nav);
        // The whole image width is visible, with letterboxing above and below.
        assert!(region.x.abs() < 1e-6);
        assert!((region.width - 120.0).abs() < 1e-6);
        assert!((region.height - 90.0).abs() < 1e-6);
        assert!((region.y + 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_navigator_click_maps_to_image() {
        let v = viewport();
        let nav = v.navigator_size(120.0);
        let p = v.navigator_to_image(nav, Point::new(30.0, 15.0));
        assert!((p.x - 1000.0).abs() < 1e-6);
        assert!((p.y - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_keeps_relative_zoom() {
        let mut v = viewport();
        v.zoom_by(2.0, None, 0.0);
        v.resize(Size::new(1600.0, 1200.0));
        assert!((v.zoom() - 2.0).abs() < 1e-9);
        assert!((v.home_scale() - 0.4).abs() < EPS);
    }

    #[test]
    fn test_spring_without_duration_jumps() {
        let mut s = Spring::new(1.0, 0.0);
        s.spring_to(5.0, 3.0);
        assert_eq!(s.current(), 5.0);
        assert!(!s.update(3.0));
    }
}
