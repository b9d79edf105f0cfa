// src/engine.rs
//
// DOM rendering engine for the viewer. Opening a session builds its own
// nodes inside the mount element (the image surface and the navigator) and
// drives them from a `Viewport`; nothing outside this module touches them.

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::image_ref::ImageReference;
use crate::session::{EngineEvent, EngineHandle, RenderEngine};
use crate::viewport::{Point, Size, Viewport};
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo_events::{EventListener, EventListenerOptions};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, HtmlImageElement, MouseEvent, WheelEvent};
use yew::Callback;

const ACCENT: &str = "hsl(280 80% 65%)";
const ACCENT_FILL: &str = "hsl(280 80% 65% / 0.3)";

pub struct DomEngine {
    mount: HtmlElement,
}

pub struct DomSession {
    inner: Rc<SessionInner>,
}

struct Nodes {
    surface: HtmlElement,
    image: HtmlImageElement,
    navigator: HtmlElement,
    thumbnail: HtmlImageElement,
    region: HtmlElement,
}

struct SessionInner {
    mount: HtmlElement,
    nodes: Nodes,
    config: ViewerConfig,
    on_event: Callback<EngineEvent>,
    viewport: RefCell<Option<Viewport>>,
    frame: RefCell<Option<AnimationFrame>>,
    listeners: RefCell<Vec<EventListener>>,
    drag: Cell<Option<(f64, f64)>>,
    last_zoom: Cell<f64>,
    destroyed: Cell<bool>,
}

fn now() -> f64 {
    js_sys::Date::now() / 1000.0
}

fn js_error(e: JsValue) -> ViewerError {
    ViewerError::EngineLoad(format!("{:?}", e))
}

fn create<T: JsCast>(document: &Document, tag: &str, class: &str, style: &str) -> Result<T, ViewerError> {
    let element = document.create_element(tag).map_err(js_error)?;
    element.set_class_name(class);
    element.set_attribute("style", style).map_err(js_error)?;
    element
        .dyn_into::<T>()
        .map_err(|_| ViewerError::EngineLoad(format!("<{}> has an unexpected element type", tag)))
}

impl DomEngine {
    pub fn new(mount: HtmlElement) -> Self {
        Self { mount }
    }
}

impl RenderEngine for DomEngine {
    type Handle = DomSession;

    fn open(
        &self,
        reference: &ImageReference,
        config: &ViewerConfig,
        on_event: Callback<EngineEvent>,
    ) -> Result<DomSession, ViewerError> {
        let document = self.mount.owner_document().ok_or(ViewerError::NotMounted)?;

        let surface: HtmlElement = create(
            &document,
            "div",
            "dz-surface",
            "position:absolute; inset:0; overflow:hidden; cursor:grab; touch-action:none;",
        )?;
        let image: HtmlImageElement = create(
            &document,
            "img",
            "dz-image",
            &format!(
                "position:absolute; left:0; top:0; transform-origin:0 0; max-width:none; \
                 pointer-events:none; user-select:none; opacity:0; transition: opacity {}s;",
                config.blend_time
            ),
        )?;
        image.set_draggable(false);
        let navigator: HtmlElement = create(
            &document,
            "div",
            "dz-navigator",
            &format!(
                "position:absolute; {} display:none; overflow:hidden; cursor:pointer; \
                 border:2px solid {}; background:rgba(0,0,0,0.5); z-index:2;",
                config.navigator_corner.css(),
                ACCENT
            ),
        )?;
        let thumbnail: HtmlImageElement = create(
            &document,
            "img",
            "dz-navigator-thumb",
            "display:block; width:100%; height:100%; pointer-events:none;",
        )?;
        let region: HtmlElement = create(
            &document,
            "div",
            "dz-navigator-region",
            &format!(
                "position:absolute; box-sizing:border-box; pointer-events:none; \
                 border:2px solid {}; background:{};",
                ACCENT, ACCENT_FILL
            ),
        )?;

        surface.append_child(&image).map_err(js_error)?;
        navigator.append_child(&thumbnail).map_err(js_error)?;
        navigator.append_child(&region).map_err(js_error)?;
        self.mount.append_child(&surface).map_err(js_error)?;
        if config.navigator_enabled {
            if let Err(e) = self.mount.append_child(&navigator) {
                surface.remove();
                return Err(js_error(e));
            }
        }

        let inner = Rc::new(SessionInner {
            mount: self.mount.clone(),
            nodes: Nodes {
                surface,
                image,
                navigator,
                thumbnail,
                region,
            },
            config: config.clone(),
            on_event,
            viewport: RefCell::new(None),
            frame: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            drag: Cell::new(None),
            last_zoom: Cell::new(0.0),
            destroyed: Cell::new(false),
        });
        inner.install_listeners(&document);
        inner.nodes.image.set_src(reference.as_str());

        Ok(DomSession { inner })
    }
}

impl EngineHandle for DomSession {
    fn zoom_by(&self, factor: f64) {
        self.inner.animate(|viewport, now| viewport.zoom_by(factor, None, now));
    }

    fn go_home(&self) {
        self.inner.animate(|viewport, now| viewport.go_home(now));
    }

    fn destroy(self) {
        self.inner.teardown();
    }
}

impl SessionInner {
    fn install_listeners(self: &Rc<Self>, document: &Document) {
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.nodes.image, "load", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.on_image_loaded();
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.nodes.image, "error", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner
                    .on_event
                    .emit(EngineEvent::Failed("The image could not be loaded".to_string()));
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &self.nodes.surface,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<WheelEvent>() else {
                    return;
                };
                event.prevent_default();
                if let Some(inner) = weak.upgrade() {
                    inner.on_wheel(event);
                }
            },
        ));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &self.nodes.surface,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if event.button() != 0 {
                    return;
                }
                event.prevent_default();
                if let Some(inner) = weak.upgrade() {
                    inner
                        .drag
                        .set(Some((event.client_x() as f64, event.client_y() as f64)));
                    let _ = inner.nodes.surface.style().set_property("cursor", "grabbing");
                }
            },
        ));

        // Drags continue outside the surface, so move/up are tracked on the document.
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(document, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if let Some(inner) = weak.upgrade() {
                inner.on_drag(event);
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(document, "mouseup", move |_| {
            if let Some(inner) = weak.upgrade() {
                if inner.drag.take().is_some() {
                    let _ = inner.nodes.surface.style().set_property("cursor", "grab");
                }
            }
        }));

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&self.nodes.navigator, "click", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            if let Some(inner) = weak.upgrade() {
                inner.on_navigator_click(event);
            }
        }));

        if let Some(window) = web_sys::window() {
            let weak = Rc::downgrade(self);
            listeners.push(EventListener::new(&window, "resize", move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_resize();
                }
            }));
        }

        *self.listeners.borrow_mut() = listeners;
    }

    fn container_size(&self) -> Size {
        Size::new(
            self.mount.client_width() as f64,
            self.mount.client_height() as f64,
        )
    }

    fn navigator_width(&self) -> f64 {
        self.container_size().width * self.config.navigator_size_ratio
    }

    /// Client coordinates -> coordinates relative to `element`.
    fn local_point(element: &HtmlElement, client_x: i32, client_y: i32) -> Point {
        let rect = element.get_bounding_client_rect();
        Point::new(client_x as f64 - rect.left(), client_y as f64 - rect.top())
    }

    fn on_image_loaded(self: &Rc<Self>) {
        let width = self.nodes.image.natural_width();
        let height = self.nodes.image.natural_height();
        if width == 0 || height == 0 {
            self.on_event
                .emit(EngineEvent::Failed("The image has no pixels".to_string()));
            return;
        }

        let viewport = Viewport::new(
            Size::new(width as f64, height as f64),
            self.container_size(),
            &self.config,
        );
        *self.viewport.borrow_mut() = Some(viewport);

        let _ = self.nodes.image.style().set_property("opacity", "1");
        if self.config.navigator_enabled {
            self.nodes.thumbnail.set_src(&self.nodes.image.src());
            let _ = self.nodes.navigator.style().set_property("display", "block");
            self.layout_navigator();
        }

        self.on_event.emit(EngineEvent::Ready { width, height });
        self.render();
    }

    fn on_wheel(self: &Rc<Self>, event: &WheelEvent) {
        let delta = event.delta_y();
        let factor = if delta < 0.0 {
            self.config.scroll_zoom_factor
        } else if delta > 0.0 {
            1.0 / self.config.scroll_zoom_factor
        } else {
            return;
        };
        let anchor = Self::local_point(&self.mount, event.client_x(), event.client_y());
        self.animate(|viewport, now| viewport.zoom_by(factor, Some(anchor), now));
    }

    fn on_drag(self: &Rc<Self>, event: &MouseEvent) {
        let Some((last_x, last_y)) = self.drag.get() else {
            return;
        };
        let (x, y) = (event.client_x() as f64, event.client_y() as f64);
        self.drag.set(Some((x, y)));
        if let Some(viewport) = self.viewport.borrow_mut().as_mut() {
            viewport.pan_by(x - last_x, y - last_y);
        }
        self.schedule_frame();
    }

    fn on_navigator_click(self: &Rc<Self>, event: &MouseEvent) {
        let point = Self::local_point(&self.nodes.navigator, event.client_x(), event.client_y());
        let width = self.navigator_width();
        self.animate(|viewport, now| {
            let navigator = viewport.navigator_size(width);
            let target = viewport.navigator_to_image(navigator, point);
            viewport.pan_to(target, now);
        });
    }

    fn on_resize(self: &Rc<Self>) {
        let size = self.container_size();
        if let Some(viewport) = self.viewport.borrow_mut().as_mut() {
            viewport.resize(size);
        }
        self.layout_navigator();
        self.schedule_frame();
    }

    /// Apply a viewport change and animate towards it. No-op before the image loads.
    fn animate(self: &Rc<Self>, change: impl FnOnce(&mut Viewport, f64)) {
        let applied = match self.viewport.borrow_mut().as_mut() {
            Some(viewport) => {
                change(viewport, now());
                true
            }
            None => false,
        };
        if applied {
            self.schedule_frame();
        }
    }

    fn schedule_frame(self: &Rc<Self>) {
        if self.destroyed.get() || self.frame.borrow().is_some() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.frame.borrow_mut().take();
            let animating = inner
                .viewport
                .borrow_mut()
                .as_mut()
                .map(|viewport| viewport.update(now()))
                .unwrap_or(false);
            inner.render();
            if animating {
                inner.schedule_frame();
            }
        });
        *self.frame.borrow_mut() = Some(handle);
    }

    fn layout_navigator(&self) {
        if !self.config.navigator_enabled {
            return;
        }
        let width = self.navigator_width();
        let Some(size) = self.viewport.borrow().as_ref().map(|v| v.navigator_size(width)) else {
            return;
        };
        let style = self.nodes.navigator.style();
        let _ = style.set_property("width", &format!("{}px", size.width));
        let _ = style.set_property("height", &format!("{}px", size.height));
    }

    fn render(&self) {
        if self.destroyed.get() {
            return;
        }
        let width = self.navigator_width();
        let Some((transform, region)) = self.viewport.borrow().as_ref().map(|v| {
            let navigator = v.navigator_size(width);
            (v.transform(), v.navigator_region(navigator))
        }) else {
            return;
        };

        let _ = self.nodes.image.style().set_property(
            "transform",
            &format!(
                "translate({}px, {}px) scale({})",
                transform.translate_x, transform.translate_y, transform.scale
            ),
        );

        if self.config.navigator_enabled {
            let style = self.nodes.region.style();
            let _ = style.set_property("left", &format!("{}px", region.x));
            let _ = style.set_property("top", &format!("{}px", region.y));
            let _ = style.set_property("width", &format!("{}px", region.width));
            let _ = style.set_property("height", &format!("{}px", region.height));
        }

        let last = self.last_zoom.get();
        if (transform.scale - last).abs() > transform.scale * 1e-4 {
            self.last_zoom.set(transform.scale);
            self.on_event.emit(EngineEvent::ZoomChanged(transform.scale));
        }
    }

    fn teardown(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        // Dropping the frame handle cancels it; dropping listeners detaches them.
        self.frame.borrow_mut().take();
        self.listeners.borrow_mut().clear();
        self.drag.set(None);
        let _ = self.nodes.image.remove_attribute("src");
        self.nodes.navigator.remove();
        self.nodes.surface.remove();
    }
}
