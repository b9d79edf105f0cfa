// src/components/viewer_page.rs
use crate::config::ViewerConfig;
use crate::engine::{DomEngine, DomSession};
use crate::error::ViewerError;
use crate::fullscreen::{FullscreenAction, FullscreenState};
use crate::image_ref::ImageReference;
use crate::route::Route;
use crate::session::{SessionEvent, SessionSlot, ViewerPhase};
use gloo::events::EventListener;
use gloo::utils::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent};
use yew::prelude::*;

pub const ZOOM_IN_FACTOR: f64 = 1.5;
/// Close to, but not exactly, the inverse of `ZOOM_IN_FACTOR`.
pub const ZOOM_OUT_FACTOR: f64 = 0.67;

#[derive(Properties, PartialEq)]
pub struct ViewerPageProps {
    pub image: Option<ImageReference>,
    pub config: ViewerConfig,
    pub on_navigate: Callback<Route>,
}

pub enum ViewerMsg {
    Engine(SessionEvent),
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleFullscreen,
    FullscreenChanged,
    FullscreenError,
    Retry,
    Navigate(Route),
    Redraw,
}

pub struct ViewerPage {
    stage: NodeRef,
    mount: NodeRef,
    session: SessionSlot<DomSession>,
    fullscreen: FullscreenState,
    // Set when the next render must open a session for the current image.
    open_pending: bool,
    _listeners: Vec<EventListener>,
}

impl Component for ViewerPage {
    type Message = ViewerMsg;
    type Properties = ViewerPageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let document = document();
        let mut listeners = Vec::new();

        let link = ctx.link().clone();
        listeners.push(EventListener::new(&document, "fullscreenchange", move |_| {
            link.send_message(ViewerMsg::FullscreenChanged);
        }));
        let link = ctx.link().clone();
        listeners.push(EventListener::new(&document, "fullscreenerror", move |_| {
            link.send_message(ViewerMsg::FullscreenError);
        }));

        // ------ KEYBOARD SHORTCUTS ------
        let link = ctx.link().clone();
        listeners.push(EventListener::new(&document, "keydown", move |event| {
            let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let msg = match keyboard_event.key().as_str() {
                "+" | "=" => ViewerMsg::ZoomIn,
                "-" | "_" => ViewerMsg::ZoomOut,
                "r" | "R" => ViewerMsg::ResetView,
                "f" | "F" => ViewerMsg::ToggleFullscreen,
                _ => return,
            };
            keyboard_event.prevent_default();
            link.send_message(msg);
        }));

        Self {
            stage: NodeRef::default(),
            mount: NodeRef::default(),
            session: SessionSlot::new(),
            fullscreen: FullscreenState::default(),
            open_pending: ctx.props().image.is_some(),
            _listeners: listeners,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.image != old_props.image || props.config != old_props.config {
            // The old session goes away before the next render opens a new one.
            self.session.close();
            self.open_pending = props.image.is_some();
        }
        true
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        if self.open_pending {
            self.open_pending = false;
            self.open_session(ctx);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ViewerMsg::Engine(event) => self.session.handle_event(event),
            ViewerMsg::ZoomIn => {
                self.session.zoom_by(ZOOM_IN_FACTOR);
                false
            }
            ViewerMsg::ZoomOut => {
                self.session.zoom_by(ZOOM_OUT_FACTOR);
                false
            }
            ViewerMsg::ResetView => {
                self.session.go_home();
                false
            }
            ViewerMsg::ToggleFullscreen => self.toggle_fullscreen(),
            ViewerMsg::FullscreenChanged => self
                .fullscreen
                .sync(document().fullscreen_element().is_some()),
            ViewerMsg::FullscreenError => {
                log::warn!(
                    "{}",
                    ViewerError::FullscreenDenied("the host refused the request".to_string())
                );
                self.fullscreen
                    .sync(document().fullscreen_element().is_some());
                true
            }
            ViewerMsg::Retry => {
                let Some(mount) = self.mount.cast::<HtmlElement>() else {
                    if let Some(reference) = self.session.reference().cloned() {
                        self.session.fail(reference, &ViewerError::NotMounted);
                    }
                    return true;
                };
                let engine = DomEngine::new(mount);
                let on_event = ctx.link().callback(ViewerMsg::Engine);
                if let Err(e) = self.session.retry(&engine, &ctx.props().config, &on_event) {
                    log::error!("Retry failed: {}", e);
                }
                true
            }
            ViewerMsg::Navigate(route) => {
                ctx.props().on_navigate.emit(route);
                false
            }
            ViewerMsg::Redraw => true,
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if ctx.props().image.is_none() {
            let upload = ctx.link().callback(|_| ViewerMsg::Navigate(Route::Upload));
            return html! {
                <div class="page viewer-fallback">
                    <p class="fallback-text">{"No image selected"}</p>
                    <button class="primary" onclick={upload}>{"Upload an Image"}</button>
                </div>
            };
        }

        let go_home = ctx.link().callback(|_| ViewerMsg::Navigate(Route::Landing));
        let zoom_in = ctx.link().callback(|_| ViewerMsg::ZoomIn);
        let zoom_out = ctx.link().callback(|_| ViewerMsg::ZoomOut);
        let reset = ctx.link().callback(|_| ViewerMsg::ResetView);
        let toggle_fullscreen = ctx.link().callback(|_| ViewerMsg::ToggleFullscreen);

        let zoom_label = match self.session.zoom() {
            Some(zoom) => format!("{}%", (zoom * 100.0).round() as i64),
            None => "--".to_string(),
        };
        let ready = *self.session.phase() == ViewerPhase::Ready;

        html! {
            <div class="viewer-page">
                <header class="viewer-header">
                    <div class="viewer-title">
                        <button class="ghost" onclick={go_home} title="Home">{"⌂"}</button>
                        <div>
                            <h1>{"Deep Zoom Viewer"}</h1>
                            <p class="subtitle">{"Scroll to zoom • Drag to pan"}</p>
                        </div>
                    </div>
                    <div class="viewer-controls">
                        <button class="outline" onclick={zoom_out} title="Zoom Out (-)">{"🔍 -"}</button>
                        <button class="outline" onclick={reset} title="Reset View (R)">{"⟲"}</button>
                        <button class="outline" onclick={zoom_in} title="Zoom In (+)">{"🔍 +"}</button>
                        <span class="zoom-level" title="Screen pixels per image pixel">{zoom_label}</span>
                        <button
                            class="primary"
                            onclick={toggle_fullscreen}
                            title="Fullscreen (F)"
                            disabled={self.fullscreen.is_pending()}
                        >
                            { if self.fullscreen.is_active() { "Exit Fullscreen" } else { "Fullscreen" } }
                        </button>
                    </div>
                </header>

                <div ref={self.stage.clone()} class="viewer-stage">
                    <div ref={self.mount.clone()} class="viewer-mount"></div>
                    { self.render_overlay(ctx) }
                </div>

                if ready {
                    <div class="viewer-hint">{"💡 Try zooming in to see infinite detail"}</div>
                }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.session.close();
        if self.fullscreen.is_active() && document().fullscreen_element().is_some() {
            document().exit_fullscreen();
        }
    }
}

impl ViewerPage {
    fn open_session(&mut self, ctx: &Context<Self>) {
        let props = ctx.props();
        let Some(reference) = props.image.as_ref() else {
            return;
        };
        let Some(mount) = self.mount.cast::<HtmlElement>() else {
            self.session.fail(reference.clone(), &ViewerError::NotMounted);
            ctx.link().send_message(ViewerMsg::Redraw);
            return;
        };
        let engine = DomEngine::new(mount);
        let on_event = ctx.link().callback(ViewerMsg::Engine);
        if let Err(e) = self
            .session
            .sync(&engine, Some(reference), &props.config, &on_event)
        {
            log::error!("Could not open viewer session: {}", e);
            ctx.link().send_message(ViewerMsg::Redraw);
        }
    }

    fn toggle_fullscreen(&mut self) -> bool {
        let document = document();
        match FullscreenState::next_action(document.fullscreen_element().is_some()) {
            FullscreenAction::Enter => {
                let Some(stage) = self.stage.cast::<Element>() else {
                    return false;
                };
                match stage.request_fullscreen() {
                    Ok(()) => self.fullscreen.requested(FullscreenAction::Enter),
                    Err(e) => {
                        log::warn!("{}", ViewerError::FullscreenDenied(format!("{:?}", e)));
                        self.fullscreen.sync(document.fullscreen_element().is_some());
                    }
                }
            }
            FullscreenAction::Exit => {
                document.exit_fullscreen();
                self.fullscreen.requested(FullscreenAction::Exit);
            }
        }
        true
    }

    fn render_overlay(&self, ctx: &Context<Self>) -> Html {
        match self.session.phase() {
            ViewerPhase::Ready => html! {},
            ViewerPhase::NoImage | ViewerPhase::Initializing => html! {
                <div class="viewer-overlay">
                    <div class="spinner"></div>
                    <p>{"Loading deep zoom tiles..."}</p>
                </div>
            },
            ViewerPhase::Failed(reason) => {
                let retry = ctx.link().callback(|_| ViewerMsg::Retry);
                let upload = ctx.link().callback(|_| ViewerMsg::Navigate(Route::Upload));
                html! {
                    <div class="viewer-overlay viewer-error">
                        <p class="error">{format!("Error: {}", reason)}</p>
                        <div class="viewer-error-actions">
                            <button class="primary" onclick={retry}>{"Retry"}</button>
                            <button class="outline" onclick={upload}>{"Back to Upload"}</button>
                        </div>
                    </div>
                }
            }
        }
    }
}
