// src/main.rs
mod components;
mod config;
mod engine;
mod error;
mod fullscreen;
mod gallery;
mod image_ref;
mod route;
mod session;
mod upload;
mod utils;
mod viewport;

use components::gallery_page::GalleryPage;
use components::landing::Landing;
use components::notice::{Notice, NoticeStack, NOTICE_TIMEOUT_MS};
use components::upload_page::UploadPage;
use components::viewer_page::ViewerPage;
use config::AppConfig;
use gallery::{GalleryCatalog, GalleryEntry};
use gloo::history::{BrowserHistory, History, HistoryListener};
use gloo::timers::callback::Timeout;
use route::Route;
use yew::prelude::*;

pub enum AppMsg {
    Navigate(Route),
    RouteChanged,
    Notify(Notice),
    DismissNotice(u64),
}

pub struct App {
    history: BrowserHistory,
    route: Route,
    config: AppConfig,
    gallery: Vec<GalleryEntry>,
    notices: Vec<(u64, Notice, Timeout)>,
    next_notice: u64,
    _history_listener: HistoryListener,
}

impl Component for App {
    type Message = AppMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let history = BrowserHistory::new();
        let link = ctx.link().clone();
        let listener = history.listen(move || link.send_message(AppMsg::RouteChanged));

        let route = route::current_route(&history);
        log::info!("Starting at {:?}", route);

        Self {
            route,
            config: AppConfig::load(),
            gallery: GalleryCatalog::demo(&utils::get_base_url()),
            notices: Vec::new(),
            next_notice: 0,
            _history_listener: listener,
            history,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            AppMsg::Navigate(route) => {
                if let Err(e) = route::navigate(&self.history, &route) {
                    log::error!("{}", e);
                    self.notify(ctx, Notice::error(e.to_string()));
                    return true;
                }
                self.route = route;
                true
            }
            AppMsg::RouteChanged => {
                // Fires for our own pushes as well as back/forward.
                let route = route::current_route(&self.history);
                if route == self.route {
                    return false;
                }
                log::debug!("Location changed to {:?}", route);
                self.route = route;
                true
            }
            AppMsg::Notify(notice) => {
                self.notify(ctx, notice);
                true
            }
            AppMsg::DismissNotice(id) => {
                let before = self.notices.len();
                self.notices.retain(|(notice_id, _, _)| *notice_id != id);
                self.notices.len() != before
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_navigate = ctx.link().callback(AppMsg::Navigate);
        let on_notify = ctx.link().callback(AppMsg::Notify);
        let on_dismiss = ctx.link().callback(AppMsg::DismissNotice);

        let page = match &self.route {
            Route::Landing => html! { <Landing {on_navigate} /> },
            Route::Upload => html! {
                <UploadPage
                    timing={self.config.upload.clone()}
                    {on_navigate}
                    {on_notify}
                />
            },
            Route::Gallery => html! {
                <GalleryPage entries={self.gallery.clone()} {on_navigate} />
            },
            Route::Viewer(image) => html! {
                <ViewerPage
                    image={image.clone()}
                    config={self.config.viewer.clone()}
                    {on_navigate}
                />
            },
            Route::NotFound(path) => {
                let go_home = on_navigate.reform(|_| Route::Landing);
                html! {
                    <div class="page not-found">
                        <h1>{"404"}</h1>
                        <p>{format!("Nothing lives at {}", path)}</p>
                        <button class="primary" onclick={go_home}>{"Return to Home"}</button>
                    </div>
                }
            }
        };

        let notices = self
            .notices
            .iter()
            .map(|(id, notice, _)| (*id, notice.clone()))
            .collect::<Vec<_>>();

        html! {
            <div class="app-container">
                <main class="app-main">
                    { page }
                </main>
                <NoticeStack {notices} {on_dismiss} />
            </div>
        }
    }
}

impl App {
    fn notify(&mut self, ctx: &Context<Self>, notice: Notice) {
        let id = self.next_notice;
        self.next_notice += 1;
        let link = ctx.link().clone();
        let timeout = Timeout::new(NOTICE_TIMEOUT_MS, move || {
            link.send_message(AppMsg::DismissNotice(id))
        });
        self.notices.push((id, notice, timeout));
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
