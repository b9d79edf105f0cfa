// src/components/upload_page.rs
use crate::components::notice::Notice;
use crate::config::UploadTiming;
use crate::error::UploadError;
use crate::route::Route;
use crate::upload::{StageToken, TickOutcome, UploadPhase, UploadState};
use gloo::file::callbacks::{read_as_data_url, FileReader};
use gloo::file::File;
use gloo::timers::callback::{Interval, Timeout};
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UploadPageProps {
    pub timing: UploadTiming,
    pub on_navigate: Callback<Route>,
    pub on_notify: Callback<Notice>,
}

pub enum UploadMsg {
    FilePicked(Option<web_sys::File>),
    FileDropped(Option<web_sys::File>),
    DragOver(bool),
    PreviewDecoded {
        token: StageToken,
        result: Result<String, String>,
    },
    Process,
    Tick,
    HandOff,
    Remove,
}

pub struct UploadPage {
    state: UploadState,
    // Each handle cancels its task when dropped.
    reader: Option<FileReader>,
    ticker: Option<Interval>,
    handoff: Option<Timeout>,
    drag_over: bool,
}

impl Component for UploadPage {
    type Message = UploadMsg;
    type Properties = UploadPageProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            state: UploadState::new(ctx.props().timing.clone()),
            reader: None,
            ticker: None,
            handoff: None,
            drag_over: false,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let timing = &ctx.props().timing;
        if *timing != old_props.timing && !self.state.set_timing(timing.clone()) {
            log::debug!("Upload pacing changed mid-run; keeping the current pace");
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            UploadMsg::FilePicked(file) => {
                if let Some(file) = file {
                    self.stage_file(ctx, File::from(file), false);
                }
                true
            }
            UploadMsg::FileDropped(file) => {
                self.drag_over = false;
                match file {
                    Some(file) => self.stage_file(ctx, File::from(file), true),
                    None => self.report(ctx, UploadError::InvalidDrop { mime: String::new() }),
                }
                true
            }
            UploadMsg::DragOver(over) => {
                let changed = self.drag_over != over;
                self.drag_over = over;
                changed
            }
            UploadMsg::PreviewDecoded { token, result } => {
                if self.state.is_current(token) {
                    self.reader = None;
                }
                match result {
                    Ok(data_url) => match self.state.preview_ready(token, data_url) {
                        Ok(true) => {
                            log::info!("Preview ready for staged file");
                            ctx.props()
                                .on_notify
                                .emit(Notice::success("Image loaded successfully!"));
                        }
                        Ok(false) => log::debug!("Discarded preview of a replaced file"),
                        Err(e) => self.report(ctx, e),
                    },
                    Err(reason) => {
                        if let Some(e) = self.state.preview_failed(token, reason) {
                            self.report(ctx, e);
                        }
                    }
                }
                true
            }
            UploadMsg::Process => {
                if let Err(e) = self.state.process() {
                    self.report(ctx, e);
                    return true;
                }
                let link = ctx.link().clone();
                self.ticker = Some(Interval::new(
                    self.state.timing().tick_interval_ms,
                    move || link.send_message(UploadMsg::Tick),
                ));
                log::info!("Processing started");
                true
            }
            UploadMsg::Tick => match self.state.tick() {
                TickOutcome::Advanced(_) => true,
                TickOutcome::Finished => {
                    self.ticker = None;
                    let link = ctx.link().clone();
                    self.handoff = Some(Timeout::new(
                        self.state.timing().handoff_delay_ms,
                        move || link.send_message(UploadMsg::HandOff),
                    ));
                    true
                }
                TickOutcome::Idle => false,
            },
            UploadMsg::HandOff => {
                self.handoff = None;
                match self.state.hand_off() {
                    Ok(reference) => {
                        log::info!("Handing {} off to the viewer", reference);
                        ctx.props()
                            .on_notify
                            .emit(Notice::success("Image processed successfully!"));
                        ctx.props().on_navigate.emit(Route::viewer(reference));
                    }
                    Err(e) => self.report(ctx, e),
                }
                true
            }
            UploadMsg::Remove => match self.state.remove() {
                Ok(()) => {
                    self.reader = None;
                    true
                }
                Err(e) => {
                    log::warn!("Remove refused: {}", e);
                    false
                }
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let go_home = {
            let on_navigate = ctx.props().on_navigate.clone();
            Callback::from(move |_| on_navigate.emit(Route::Landing))
        };

        html! {
            <div class="page upload">
                <header class="page-header">
                    <div>
                        <button class="ghost" onclick={go_home}>{"← Back to Home"}</button>
                        <h1>{"Upload Your Image"}</h1>
                        <p class="subtitle">{"Upload a high-resolution image to explore in infinite detail"}</p>
                    </div>
                </header>
                <div class="upload-body">
                    {
                        if self.state.candidate().is_none() {
                            self.render_dropzone(ctx)
                        } else {
                            self.render_candidate(ctx)
                        }
                    }
                </div>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        let cancelled = self.ticker.take().is_some() | self.handoff.take().is_some();
        if cancelled {
            log::info!("Upload page left mid-processing; timers cancelled");
        }
        self.reader = None;
    }
}

impl UploadPage {
    fn stage_file(&mut self, ctx: &Context<Self>, file: File, dropped: bool) {
        let name = file.name();
        let size = file.size();
        let mime = file.raw_mime_type();
        let staged = if dropped {
            self.state.accept_drop(name.clone(), size, mime)
        } else {
            self.state.stage(name.clone(), size, mime)
        };
        match staged {
            Ok(token) => {
                log::info!("Staged {} ({} bytes)", name, size);
                let link = ctx.link().clone();
                self.reader = Some(read_as_data_url(&file, move |result| {
                    link.send_message(UploadMsg::PreviewDecoded {
                        token,
                        result: result.map_err(|e| format!("{:?}", e)),
                    });
                }));
            }
            Err(e) => self.report(ctx, e),
        }
    }

    fn report(&self, ctx: &Context<Self>, error: UploadError) {
        log::warn!("{}", error);
        ctx.props().on_notify.emit(Notice::error(error.to_string()));
    }

    fn render_dropzone(&self, ctx: &Context<Self>) -> Html {
        let ondrop = ctx.link().callback(|e: DragEvent| {
            e.prevent_default();
            let file = e
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0));
            UploadMsg::FileDropped(file)
        });
        let ondragover = ctx.link().callback(|e: DragEvent| {
            e.prevent_default();
            UploadMsg::DragOver(true)
        });
        let ondragleave = ctx.link().callback(|_: DragEvent| UploadMsg::DragOver(false));
        let onchange = ctx.link().callback(|e: Event| {
            let file = e
                .target_dyn_into::<HtmlInputElement>()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            UploadMsg::FilePicked(file)
        });

        let class = if self.drag_over {
            "dropzone dropzone-active"
        } else {
            "dropzone"
        };

        html! {
            <div {class} {ondrop} {ondragover} {ondragleave}>
                <div class="dropzone-icon">{"⬆"}</div>
                <h3>{"Drag & drop your image here"}</h3>
                <p>{"or click to browse your files"}</p>
                <input type="file" accept="image/*" id="file-upload" class="hidden" {onchange} />
                <label for="file-upload" class="button primary">{"Choose File"}</label>
                <p class="hint">{"Supports: JPG, PNG, TIFF • Max size: 100MB"}</p>
            </div>
        }
    }

    fn render_candidate(&self, ctx: &Context<Self>) -> Html {
        let Some(candidate) = self.state.candidate() else {
            return html! {};
        };
        let processing = self.state.is_processing();
        let progress = self.state.progress();
        let preview = self
            .state
            .preview()
            .map(|r| r.as_str().to_string())
            .unwrap_or_default();

        let on_remove = ctx.link().callback(|_| UploadMsg::Remove);
        let on_process = ctx.link().callback(|_| UploadMsg::Process);

        html! {
            <div class="candidate">
                <div class="candidate-preview">
                    if preview.is_empty() {
                        <div class="loading">{"Reading file..."}</div>
                    } else {
                        <img src={preview} alt="Preview" />
                    }
                    <button
                        class="remove"
                        title="Remove"
                        onclick={on_remove}
                        disabled={!self.state.can_remove()}
                    >
                        {"✕"}
                    </button>
                </div>

                <div class="candidate-card">
                    <div class="candidate-info">
                        <div>
                            <p class="candidate-name">{candidate.name.clone()}</p>
                            <p class="candidate-size">{candidate.size_label()}</p>
                        </div>
                        if progress == 100 {
                            <div class="ready">{"✓ Ready"}</div>
                        }
                    </div>

                    if processing {
                        <div class="progress">
                            <div class="progress-label">
                                <span>{"Processing image tiles..."}</span>
                                <span>{format!("{}%", progress)}</span>
                            </div>
                            <div class="progress-track">
                                <div class="progress-fill" style={format!("width: {}%;", progress)} />
                            </div>
                        </div>
                    }

                    <button
                        class="primary wide"
                        onclick={on_process}
                        disabled={processing || self.state.phase() == UploadPhase::HandedOff}
                    >
                        { if processing { "Processing..." } else { "Process & Explore" } }
                    </button>
                </div>
            </div>
        }
    }
}
