// src/components/gallery_page.rs
use crate::gallery::{GalleryCatalog, GalleryEntry};
use crate::route::Route;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct GalleryPageProps {
    pub entries: Vec<GalleryEntry>,
    pub on_navigate: Callback<Route>,
}

#[function_component(GalleryPage)]
pub fn gallery_page(props: &GalleryPageProps) -> Html {
    let go_home = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_| on_navigate.emit(Route::Landing))
    };
    let go_upload = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_| on_navigate.emit(Route::Upload))
    };

    let on_select = {
        let entries = props.entries.clone();
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |id: u32| match GalleryCatalog::find(&entries, id) {
            Some(entry) => on_navigate.emit(Route::viewer(entry.image_reference())),
            None => log::warn!("No gallery entry with id {}", id),
        })
    };

    let body = if props.entries.is_empty() {
        html! {
            <div class="empty-state">
                <h2>{"No images yet"}</h2>
                <p>{"Upload your first image to start exploring infinite detail"}</p>
                <button class="primary" onclick={go_upload.clone()}>{"Upload Your First Image"}</button>
            </div>
        }
    } else {
        html! {
            <div class="gallery-grid">
                {for props.entries.iter().map(|entry| {
                    let id = entry.id;
                    let onclick = on_select.reform(move |_| id);
                    html! {
                        <div key={entry.id} class="gallery-card" {onclick}>
                            <div class="gallery-thumb">
                                <img src={entry.thumbnail.as_str().to_string()} alt={entry.name.clone()} />
                                <div class="gallery-thumb-overlay">{"🔍"}</div>
                            </div>
                            <div class="gallery-meta">
                                <h3>{entry.name.clone()}</h3>
                                <div class="gallery-details">
                                    <span>{entry.size_label.clone()}</span>
                                    <span>{entry.uploaded_at.clone()}</span>
                                </div>
                            </div>
                        </div>
                    }
                })}
            </div>
        }
    };

    html! {
        <div class="page gallery">
            <header class="page-header">
                <div>
                    <button class="ghost" onclick={go_home}>{"← Back to Home"}</button>
                    <h1>{"Your Gallery"}</h1>
                    <p class="subtitle">{"Manage and explore your uploaded images"}</p>
                </div>
                <button class="primary" onclick={go_upload}>{"Upload New Image"}</button>
            </header>
            { body }
        </div>
    }
}
