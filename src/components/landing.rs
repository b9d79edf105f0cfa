// src/components/landing.rs
use crate::gallery::GalleryCatalog;
use crate::route::Route;
use crate::utils::resource_url;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LandingProps {
    pub on_navigate: Callback<Route>,
}

const FEATURES: [(&str, &str, &str); 3] = [
    (
        "🔍",
        "Infinite Detail",
        "Zoom endlessly without losing quality. Every pixel stays crystal clear.",
    ),
    (
        "✨",
        "Smart Processing",
        "Advanced tiling technology ensures smooth, seamless exploration.",
    ),
    (
        "🖼",
        "Any Image",
        "Upload photos, artwork, or scans and explore them in depth.",
    ),
];

#[function_component(Landing)]
pub fn landing(props: &LandingProps) -> Html {
    let hovering = use_state(|| false);

    let go_upload = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_| on_navigate.emit(Route::Upload))
    };
    let go_gallery = {
        let on_navigate = props.on_navigate.clone();
        Callback::from(move |_| on_navigate.emit(Route::Gallery))
    };
    let onmouseenter = {
        let hovering = hovering.clone();
        Callback::from(move |_| hovering.set(true))
    };
    let onmouseleave = {
        let hovering = hovering.clone();
        Callback::from(move |_| hovering.set(false))
    };

    html! {
        <div class="page landing">
            <section class="hero">
                <h1 class="title">{"DeepZoomer"}</h1>
                <p class="tagline">{"Upload your image. Zoom into infinity."}</p>
                <p class="subtitle">{"Discover what your eyes can't see"}</p>
            </section>

            <div class="hero-demo" {onmouseenter} {onmouseleave}>
                <img
                    src={resource_url(GalleryCatalog::HERO_IMAGE_PATH)}
                    alt="Cosmic nebula demonstration"
                    style={if *hovering { "transform: scale(1.1);" } else { "transform: scale(1);" }}
                />
            </div>

            <div class="cta">
                <button class="primary" onclick={go_upload}>{"Upload Your Image"}</button>
                <button class="outline" onclick={go_gallery}>{"View Gallery"}</button>
            </div>

            <div class="features">
                {for FEATURES.iter().map(|(icon, title, description)| html! {
                    <div class="feature">
                        <div class="feature-icon">{*icon}</div>
                        <h3>{*title}</h3>
                        <p>{*description}</p>
                    </div>
                })}
            </div>
        </div>
    }
}
