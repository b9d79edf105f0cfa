// src/components/notice.rs
use yew::prelude::*;

/// How long a notice stays on screen.
pub const NOTICE_TIMEOUT_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, non-blocking message shown in the corner of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeStackProps {
    pub notices: Vec<(u64, Notice)>,
    pub on_dismiss: Callback<u64>,
}

#[function_component(NoticeStack)]
pub fn notice_stack(props: &NoticeStackProps) -> Html {
    html! {
        <div class="notice-stack" role="status" aria-live="polite">
            {for props.notices.iter().map(|(id, notice)| {
                let id = *id;
                let on_dismiss = props.on_dismiss.clone();
                let class = match notice.kind {
                    NoticeKind::Success => "notice notice-success",
                    NoticeKind::Error => "notice notice-error",
                };
                html! {
                    <div key={id} {class} onclick={Callback::from(move |_| on_dismiss.emit(id))}>
                        {notice.text.clone()}
                    </div>
                }
            })}
        </div>
    }
}
