// src/fullscreen.rs
//
// The document owns the real fullscreen state; the viewer only keeps a copy
// for rendering. The copy is set optimistically on request and overwritten
// whenever the document reports a change or an error.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenAction {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullscreenState {
    active: bool,
    pending: bool,
}

impl FullscreenState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// A request has been issued and no change event has confirmed it yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Decide from the document's own state, not from the cached flag.
    pub fn next_action(document_is_fullscreen: bool) -> FullscreenAction {
        if document_is_fullscreen {
            FullscreenAction::Exit
        } else {
            FullscreenAction::Enter
        }
    }

    pub fn requested(&mut self, action: FullscreenAction) {
        self.pending = true;
        self.active = action == FullscreenAction::Enter;
    }

    /// Take the document's word for it. Returns true if the flag changed.
    pub fn sync(&mut self, document_is_fullscreen: bool) -> bool {
        self.pending = false;
        let changed = self.active != document_is_fullscreen;
        self.active = document_is_fullscreen;
        changed
    }
}
