// src/session.rs
//
// Ownership of the rendering session behind one mounted viewer. The slot is
// the only place a handle lives, and `destroy` consumes it, so a session is
// released exactly once whichever way the viewer leaves it.

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::image_ref::ImageReference;
use yew::Callback;

/// Signals a rendering engine sends back for the session it was opened with.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Ready { width: u32, height: u32 },
    Failed(String),
    /// Screen pixels per image pixel after a zoom step or animation frame.
    ZoomChanged(f64),
}

/// An engine event tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub session: u64,
    pub event: EngineEvent,
}

pub trait EngineHandle {
    fn zoom_by(&self, factor: f64);
    fn go_home(&self);
    /// Release every resource of the session: DOM nodes, listeners, pending frames.
    fn destroy(self);
}

pub trait RenderEngine {
    type Handle: EngineHandle;

    fn open(
        &self,
        reference: &ImageReference,
        config: &ViewerConfig,
        on_event: Callback<EngineEvent>,
    ) -> Result<Self::Handle, ViewerError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerPhase {
    NoImage,
    Initializing,
    Ready,
    Failed(String),
}

pub struct SessionSlot<H: EngineHandle> {
    handle: Option<H>,
    reference: Option<ImageReference>,
    phase: ViewerPhase,
    session: u64,
    zoom: Option<f64>,
}

impl<H: EngineHandle> Default for SessionSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: EngineHandle> SessionSlot<H> {
    pub fn new() -> Self {
        Self {
            handle: None,
            reference: None,
            phase: ViewerPhase::NoImage,
            session: 0,
            zoom: None,
        }
    }

    pub fn phase(&self) -> &ViewerPhase {
        &self.phase
    }

    pub fn reference(&self) -> Option<&ImageReference> {
        self.reference.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Id of the most recently opened session.
    #[cfg(test)]
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Last zoom reported by the engine, in screen pixels per image pixel.
    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    /// Open a session for `reference`, tearing down the current one first.
    pub fn open<E>(
        &mut self,
        engine: &E,
        reference: ImageReference,
        config: &ViewerConfig,
        on_event: &Callback<SessionEvent>,
    ) -> Result<(), ViewerError>
    where
        E: RenderEngine<Handle = H>,
    {
        self.close();

        self.session += 1;
        let session = self.session;
        let events = on_event.reform(move |event| SessionEvent { session, event });

        self.phase = ViewerPhase::Initializing;
        self.reference = Some(reference.clone());
        match engine.open(&reference, config, events) {
            Ok(handle) => {
                log::info!("Opened viewer session {} for {}", session, reference);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.phase = ViewerPhase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Make the slot match `reference`: no reference closes the session, an
    /// unchanged one keeps it, a new one replaces it. Returns whether a
    /// session was opened.
    pub fn sync<E>(
        &mut self,
        engine: &E,
        reference: Option<&ImageReference>,
        config: &ViewerConfig,
        on_event: &Callback<SessionEvent>,
    ) -> Result<bool, ViewerError>
    where
        E: RenderEngine<Handle = H>,
    {
        match reference {
            None => {
                self.close();
                Ok(false)
            }
            Some(r) if self.is_active() && self.reference.as_ref() == Some(r) => Ok(false),
            Some(r) => self.open(engine, r.clone(), config, on_event).map(|_| true),
        }
    }

    /// Tear down the failed (or current) session and open a fresh one for
    /// the same reference.
    pub fn retry<E>(
        &mut self,
        engine: &E,
        config: &ViewerConfig,
        on_event: &Callback<SessionEvent>,
    ) -> Result<(), ViewerError>
    where
        E: RenderEngine<Handle = H>,
    {
        let reference = self
            .reference
            .clone()
            .ok_or(ViewerError::MissingReference)?;
        self.open(engine, reference, config, on_event)
    }

    /// Record that no session could be started for `reference`, e.g. because
    /// the viewer has nowhere to mount it. Retry stays possible.
    pub fn fail(&mut self, reference: ImageReference, error: &ViewerError) {
        self.close();
        log::error!("Viewer for {} failed before opening: {}", reference, error);
        self.phase = ViewerPhase::Failed(error.to_string());
        self.reference = Some(reference);
    }

    /// Destroy the live session, if any. Returns whether one was destroyed.
    pub fn close(&mut self) -> bool {
        self.phase = ViewerPhase::NoImage;
        self.reference = None;
        self.zoom = None;
        match self.handle.take() {
            Some(handle) => {
                handle.destroy();
                log::info!("Destroyed viewer session {}", self.session);
                true
            }
            None => false,
        }
    }

    /// Apply an engine event. Events from earlier sessions are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        if event.session != self.session || self.handle.is_none() {
            return false;
        }
        match event.event {
            EngineEvent::Ready { width, height } => {
                log::info!("Viewer session {} ready ({}x{})", self.session, width, height);
                self.phase = ViewerPhase::Ready;
            }
            EngineEvent::Failed(reason) => {
                log::error!("Viewer session {} failed: {}", self.session, reason);
                self.phase = ViewerPhase::Failed(reason);
            }
            EngineEvent::ZoomChanged(zoom) => {
                if self.zoom == Some(zoom) {
                    return false;
                }
                self.zoom = Some(zoom);
            }
        }
        true
    }

    pub fn zoom_by(&self, factor: f64) {
        if let Some(handle) = &self.handle {
            handle.zoom_by(factor);
        }
    }

    pub fn go_home(&self) {
        if let Some(handle) = &self.handle {
            handle.go_home();
        }
    }
}

impl<H: EngineHandle> Drop for SessionSlot<H> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(String),
        ZoomBy(f64),
        GoHome,
        Destroy(String),
    }

    #[derive(Default, Clone)]
    struct MockEngine {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_with: Option<ViewerError>,
    }

    struct MockHandle {
        reference: String,
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl EngineHandle for MockHandle {
        fn zoom_by(&self, factor: f64) {
            self.calls.borrow_mut().push(Call::ZoomBy(factor));
        }

        fn go_home(&self) {
            self.calls.borrow_mut().push(Call::GoHome);
        }

        fn destroy(self) {
            self.calls.borrow_mut().push(Call::Destroy(self.reference));
        }
    }

    impl RenderEngine for MockEngine {
        type Handle = MockHandle;

        fn open(
            &self,
            reference: &ImageReference,
            _config: &ViewerConfig,
            _on_event: Callback<EngineEvent>,
        ) -> Result<MockHandle, ViewerError> {
            self.calls
                .borrow_mut()
                .push(Call::Open(reference.as_str().to_string()));
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            Ok(MockHandle {
                reference: reference.as_str().to_string(),
                calls: self.calls.clone(),
            })
        }
    }

    fn reference(s: &str) -> ImageReference {
        ImageReference::parse(s).unwrap()
    }

    fn noop() -> Callback<SessionEvent> {
        Callback::from(|_: SessionEvent| ())
    }

    fn event(session: u64, event: EngineEvent) -> SessionEvent {
        SessionEvent { session, event }
    }

    #[test]
    fn test_no_reference_never_opens() {
        let engine = MockEngine::default();
        let mut slot = SessionSlot::new();
        let opened = slot
            .sync(&engine, None, &ViewerConfig::default(), &noop())
            .unwrap();
        assert!(!opened);
        assert_eq!(slot.phase(), &ViewerPhase::NoImage);
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_reference_change_destroys_before_opening() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        let mut slot = SessionSlot::new();

        slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap();
        assert_eq!(slot.phase(), &ViewerPhase::Initializing);
        slot.sync(&engine, Some(&reference("b.jpg")), &config, &noop()).unwrap();

        assert_eq!(
            *engine.calls.borrow(),
            vec![
                Call::Open("a.jpg".to_string()),
                Call::Destroy("a.jpg".to_string()),
                Call::Open("b.jpg".to_string()),
            ]
        );
        assert_eq!(slot.reference(), Some(&reference("b.jpg")));
    }

    #[test]
    fn test_same_reference_keeps_session() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        let mut slot = SessionSlot::new();
        assert!(slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap());
        assert!(!slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap());
        assert_eq!(engine.calls.borrow().len(), 1);
    }

    #[test]
    fn test_every_session_destroyed_exactly_once() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        {
            let mut slot = SessionSlot::new();
            slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap();
            slot.sync(&engine, Some(&reference("b.jpg")), &config, &noop()).unwrap();
            assert!(slot.close());
            assert!(!slot.close());
            slot.sync(&engine, Some(&reference("c.jpg")), &config, &noop()).unwrap();
            // Dropping the slot stands in for unmounting the viewer.
        }
        let calls = engine.calls.borrow();
        let destroys: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, Call::Destroy(_)))
            .collect();
        assert_eq!(
            destroys,
            vec![
                &Call::Destroy("a.jpg".to_string()),
                &Call::Destroy("b.jpg".to_string()),
                &Call::Destroy("c.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_controls_are_noops_without_session() {
        let engine = MockEngine::default();
        let slot: SessionSlot<MockHandle> = SessionSlot::new();
        slot.zoom_by(1.5);
        slot.go_home();
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_controls_reach_live_session() {
        let engine = MockEngine::default();
        let mut slot = SessionSlot::new();
        slot.sync(&engine, Some(&reference("a.jpg")), &ViewerConfig::default(), &noop())
            .unwrap();
        slot.zoom_by(1.5);
        slot.zoom_by(0.67);
        slot.go_home();
        assert_eq!(
            engine.calls.borrow()[1..],
            [Call::ZoomBy(1.5), Call::ZoomBy(0.67), Call::GoHome]
        );
    }

    #[test]
    fn test_events_from_stale_sessions_are_ignored() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        let mut slot = SessionSlot::new();
        slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap();
        let first = slot.session();
        slot.sync(&engine, Some(&reference("b.jpg")), &config, &noop()).unwrap();

        assert!(!slot.handle_event(event(first, EngineEvent::Ready { width: 1, height: 1 })));
        assert_eq!(slot.phase(), &ViewerPhase::Initializing);

        assert!(slot.handle_event(event(slot.session(), EngineEvent::Ready { width: 4, height: 3 })));
        assert_eq!(slot.phase(), &ViewerPhase::Ready);
    }

    #[test]
    fn test_load_failure_then_retry() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        let mut slot = SessionSlot::new();
        slot.sync(&engine, Some(&reference("broken.jpg")), &config, &noop()).unwrap();
        slot.handle_event(event(slot.session(), EngineEvent::Failed("decode error".to_string())));
        assert_eq!(slot.phase(), &ViewerPhase::Failed("decode error".to_string()));

        slot.retry(&engine, &config, &noop()).unwrap();
        assert_eq!(slot.phase(), &ViewerPhase::Initializing);
        assert_eq!(
            *engine.calls.borrow(),
            vec![
                Call::Open("broken.jpg".to_string()),
                Call::Destroy("broken.jpg".to_string()),
                Call::Open("broken.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_retry_without_reference() {
        let engine = MockEngine::default();
        let mut slot: SessionSlot<MockHandle> = SessionSlot::new();
        assert_eq!(
            slot.retry(&engine, &ViewerConfig::default(), &noop()),
            Err(ViewerError::MissingReference)
        );
    }

    #[test]
    fn test_engine_refusal_is_a_failed_phase() {
        let engine = MockEngine {
            fail_with: Some(ViewerError::NotMounted),
            ..MockEngine::default()
        };
        let mut slot = SessionSlot::new();
        let err = slot
            .sync(&engine, Some(&reference("a.jpg")), &ViewerConfig::default(), &noop())
            .unwrap_err();
        assert_eq!(err, ViewerError::NotMounted);
        assert!(!slot.is_active());
        assert!(matches!(slot.phase(), ViewerPhase::Failed(_)));
    }

    #[test]
    fn test_failure_without_mount_offers_retry() {
        let engine = MockEngine::default();
        let config = ViewerConfig::default();
        let mut slot = SessionSlot::new();
        slot.sync(&engine, Some(&reference("a.jpg")), &config, &noop()).unwrap();

        slot.fail(reference("a.jpg"), &ViewerError::NotMounted);
        assert!(!slot.is_active());
        assert_eq!(
            slot.phase(),
            &ViewerPhase::Failed(ViewerError::NotMounted.to_string())
        );
        assert_eq!(slot.reference(), Some(&reference("a.jpg")));

        slot.retry(&engine, &config, &noop()).unwrap();
        assert_eq!(slot.phase(), &ViewerPhase::Initializing);
        assert_eq!(
            *engine.calls.borrow(),
            vec![
                Call::Open("a.jpg".to_string()),
                Call::Destroy("a.jpg".to_string()),
                Call::Open("a.jpg".to_string()),
            ]
        );
    }

    #[test]
    fn test_zoom_changes_are_tracked() {
        let engine = MockEngine::default();
        let mut slot = SessionSlot::new();
        slot.sync(&engine, Some(&reference("a.jpg")), &ViewerConfig::default(), &noop())
            .unwrap();
        assert!(slot.handle_event(event(slot.session(), EngineEvent::ZoomChanged(0.5))));
        assert!(!slot.handle_event(event(slot.session(), EngineEvent::ZoomChanged(0.5))));
        assert_eq!(slot.zoom(), Some(0.5));
    }
}
