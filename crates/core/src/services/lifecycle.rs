//! Ownership of text-view sessions.
//!
//! A session is freed exactly once, by whichever comes first:
//! - the host's widget-destroyed notification for its view
//! - dropping the [`ViewHandle`] returned when the view was opened
//!
//! Once freed, further events for the view find no session and are ignored.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::{info, warn};

use super::text_view::TextViewSession;
use crate::host::ViewId;

/// Open text-view sessions keyed by view.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<ViewId, TextViewSession>,
}

pub type SharedRegistry = Rc<RefCell<SessionRegistry>>;

impl SessionRegistry {
    pub fn new_shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn register(&mut self, session: TextViewSession) -> ViewId {
        let view = session.view();
        if self.sessions.insert(view, session).is_some() {
            warn!("{view} was already registered; replaced its session");
        }
        view
    }

    pub fn get(&self, view: ViewId) -> Option<&TextViewSession> {
        self.sessions.get(&view)
    }

    pub fn get_mut(&mut self, view: ViewId) -> Option<&mut TextViewSession> {
        self.sessions.get_mut(&view)
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.sessions.contains_key(&view)
    }

    /// Free the session of `view`. Returns `false` if it was already gone.
    pub fn close(&mut self, view: ViewId) -> bool {
        match self.sessions.remove(&view) {
            Some(session) => {
                info!("closed {} ({view})", session.title());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Scoped ownership of an open text view's session.
///
/// Dropping the handle frees the session. Call [`ViewHandle::release`] to hand
/// ownership to the host instead, so that only the widget-destroyed event
/// frees it.
#[must_use = "dropping the handle closes the view's session"]
pub struct ViewHandle {
    view: ViewId,
    registry: Weak<RefCell<SessionRegistry>>,
}

impl ViewHandle {
    pub(crate) fn new(view: ViewId, registry: &SharedRegistry) -> Self {
        Self { view, registry: Rc::downgrade(registry) }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    /// Give up ownership; the session now lives until the host destroys the view.
    pub fn release(mut self) -> ViewId {
        self.registry = Weak::new();
        self.view
    }
}

impl Drop for ViewHandle {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        match registry.try_borrow_mut() {
            Ok(mut registry) => {
                registry.close(self.view);
            }
            Err(_) => warn!("{}: registry busy; session left to the destroy event", self.view),
        };
    }
}
