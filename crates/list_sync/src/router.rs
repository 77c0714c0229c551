//! Route collaborator: the current location plus same-entry navigation.

use shared::domain::RouteLocation;
use tokio::sync::watch;

pub trait Router: Send + Sync {
    fn current(&self) -> RouteLocation;
    /// Navigates without adding a history entry.
    fn replace(&self, location: RouteLocation);
}

/// In-process router backed by a watch channel. Every location change,
/// including the ones caused by [`Router::replace`], is visible to
/// [`MemoryRouter::subscribe`] receivers.
pub struct MemoryRouter {
    location: watch::Sender<RouteLocation>,
}

impl MemoryRouter {
    pub fn new(initial: RouteLocation) -> Self {
        let (location, _) = watch::channel(initial);
        Self { location }
    }

    pub fn subscribe(&self) -> watch::Receiver<RouteLocation> {
        self.location.subscribe()
    }

    /// External navigation, e.g. the user editing the address or going back.
    pub fn push(&self, location: RouteLocation) {
        self.location.send_replace(location);
    }
}

impl Router for MemoryRouter {
    fn current(&self) -> RouteLocation {
        self.location.borrow().clone()
    }

    fn replace(&self, location: RouteLocation) {
        self.location.send_replace(location);
    }
}
