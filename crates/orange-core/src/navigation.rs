//! Route reachability driven by the session state.
//!
//! While unauthenticated only the login route exists. Once authenticated
//! the login route disappears and the drawer routes become reachable.

use tokio::sync::watch;
use tracing::debug;

use crate::auth::SessionState;

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Books,
    Librarians,
    Members,
    StudentRecords,
    RegisterStudent,
}

const UNAUTHENTICATED_ROUTES: &[Route] = &[Route::Login];

/// Drawer order
const AUTHENTICATED_ROUTES: &[Route] = &[
    Route::Home,
    Route::Books,
    Route::Librarians,
    Route::Members,
    Route::StudentRecords,
    Route::RegisterStudent,
];

impl Route {
    /// Get the display title for this route.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Home => "Home",
            Route::Books => "Books",
            Route::Librarians => "Librarians",
            Route::Members => "Members",
            Route::StudentRecords => "Student Records",
            Route::RegisterStudent => "Register Student",
        }
    }

    pub fn is_reachable(&self, state: SessionState) -> bool {
        routes_for(state).contains(self)
    }

    /// Route shown right after entering `state`
    pub fn landing(state: SessionState) -> Self {
        match state {
            SessionState::Unauthenticated => Route::Login,
            SessionState::Authenticated => Route::Home,
        }
    }
}

/// Every route reachable in `state`, in drawer order
pub fn routes_for(state: SessionState) -> &'static [Route] {
    match state {
        SessionState::Unauthenticated => UNAUTHENTICATED_ROUTES,
        SessionState::Authenticated => AUTHENTICATED_ROUTES,
    }
}

/// Tracks the current route and follows session transitions.
pub struct Navigator {
    current: Route,
    state: SessionState,
    session: watch::Receiver<SessionState>,
}

impl Navigator {
    pub fn new(mut session: watch::Receiver<SessionState>) -> Self {
        let state = *session.borrow_and_update();
        Self {
            current: Route::landing(state),
            state,
            session,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn routes(&self) -> &'static [Route] {
        routes_for(self.state)
    }

    /// Pick up a session change without waiting. Returns true if the route changed.
    pub fn sync(&mut self) -> bool {
        match self.session.has_changed() {
            Ok(true) => {
                let state = *self.session.borrow_and_update();
                self.apply(state)
            }
            _ => false,
        }
    }

    /// Wait for the next session change and return the resulting route.
    ///
    /// Returns `None` once the session has been dropped.
    pub async fn changed(&mut self) -> Option<Route> {
        self.session.changed().await.ok()?;
        let state = *self.session.borrow_and_update();
        self.apply(state);
        Some(self.current)
    }

    /// Move to `route` if it is reachable. Returns false otherwise.
    pub fn navigate(&mut self, route: Route) -> bool {
        self.sync();
        if !route.is_reachable(self.state) {
            debug!(?route, state = ?self.state, "Route not reachable");
            return false;
        }
        self.current = route;
        true
    }

    /// Next drawer route (wrapping around)
    pub fn next(&mut self) -> Route {
        self.step(1)
    }

    /// Previous drawer route (wrapping around)
    pub fn prev(&mut self) -> Route {
        self.sync();
        let len = self.routes().len();
        self.step(len - 1)
    }

    fn step(&mut self, offset: usize) -> Route {
        self.sync();
        let routes = self.routes();
        let index = routes.iter().position(|r| *r == self.current).unwrap_or(0);
        self.current = routes[(index + offset) % routes.len()];
        self.current
    }

    fn apply(&mut self, state: SessionState) -> bool {
        self.state = state;
        if self.current.is_reachable(state) {
            return false;
        }
        self.current = Route::landing(state);
        debug!(route = ?self.current, "Session change moved route");
        true
    }
}
