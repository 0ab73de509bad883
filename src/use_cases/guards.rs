use std::sync::Arc;

use crate::domain::entities::{Role, Session};
use crate::domain::ports::Navigator;
use crate::domain::routes::{Area, Route};
use crate::use_cases::session::SessionStore;

// Redirect chains are at most root -> landing page; the cap only guards against cycles.
const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    // Deny the requested navigation and go here instead.
    Redirect(Route),
}

// Gate for authenticated screens; a role mismatch bounces to the root.
pub fn protected_area(required_role: Option<Role>, session: Option<&Session>) -> GuardDecision {
    let Some(session) = session else {
        return GuardDecision::Redirect(Route::Login);
    };
    match required_role {
        Some(role) if role != session.role => GuardDecision::Redirect(Route::Root),
        _ => GuardDecision::Allow,
    }
}

// Gate for screens only meaningful without a session, such as the login form.
pub fn public_area(session: Option<&Session>) -> GuardDecision {
    match session {
        Some(session) => GuardDecision::Redirect(Route::landing_for(session.role)),
        None => GuardDecision::Allow,
    }
}

// Target of the index and wildcard routes.
pub fn role_redirect(session: Option<&Session>) -> Route {
    session
        .map(|session| Route::landing_for(session.role))
        .unwrap_or(Route::Login)
}

pub fn evaluate(route: Route, session: Option<&Session>) -> GuardDecision {
    match route.area() {
        Area::Public => public_area(session),
        Area::Redirector => GuardDecision::Redirect(role_redirect(session)),
        Area::Protected { required_role } => protected_area(required_role, session),
    }
}

// Follows guard redirects from the requested path to the route that commits.
pub fn resolve(path: &str, session: Option<&Session>) -> Route {
    let mut route = Route::parse(path).unwrap_or(Route::Root);
    for _ in 0..MAX_REDIRECTS {
        match evaluate(route, session) {
            GuardDecision::Allow => return route,
            GuardDecision::Redirect(next) => {
                tracing::debug!(from = %route, to = %next, "navigation redirected.");
                route = next;
            }
        }
    }
    tracing::warn!(path, "redirect limit reached.");
    Route::Login
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub route: Route,
}

// Entries of the main layout menu for a role.
pub fn menu_for(role: Role) -> Vec<MenuEntry> {
    let entries: &[(&'static str, Route)] = match role {
        Role::Admin => &[
            ("Dashboard", Route::AdminDashboard),
            ("Lideres", Route::AdminLeaders),
            ("Jefes", Route::AdminChiefs),
            ("Digitadores", Route::AdminUsers),
        ],
        Role::Digitador => &[
            ("Registrar votante", Route::DigitadorRegister),
            ("Mis registros", Route::DigitadorRecords),
        ],
        Role::Viewer => &[("Dashboard", Route::ViewerDashboard)],
    };
    entries
        .iter()
        .map(|&(label, route)| MenuEntry { label, route })
        .collect()
}

// Guarded navigation against the live session store.
pub struct Router {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn navigate(&self, path: &str) -> Route {
        self.store.enforce_expiry();
        let session = self.store.current_session();
        let route = resolve(path, session.as_ref());
        self.navigator.navigate(route);
        route
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        self.store.role().map(menu_for).unwrap_or_default()
    }
}
