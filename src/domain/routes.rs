use crate::domain::entities::Role;
use std::fmt;

// Navigable screens of the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    // Index route; resolved by the role redirector.
    Root,
    AdminDashboard,
    AdminUsers,
    AdminLeaders,
    AdminChiefs,
    DigitadorRegister,
    DigitadorRecords,
    ViewerDashboard,
}

// How a route is gated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Area {
    Public,
    Redirector,
    Protected { required_role: Option<Role> },
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Root,
        Route::AdminDashboard,
        Route::AdminUsers,
        Route::AdminLeaders,
        Route::AdminChiefs,
        Route::DigitadorRegister,
        Route::DigitadorRecords,
        Route::ViewerDashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Root => "/",
            Route::AdminDashboard => "/admin/dashboard",
            Route::AdminUsers => "/admin/users",
            Route::AdminLeaders => "/admin/leaders",
            Route::AdminChiefs => "/admin/chiefs",
            Route::DigitadorRegister => "/digitador/register",
            Route::DigitadorRecords => "/digitador/records",
            Route::ViewerDashboard => "/viewer/dashboard",
        }
    }

    // Returns None for unmatched paths; callers fall back to Root.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        // Section prefixes redirect to their default child.
        match normalized {
            "/admin" => return Some(Route::AdminDashboard),
            "/digitador" => return Some(Route::DigitadorRegister),
            "/viewer" => return Some(Route::ViewerDashboard),
            _ => {}
        }

        Route::ALL
            .into_iter()
            .find(|route| route.path() == normalized)
    }

    pub fn area(&self) -> Area {
        match self {
            Route::Login => Area::Public,
            Route::Root => Area::Redirector,
            route => Area::Protected {
                required_role: route.required_role(),
            },
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::AdminDashboard | Route::AdminUsers | Route::AdminLeaders | Route::AdminChiefs => {
                Some(Role::Admin)
            }
            Route::DigitadorRegister | Route::DigitadorRecords => Some(Role::Digitador),
            Route::ViewerDashboard => Some(Role::Viewer),
            Route::Login | Route::Root => None,
        }
    }

    pub fn landing_for(role: Role) -> Route {
        match role {
            Role::Admin => Route::AdminDashboard,
            Role::Digitador => Route::DigitadorRegister,
            Role::Viewer => Route::ViewerDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
