use crate::auth::{AuthState, Role};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Guard resolution never needs more than two redirects; anything longer is
/// a loop
const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Route {
    Login,
    MenteeHome,
    MentorDashboard,
}

impl Route {
    pub(crate) fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::MenteeHome => "/mentee",
            Route::MentorDashboard => "/mentor",
        }
    }

    /// Applies the guard that protects this route
    pub(crate) fn guard(self, auth: &AuthState) -> Access {
        match self {
            Route::Login => public(auth),
            Route::MenteeHome => protected(auth, &[Role::Mentee]),
            Route::MentorDashboard => protected(auth, &[Role::Mentor]),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for Route {
    type Err = ParseRouteError;

    fn from_str(s: &str) -> Result<Route, ParseRouteError> {
        match s {
            "login" | "/login" => Ok(Route::Login),
            "mentee" | "/mentee" => Ok(Route::MenteeHome),
            "mentor" | "/mentor" => Ok(Route::MentorDashboard),
            _ => Err(ParseRouteError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown view {0:?}; expected \"mentee\" or \"mentor\"")]
pub(crate) struct ParseRouteError(String);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Access {
    Allow,
    Redirect(Route),
}

/// Home route for a signed-in user
pub(crate) fn redirect_for_role(role: Option<Role>) -> Route {
    match role {
        Some(Role::Mentor) => Route::MentorDashboard,
        Some(Role::Mentee) | None => Route::MenteeHome,
    }
}

/// Guard for routes that require a signed-in user with one of `allowed`
/// roles.  A signed-in user without a role is let through.
pub(crate) fn protected(auth: &AuthState, allowed: &[Role]) -> Access {
    if !auth.is_authenticated() {
        return Access::Redirect(Route::Login);
    }
    match auth.role() {
        Some(role) if !allowed.contains(&role) => Access::Redirect(redirect_for_role(Some(role))),
        _ => Access::Allow,
    }
}

/// Guard for routes only meant for signed-out users
pub(crate) fn public(auth: &AuthState) -> Access {
    if auth.is_authenticated() {
        Access::Redirect(redirect_for_role(auth.role()))
    } else {
        Access::Allow
    }
}

/// Follows guard redirects from `requested` to the route that is actually
/// shown
pub(crate) fn resolve(requested: Route, auth: &AuthState) -> Result<Route, RedirectLoopError> {
    let mut route = requested;
    for _ in 0..MAX_REDIRECTS {
        match route.guard(auth) {
            Access::Allow => {
                if route != requested {
                    tracing::info!(from = %requested, to = %route, "redirected");
                }
                return Ok(route);
            }
            Access::Redirect(next) => route = next,
        }
    }
    Err(RedirectLoopError(requested))
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("too many redirects resolving {0}")]
pub(crate) struct RedirectLoopError(Route);
