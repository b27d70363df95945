//! Role-gated navigation.
//!
//! Every route declares what it needs; [`check_access`] turns that and the
//! current session into an allow/redirect decision, and [`guard`] wraps a view
//! constructor with that decision.

use crate::session::{AppContext, AuthUser, Role};
use std::fmt;

/// Screens of the application
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Upload,
    History,
    Analyze(String),
    Admin,
}

/// What a route requires from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Only meaningful for anonymous users; signed-in users are sent on
    Anonymous,
    /// Any signed-in user
    Authenticated,
    /// A signed-in user holding the given role
    Role(Role),
}

/// Outcome of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(Route),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::History => "/history".to_string(),
            Route::Analyze(file_id) => format!("/analyze/{}", file_id),
            Route::Admin => "/admin".to_string(),
        }
    }

    /// `None` for the root route, which only redirects.
    pub fn requirement(&self) -> Option<Requirement> {
        match self {
            Route::Root => None,
            Route::Login | Route::Register => Some(Requirement::Anonymous),
            Route::Dashboard | Route::Upload | Route::History | Route::Analyze(_) => {
                Some(Requirement::Authenticated)
            }
            Route::Admin => Some(Requirement::Role(Role::Admin)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Whether `role` satisfies a route that requires `required`.
pub fn role_permits(role: Role, required: Role) -> bool {
    match required {
        Role::User => true,
        Role::Admin => role == Role::Admin,
    }
}

/// Decide whether the session may open `route`.
///
/// # Examples
/// ```
/// use chartsheet::access::{Access, Route, check_access};
/// use chartsheet::session::AppContext;
///
/// let ctx = AppContext::anonymous();
/// assert_eq!(check_access(&Route::History, &ctx), Access::Redirect(Route::Login));
/// assert_eq!(check_access(&Route::Login, &ctx), Access::Allow);
/// ```
pub fn check_access(route: &Route, ctx: &AppContext) -> Access {
    let signed_in = ctx.is_authenticated();

    let Some(requirement) = route.requirement() else {
        return Access::Redirect(if signed_in {
            Route::Dashboard
        } else {
            Route::Login
        });
    };

    match (requirement, ctx.role().filter(|_| signed_in)) {
        (Requirement::Anonymous, None) => Access::Allow,
        (Requirement::Anonymous, Some(_)) => Access::Redirect(Route::Dashboard),
        (_, None) => Access::Redirect(Route::Login),
        (Requirement::Authenticated, Some(_)) => Access::Allow,
        (Requirement::Role(required), Some(role)) if role_permits(role, required) => Access::Allow,
        (Requirement::Role(_), Some(_)) => Access::Redirect(Route::Dashboard),
    }
}

/// A view that was either built or refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Rendered(T),
    Redirect(Route),
}

impl<T> Guarded<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Guarded::Rendered(view) => Some(view),
            Guarded::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&Route> {
        match self {
            Guarded::Rendered(_) => None,
            Guarded::Redirect(route) => Some(route),
        }
    }
}

/// Build the view for `route` only if the session may open it.
pub fn guard<T>(route: &Route, ctx: &AppContext, render: impl FnOnce(&AppContext) -> T) -> Guarded<T> {
    match check_access(route, ctx) {
        Access::Allow => Guarded::Rendered(render(ctx)),
        Access::Redirect(to) => Guarded::Redirect(to),
    }
}

/// Like [`guard`] for views that need the signed-in user.
pub fn guard_user<T>(
    route: &Route,
    ctx: &AppContext,
    render: impl FnOnce(&AuthUser) -> T,
) -> Guarded<T> {
    match (check_access(route, ctx), ctx.user()) {
        (Access::Allow, Some(user)) => Guarded::Rendered(render(user)),
        (Access::Allow, None) => Guarded::Redirect(Route::Login),
        (Access::Redirect(to), _) => Guarded::Redirect(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> AppContext {
        AppContext::with_user(AuthUser {
            id: "u1".into(),
            username: "dana".into(),
            email: "dana@example.com".into(),
            role,
            token: "tok".into(),
        })
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        let anon = AppContext::anonymous();
        for route in [
            Route::Dashboard,
            Route::Upload,
            Route::History,
            Route::Analyze("f1".into()),
            Route::Admin,
        ] {
            assert_eq!(check_access(&route, &anon), Access::Redirect(Route::Login));
        }
        assert_eq!(check_access(&Route::Register, &anon), Access::Allow);
        assert_eq!(check_access(&Route::Root, &anon), Access::Redirect(Route::Login));
    }

    #[test]
    fn signed_in_users_skip_public_pages() {
        let user = ctx(Role::User);
        assert_eq!(check_access(&Route::Login, &user), Access::Redirect(Route::Dashboard));
        assert_eq!(check_access(&Route::Root, &user), Access::Redirect(Route::Dashboard));
        assert_eq!(check_access(&Route::History, &user), Access::Allow);
    }

    #[test]
    fn admin_route_needs_admin_role() {
        assert_eq!(
            check_access(&Route::Admin, &ctx(Role::User)),
            Access::Redirect(Route::Dashboard)
        );
        assert_eq!(check_access(&Route::Admin, &ctx(Role::Admin)), Access::Allow);
    }

    #[test]
    fn guard_only_renders_when_allowed() {
        let rendered = guard_user(&Route::Admin, &ctx(Role::Admin), |u| u.username.clone());
        assert_eq!(rendered, Guarded::Rendered("dana".to_string()));

        let refused = guard(&Route::Admin, &ctx(Role::User), |_| "admin table");
        assert_eq!(refused.redirect(), Some(&Route::Dashboard));
        assert_eq!(refused.rendered(), None);
    }

    #[test]
    fn paths() {
        assert_eq!(Route::Analyze("abc".into()).path(), "/analyze/abc");
        assert_eq!(Route::History.to_string(), "/history");
    }
}
