use crate::access::{Guarded, Route, guard_user};
use crate::backend::{Backend, UserRecord};
use crate::session::{AppContext, Role};
use log::{error, info, warn};

/// A user-management action awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Delete { user_id: String, username: String },
    SetRole { user_id: String, username: String, role: Role },
}

impl AdminAction {
    pub fn user_id(&self) -> &str {
        match self {
            AdminAction::Delete { user_id, .. } | AdminAction::SetRole { user_id, .. } => user_id,
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            AdminAction::Delete { username, .. } => {
                format!("Are you sure you want to delete user \"{}\"?", username)
            }
            AdminAction::SetRole { username, role, .. } => {
                format!("Are you sure you want to change {}'s role to {}?", username, role)
            }
        }
    }
}

/// Label of the role toggle button for a user currently holding `role`
pub fn role_action_label(role: Role) -> &'static str {
    match role {
        Role::User => "Promote to Admin",
        Role::Admin => "Demote to User",
    }
}

/// The admin user table
#[derive(Debug, Default)]
pub struct AdminView {
    users: Vec<UserRecord>,
    current_user_id: String,
    pending: Option<AdminAction>,
    pub error: Option<String>,
    pub message: Option<String>,
    pub loading: bool,
}

impl AdminView {
    /// Open the admin screen, or the route to go to instead.
    pub fn open(ctx: &AppContext) -> Result<Self, Route> {
        let view = guard_user(&Route::Admin, ctx, |user| Self {
            current_user_id: user.id.clone(),
            ..Self::default()
        });
        match view {
            Guarded::Rendered(view) => Ok(view),
            Guarded::Redirect(route) => {
                warn!("admin screen refused, redirecting to {}", route);
                Err(route)
            }
        }
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    fn find(&self, user_id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Admins cannot delete or demote themselves.
    pub fn can_manage(&self, user_id: &str) -> bool {
        user_id != self.current_user_id
    }

    pub async fn refresh<B: Backend>(&mut self, ctx: &AppContext, backend: &B) {
        let Some(token) = ctx.token() else {
            self.error = Some("User not authenticated. Please log in.".to_string());
            return;
        };

        self.loading = true;
        let result = backend.list_users(token).await;
        self.loading = false;

        match result {
            Ok(users) => {
                self.users = users;
                self.error = None;
            }
            Err(e) => {
                error!("fetching users failed: {}", e);
                self.error = Some("Failed to fetch users. Please try again.".to_string());
            }
        }
    }

    pub fn request_delete(&mut self, user_id: &str) -> Option<&AdminAction> {
        if !self.can_manage(user_id) {
            return None;
        }
        let user = self.find(user_id)?;
        let action = AdminAction::Delete {
            user_id: user.id.clone(),
            username: user.username.clone(),
        };
        Some(self.pending.insert(action))
    }

    pub fn request_role_toggle(&mut self, user_id: &str) -> Option<&AdminAction> {
        if !self.can_manage(user_id) {
            return None;
        }
        let user = self.find(user_id)?;
        let action = AdminAction::SetRole {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role.toggled(),
        };
        Some(self.pending.insert(action))
    }

    pub fn pending(&self) -> Option<&AdminAction> {
        self.pending.as_ref()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Run the pending action, then reload the user list.
    pub async fn confirm<B: Backend>(&mut self, ctx: &AppContext, backend: &B) -> bool {
        let Some(action) = self.pending.take() else {
            return false;
        };
        let Some(token) = ctx.token() else {
            self.error = Some("User not authenticated. Please log in.".to_string());
            return false;
        };

        self.message = None;
        let outcome = match &action {
            AdminAction::Delete { user_id, username } => backend
                .delete_user(token, user_id)
                .await
                .map(|()| format!("User {} deleted successfully.", username))
                .map_err(|e| format!("Failed to delete user: {}", e.detail())),
            AdminAction::SetRole {
                user_id,
                username,
                role,
            } => backend
                .update_role(token, user_id, *role)
                .await
                .map(|()| format!("User {}'s role changed to {} successfully.", username, role))
                .map_err(|e| format!("Failed to change role: {}", e.detail())),
        };

        match outcome {
            Ok(message) => {
                info!("{}", message);
                self.refresh(ctx, backend).await;
                self.message = Some(message);
                true
            }
            Err(message) => {
                error!("admin action on {} failed: {}", action.user_id(), message);
                self.error = Some(message);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthUser;

    fn signed_in(role: Role) -> AppContext {
        AppContext::with_user(AuthUser {
            id: "a1".into(),
            username: "root".into(),
            email: "root@example.com".into(),
            role,
            token: "tok".into(),
        })
    }

    fn admin() -> AppContext {
        signed_in(Role::Admin)
    }

    fn view() -> AdminView {
        let mut view = AdminView::open(&admin()).unwrap();
        view.users = vec![
            UserRecord {
                id: "a1".into(),
                username: "root".into(),
                email: String::new(),
                role: Role::Admin,
            },
            UserRecord {
                id: "u2".into(),
                username: "bob".into(),
                email: String::new(),
                role: Role::User,
            },
        ];
        view
    }

    #[test]
    fn non_admins_are_redirected() {
        assert_eq!(
            AdminView::open(&signed_in(Role::User)).err(),
            Some(Route::Dashboard)
        );
        assert_eq!(
            AdminView::open(&AppContext::anonymous()).err(),
            Some(Route::Login)
        );
    }

    #[test]
    fn cannot_act_on_self() {
        let mut view = view();
        assert!(!view.can_manage("a1"));
        assert!(view.request_delete("a1").is_none());
        assert!(view.request_role_toggle("a1").is_none());
        assert!(view.pending().is_none());
    }

    #[test]
    fn role_toggle_targets_opposite_role() {
        let mut view = view();
        let action = view.request_role_toggle("u2").cloned().unwrap();
        assert_eq!(
            action,
            AdminAction::SetRole {
                user_id: "u2".into(),
                username: "bob".into(),
                role: Role::Admin
            }
        );
        assert_eq!(role_action_label(Role::User), "Promote to Admin");
        assert_eq!(role_action_label(Role::Admin), "Demote to User");
        view.cancel();
        assert!(view.pending().is_none());
    }
}
