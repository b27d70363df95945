use crate::access::Route;
use crate::backend::{Backend, LoginRequest, RegisterRequest};
use crate::error::AuthError;
use crate::session::{AppContext, SessionStore};
use log::info;

/// Log in with email and password.
///
/// On success the credential is persisted, installed in `ctx`, and the
/// dashboard is returned as the next route.
///
/// # Errors
/// * `AuthError::Invalid` if either field is empty (no request is sent)
/// * `AuthError::Api` if the backend rejects the credentials
/// * `AuthError::Session` if the credential cannot be persisted
pub async fn login<B: Backend, S: SessionStore>(
    ctx: &mut AppContext,
    backend: &B,
    store: &S,
    email: &str,
    password: &str,
) -> Result<Route, AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::Invalid(
            "Email and password cannot be empty".to_string(),
        ));
    }

    let user = backend
        .login(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await?;
    info!("logged in as {}", user.username);
    ctx.sign_in(store, user)?;
    Ok(Route::Dashboard)
}

/// Create an account and sign in with it.
pub async fn register<B: Backend, S: SessionStore>(
    ctx: &mut AppContext,
    backend: &B,
    store: &S,
    request: &RegisterRequest,
) -> Result<Route, AuthError> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AuthError::Invalid(
            "Username, email and password cannot be empty".to_string(),
        ));
    }

    let user = backend.register(request).await?;
    info!("registered {}", user.username);
    ctx.sign_in(store, user)?;
    Ok(Route::Dashboard)
}

/// Forget the session and go back to the login screen.
pub fn logout<S: SessionStore>(ctx: &mut AppContext, store: &S) -> Result<Route, AuthError> {
    ctx.logout(store)?;
    Ok(Route::Login)
}
