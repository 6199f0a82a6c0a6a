//! Auth Commands
//!
//! Session lookup, password sign-in/sign-up, sign-out and change notifications.

use serde::{Deserialize, Serialize};
use task_store::BackendError;
use wasm_bindgen::prelude::*;

use super::{client, decode, encode, field, is_present, settle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Deserialize)]
struct SessionData {
    session: Option<Session>,
}

#[derive(Deserialize)]
struct UserData {
    user: Option<User>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

pub async fn get_session() -> Result<Option<Session>, BackendError> {
    let data = settle(&client()?.auth().get_session()).await?;
    Ok(decode::<SessionData>(data)?.session)
}

pub async fn get_user() -> Result<Option<User>, BackendError> {
    let data = settle(&client()?.auth().get_user()).await?;
    Ok(decode::<UserData>(data)?.user)
}

/// Id of the signed-in user, or an auth error
pub async fn current_user_id() -> Result<String, BackendError> {
    get_user()
        .await?
        .map(|user| user.id)
        .ok_or_else(|| BackendError::Auth("Not signed in".to_string()))
}

pub async fn sign_in(email: &str, password: &str) -> Result<(), BackendError> {
    let credentials = encode(&Credentials { email, password })?;
    settle(&client()?.auth().sign_in_with_password(&credentials)).await?;
    Ok(())
}

pub async fn sign_up(email: &str, password: &str) -> Result<(), BackendError> {
    let credentials = encode(&Credentials { email, password })?;
    settle(&client()?.auth().sign_up(&credentials)).await?;
    Ok(())
}

pub async fn sign_out() -> Result<(), BackendError> {
    settle(&client()?.auth().sign_out()).await?;
    Ok(())
}

/// Call `callback` with the new session on every auth change, for the life of the page
pub fn on_auth_state_change(callback: impl Fn(Option<Session>) + 'static) -> Result<(), BackendError> {
    let closure = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |event: JsValue, session: JsValue| {
        let session = if is_present(&session) {
            match decode::<Session>(session) {
                Ok(session) => Some(session),
                Err(e) => {
                    log::warn!("[AUTH] unreadable session on {:?}: {}", event.as_string(), e);
                    None
                }
            }
        } else {
            None
        };
        log::debug!("[AUTH] state change: {:?}", event.as_string());
        callback(session);
    });
    let result = client()?.auth().on_auth_state_change(&closure);
    if !is_present(&field(&field(&result, "data"), "subscription")) {
        return Err(BackendError::Decode("onAuthStateChange returned no subscription".to_string()));
    }
    closure.forget();
    Ok(())
}
