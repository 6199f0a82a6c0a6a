//! Supabase SDK Bindings
//!
//! Frontend bindings to the global `supabase` JS client, organized by domain.
//! Every SDK call resolves to `{ data, error }`; [`settle`] turns that into a
//! `Result`.

mod auth;
mod functions;
mod storage;
mod task;

use std::cell::RefCell;

use js_sys::{Promise, Reflect};
use serde::de::DeserializeOwned;
use serde::Serialize;
use task_store::BackendError;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// Re-export all public items
pub use auth::*;
pub use functions::*;
pub use storage::*;
pub use task::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type SupabaseClient;

    #[wasm_bindgen(catch, js_namespace = supabase, js_name = createClient)]
    fn create_client(url: &str, key: &str) -> Result<SupabaseClient, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn auth(this: &SupabaseClient) -> AuthClient;

    #[wasm_bindgen(method, getter)]
    fn functions(this: &SupabaseClient) -> FunctionsClient;

    #[wasm_bindgen(method, getter)]
    fn storage(this: &SupabaseClient) -> StorageClient;

    #[wasm_bindgen(method, js_name = from)]
    fn from_table(this: &SupabaseClient, table: &str) -> Query;

    /// PostgREST builder; thenable at every stage
    pub type Query;

    #[wasm_bindgen(method)]
    fn select(this: &Query, columns: &str) -> Query;

    #[wasm_bindgen(method)]
    fn insert(this: &Query, values: &JsValue) -> Query;

    #[wasm_bindgen(method)]
    fn update(this: &Query, values: &JsValue) -> Query;

    #[wasm_bindgen(method)]
    fn delete(this: &Query) -> Query;

    #[wasm_bindgen(method)]
    fn eq(this: &Query, column: &str, value: &str) -> Query;

    #[wasm_bindgen(method)]
    fn order(this: &Query, column: &str, options: &JsValue) -> Query;

    #[wasm_bindgen(method)]
    fn single(this: &Query) -> Query;

    pub type AuthClient;

    #[wasm_bindgen(method, js_name = getSession)]
    fn get_session(this: &AuthClient) -> Promise;

    #[wasm_bindgen(method, js_name = getUser)]
    fn get_user(this: &AuthClient) -> Promise;

    #[wasm_bindgen(method, js_name = signInWithPassword)]
    fn sign_in_with_password(this: &AuthClient, credentials: &JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = signUp)]
    fn sign_up(this: &AuthClient, credentials: &JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = signOut)]
    fn sign_out(this: &AuthClient) -> Promise;

    #[wasm_bindgen(method, js_name = onAuthStateChange)]
    fn on_auth_state_change(this: &AuthClient, callback: &Closure<dyn FnMut(JsValue, JsValue)>) -> JsValue;

    pub type FunctionsClient;

    #[wasm_bindgen(method)]
    fn invoke(this: &FunctionsClient, name: &str, options: &JsValue) -> Promise;

    pub type StorageClient;

    #[wasm_bindgen(method, js_name = from)]
    fn bucket(this: &StorageClient, id: &str) -> Bucket;

    pub type Bucket;

    #[wasm_bindgen(method)]
    fn upload(this: &Bucket, path: &str, file: &JsValue, options: &JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = getPublicUrl)]
    fn get_public_url(this: &Bucket, path: &str) -> JsValue;
}

thread_local! {
    static CLIENT: RefCell<Option<SupabaseClient>> = const { RefCell::new(None) };
}

/// Create the SDK client used by every command
pub fn connect(url: &str, anon_key: &str) -> Result<(), BackendError> {
    let client = create_client(url, anon_key).map_err(|e| BackendError::Network(error_message(&e)))?;
    CLIENT.with(|c| *c.borrow_mut() = Some(client));
    log::info!("[SDK] connected to {}", url);
    Ok(())
}

fn client() -> Result<SupabaseClient, BackendError> {
    CLIENT
        .with(|c| c.borrow().clone())
        .ok_or_else(|| BackendError::Network("Supabase client is not configured".to_string()))
}

// ========================
// Response Helpers
// ========================

fn field(object: &JsValue, name: &str) -> JsValue {
    Reflect::get(object, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn is_present(value: &JsValue) -> bool {
    !value.is_null() && !value.is_undefined()
}

fn error_message(error: &JsValue) -> String {
    field(error, "message")
        .as_string()
        .or_else(|| error.as_string())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Classify an SDK error object
fn remote_error(error: &JsValue) -> BackendError {
    let message = error_message(error);
    let is_auth = field(error, "name").as_string().is_some_and(|n| n.starts_with("Auth"))
        || matches!(field(error, "status").as_f64(), Some(s) if s == 401.0 || s == 403.0);
    if is_auth {
        BackendError::Auth(message)
    } else {
        BackendError::Remote(message)
    }
}

/// Await a promise or query builder and unwrap its `{ data, error }` envelope
async fn settle(thenable: &JsValue) -> Result<JsValue, BackendError> {
    let response = JsFuture::from(Promise::resolve(thenable))
        .await
        .map_err(|e| BackendError::Network(error_message(&e)))?;
    let error = field(&response, "error");
    if is_present(&error) {
        return Err(remote_error(&error));
    }
    Ok(field(&response, "data"))
}

fn decode<T: DeserializeOwned>(value: JsValue) -> Result<T, BackendError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Plain JS objects (not `Map`s), as the SDK expects
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, BackendError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| BackendError::Invalid(e.to_string()))
}
