//! Storage Commands
//!
//! Profile picture upload and lookup in the avatar bucket.

use serde::Serialize;
use task_store::{avatar_path, BackendError, AVATAR_BUCKET};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::{client, encode, field, settle};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadOptions<'a> {
    upsert: bool,
    content_type: &'a str,
}

/// Upload (overwriting) the user's avatar
pub async fn upload_avatar(user_id: &str, file: &web_sys::File) -> Result<(), BackendError> {
    let content_type = file.type_();
    let options = encode(&UploadOptions { upsert: true, content_type: &content_type })?;
    let bucket = client()?.storage().bucket(AVATAR_BUCKET);
    settle(&bucket.upload(&avatar_path(user_id), file.as_ref(), &options)).await?;
    Ok(())
}

/// Public URL of the user's avatar; the object may not exist
pub fn avatar_public_url(user_id: &str) -> Result<String, BackendError> {
    let result = client()?.storage().bucket(AVATAR_BUCKET).get_public_url(&avatar_path(user_id));
    field(&field(&result, "data"), "publicUrl")
        .as_string()
        .ok_or_else(|| BackendError::Decode("getPublicUrl returned no URL".to_string()))
}

/// Check a URL with `HEAD`; any failure counts as absent
pub async fn url_exists(url: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let init = web_sys::RequestInit::new();
    init.set_method("HEAD");
    match JsFuture::from(window.fetch_with_str_and_init(url, &init)).await {
        Ok(value) => value.dyn_into::<web_sys::Response>().map(|r| r.ok()).unwrap_or(false),
        Err(_) => false,
    }
}
