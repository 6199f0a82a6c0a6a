//! Profile picture rules
//!
//! Object path, client-side upload checks and cache busting for the avatar image.

use crate::error::UploadError;

/// Storage bucket holding one avatar per user
pub const AVATAR_BUCKET: &str = "profile-pictures";

/// Upload size limit (5 MiB)
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Object path of a user's avatar inside [`AVATAR_BUCKET`]
pub fn avatar_path(user_id: &str) -> String {
    format!("{}/avatar", user_id)
}

/// Check a selected file before uploading it
pub fn validate_avatar(mime_type: &str, size: u64) -> Result<(), UploadError> {
    if !mime_type.starts_with("image/") {
        return Err(UploadError::NotAnImage);
    }
    if size > MAX_AVATAR_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// Append a timestamp so the browser refetches an overwritten object
pub fn cache_busted(public_url: &str, millis: i64) -> String {
    let sep = if public_url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", public_url, sep, millis)
}
