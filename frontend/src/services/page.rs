//! Values the server embeds in the host page.

use crate::config::CSRF_META_NAME;

/// CSRF token from `<meta name="csrf-token" content="...">`.
pub fn csrf_token() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let selector = format!("meta[name=\"{}\"]", CSRF_META_NAME);
    let meta = document.query_selector(&selector).ok()??;
    meta.get_attribute("content")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty() && !token.starts_with("{{"))
}
