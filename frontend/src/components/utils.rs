use gloo_storage::{LocalStorage, Storage};
use gloo_timers::callback::Timeout;
use shared::Session;
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

const TOKEN_KEY: &str = "auth_token";

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || {
            inner_callback();
        }));
    })
}

/// Picks up a token handed over by the identity provider in `?token=`,
/// stores it, and strips it from the address bar. Falls back to the stored
/// token.
pub fn restore_session() -> Option<Session> {
    if let Some(token) = take_query_token() {
        if let Err(e) = LocalStorage::set(TOKEN_KEY, &token) {
            log::warn!("Could not persist auth token: {}", e);
        }
        return Session::new(token);
    }
    LocalStorage::get::<String>(TOKEN_KEY).ok().and_then(Session::new)
}

pub fn forget_session() {
    LocalStorage::delete(TOKEN_KEY);
}

fn take_query_token() -> Option<String> {
    let window = web_sys::window()?;
    let location = window.location();
    let search = location.search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    let token = params.get("token")?;

    params.delete("token");
    let query = String::from(params.to_string());
    let pathname = location.pathname().unwrap_or_else(|_| "/".to_string());
    let clean = if query.is_empty() {
        pathname
    } else {
        format!("{}?{}", pathname, query)
    };
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&clean));
    }
    Some(token)
}
