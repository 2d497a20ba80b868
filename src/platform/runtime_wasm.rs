use std::time::Duration as StdDuration;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub type Duration = StdDuration;
pub type Instant = web_time::Instant;

/// Resolve after `duration` using `window.setTimeout`.
pub async fn sleep(duration: Duration) {
    let millis = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        let resolve_fn = resolve.clone();
        let closure = Closure::once(move || {
            let _ = resolve_fn.call0(&JsValue::UNDEFINED);
        });

        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis,
            );
        }

        closure.forget();
    });

    let _ = JsFuture::from(promise).await;
}
