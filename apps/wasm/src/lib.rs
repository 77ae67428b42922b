//! Browser-hosted app served by `wasm-dev`.
//!
//! Built with `wasm-pack build --release --target web apps/wasm`; the output
//! lands in `pkg/` and is loaded by `index.html`. Native builds compile the
//! pure helpers only.

pub const APP_TITLE: &str = "Choreo";

/// Text shown once the module has started.
pub fn greeting(version: &str) -> String {
    format!("{APP_TITLE} wasm {version} is running")
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        let message = super::greeting(env!("CARGO_PKG_VERSION"));
        web_sys::console::log_1(&JsValue::from_str(&message));

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        if let Some(status) = document.get_element_by_id("status") {
            status.set_text_content(Some(&message));
        }
        Ok(())
    }
}
