//! Last-resort crash notice
//!
//! A panic anywhere in the frame loop leaves the canvas frozen. The hook
//! replaces it with a plain-text notice so the user sees what happened.

use std::panic::PanicHookInfo;
use std::sync::OnceLock;

static HOOK_SET: OnceLock<()> = OnceLock::new();

/// Text of the crash notice.
pub fn notice_text(message: &str) -> String {
    format!("Frontend crashed:\n{message}")
}

/// Panic payload as a string, without the location.
pub fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        info.to_string()
    }
}

/// Install the hook. Idempotent.
pub fn install() {
    HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            #[cfg(target_arch = "wasm32")]
            {
                console_error_panic_hook::hook(info);
            }
            let message = panic_message(info);
            tracing::error!("panic: {}", message);
            show_notice(&message);
        }));
    });
}

/// Render the notice into the page, replacing the canvas.
#[cfg(target_arch = "wasm32")]
pub fn show_notice(message: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let Ok(pre) = document.create_element("pre") else {
        return;
    };
    let _ = pre.set_attribute("style", "padding: 16px; white-space: pre-wrap;");
    pre.set_text_content(Some(&notice_text(message)));
    body.set_inner_html("");
    if let Err(e) = body.append_child(&pre) {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn show_notice(message: &str) {
    eprintln!("{}", notice_text(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_has_header_line() {
        assert_eq!(notice_text("boom"), "Frontend crashed:\nboom");
    }
}
