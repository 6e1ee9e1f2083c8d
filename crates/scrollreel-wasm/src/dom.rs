//! Page sampling, window listeners and theme application.

use scrollreel_core::SiteConfig;
use scrollreel_player::{ScrollGeometry, ViewportSize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

/// Current viewport size in CSS pixels.
pub fn viewport_size(window: &Window) -> ViewportSize {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    ViewportSize::from_f64(dim(window.inner_width()), dim(window.inner_height()))
}

/// Sample the hero container and page scroll at event time.
pub fn scroll_geometry(window: &Window, container: &HtmlElement) -> ScrollGeometry {
    let viewport_height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    ScrollGeometry {
        container_top: container.offset_top() as f64,
        container_height: container.scroll_height() as f64,
        viewport_height,
        scroll_y: window.scroll_y().unwrap_or(0.0),
    }
}

/// `scroll` and `resize` handlers on the window, removed on drop.
pub struct Listeners {
    window: Window,
    scroll: Closure<dyn FnMut()>,
    resize: Closure<dyn FnMut()>,
}

impl Listeners {
    pub fn attach(
        window: &Window,
        on_scroll: impl FnMut() + 'static,
        on_resize: impl FnMut() + 'static,
    ) -> Result<Self, JsValue> {
        let scroll = Closure::<dyn FnMut()>::new(on_scroll);
        let resize = Closure::<dyn FnMut()>::new(on_resize);
        window.add_event_listener_with_callback("scroll", scroll.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        Ok(Self {
            window: window.clone(),
            scroll,
            resize,
        })
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("scroll", self.scroll.as_ref().unchecked_ref());
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref());
    }
}

/// Toggle the `dark` class on the root element and publish the accent color
/// as `--accent-color`.
pub fn apply_theme(window: &Window, site: &SiteConfig) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let root = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("no document element"))?;
    root.class_list().toggle_with_force("dark", site.is_dark_mode)?;

    let root: HtmlElement = root.dyn_into().map_err(JsValue::from)?;
    root.style().set_property("--accent-color", &site.accent_color)?;
    Ok(())
}
