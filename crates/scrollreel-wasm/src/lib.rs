//! # scrollreel-wasm
//!
//! WebAssembly binding for the scrollreel hero player.
//! Mounts a scroll-synchronized image sequence on a page canvas and exposes
//! the configuration panel helpers to JavaScript.

mod canvas;
mod dom;
mod host;

use std::cell::RefCell;

use canvas::{CanvasImage, CanvasSurface};
use dom::Listeners;
use host::WebHost;
use scrollreel_core::{
    presets, ReelResult, SequenceConfig, SequenceTuning, SiteConfig, SiteUpdate,
};
use scrollreel_player::{Generation, LoadEvent, LoadTicket, ReadyCause, ScrollPlayer};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement, Window};

/// One mounted hero.
struct Mounted {
    player: ScrollPlayer<CanvasSurface>,
    host: WebHost,
    window: Window,
    container: HtmlElement,
    listeners: Option<Listeners>,
    on_ready: Option<js_sys::Function>,
    tuning: SequenceTuning,
}

impl Mounted {
    fn redraw(&mut self) {
        let geometry = dom::scroll_geometry(&self.window, &self.container);
        self.player.on_scroll(geometry);
    }

    fn resize(&mut self) {
        let viewport = dom::viewport_size(&self.window);
        let geometry = dom::scroll_geometry(&self.window, &self.container);
        self.player.on_resize(viewport, geometry);
    }

    fn load_site(&mut self, site: &SiteConfig) -> Result<bool, JsValue> {
        let sequence = SequenceConfig::new(&site.sequence_url, &self.tuning).map_err(js_err)?;
        self.player.load(sequence, &mut self.host).map_err(js_err)
    }

    fn handle(&mut self, event: LoadEvent) {
        if let LoadEvent::BecameReady(cause) = event {
            if cause == ReadyCause::SafetyTimeout {
                web_sys::console::warn_1(&JsValue::from_str(
                    "Image sequence loading timed out or incomplete. Showing content.",
                ));
            }
            self.redraw();
            self.notify_ready();
        }
    }

    /// Runs the page callback after the current task, outside any borrow of
    /// the mounted state.
    fn notify_ready(&self) {
        if let Some(callback) = &self.on_ready {
            self.window.queue_microtask(callback);
        }
    }
}

thread_local! {
    /// The hero mounted on this page, if any.
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

fn with_mounted<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Mounted) -> R,
{
    MOUNTED.with(|m| match m.try_borrow_mut() {
        Ok(mut slot) => slot.as_mut().map(f),
        Err(_) => {
            web_sys::console::warn_1(&JsValue::from_str("scrollreel: re-entrant call ignored"));
            None
        }
    })
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_site(config_json: &str) -> Result<SiteConfig, JsValue> {
    if config_json.trim().is_empty() {
        return Ok(SiteConfig::default());
    }
    SiteConfig::from_json(config_json).map_err(js_err)
}

pub(crate) fn deliver_frame(ticket: LoadTicket, outcome: ReelResult<CanvasImage>) {
    with_mounted(|m| {
        let event = m.player.on_frame_complete(ticket, outcome, &mut m.host);
        m.handle(event);
    });
}

pub(crate) fn deliver_timeout(generation: Generation) {
    with_mounted(|m| {
        let event = m.player.on_safety_timeout(generation);
        m.handle(event);
    });
}

/// Mount the hero with the default loader tuning.
///
/// `config_json` is a camelCase `SiteConfig`; an empty string uses the defaults.
#[wasm_bindgen]
pub fn mount(
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    config_json: &str,
) -> Result<(), JsValue> {
    mount_with_tuning(container, canvas, config_json, "")
}

/// Mount the hero, overriding frame count, threshold or safety timeout.
///
/// `tuning_json` looks like `{"frame_count":192,"load_threshold":0.1,"safety_timeout_ms":2000}`;
/// missing fields keep their defaults.
#[wasm_bindgen]
pub fn mount_with_tuning(
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    config_json: &str,
    tuning_json: &str,
) -> Result<(), JsValue> {
    let site = parse_site(config_json)?;
    let tuning: SequenceTuning = if tuning_json.trim().is_empty() {
        SequenceTuning::default()
    } else {
        serde_json::from_str(tuning_json)
            .map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))?
    };
    // Validate before touching the page.
    let sequence = SequenceConfig::new(&site.sequence_url, &tuning).map_err(js_err)?;

    unmount();

    let window = dom::window()?;
    let surface = CanvasSurface::new(canvas)?;
    let player = ScrollPlayer::mount(surface, dom::viewport_size(&window));
    let listeners = Listeners::attach(
        &window,
        || {
            with_mounted(|m| m.redraw());
        },
        || {
            with_mounted(|m| m.resize());
        },
    )?;

    let mut mounted = Mounted {
        player,
        host: WebHost::new(window.clone()),
        window,
        container,
        listeners: Some(listeners),
        on_ready: None,
        tuning,
    };
    mounted
        .player
        .load(sequence, &mut mounted.host)
        .map_err(js_err)?;

    MOUNTED.with(|m| *m.borrow_mut() = Some(mounted));
    Ok(())
}

/// Switch the mounted hero to a new site configuration.
///
/// Returns true if a different sequence started loading.
#[wasm_bindgen]
pub fn set_config(config_json: &str) -> Result<bool, JsValue> {
    let site = parse_site(config_json)?;
    with_mounted(|m| m.load_site(&site))
        .ok_or_else(|| JsValue::from_str("scrollreel is not mounted"))?
}

/// Register a callback that fires once the current sequence is ready.
/// Fires on the next microtask if it already is.
#[wasm_bindgen]
pub fn on_ready(callback: js_sys::Function) -> Result<(), JsValue> {
    with_mounted(|m| {
        m.on_ready = Some(callback);
        if m.player.is_ready() {
            m.notify_ready();
        }
    })
    .ok_or_else(|| JsValue::from_str("scrollreel is not mounted"))
}

#[wasm_bindgen]
pub fn is_ready() -> bool {
    with_mounted(|m| m.player.is_ready()).unwrap_or(false)
}

/// Index of the frame chosen by the last scroll event.
#[wasm_bindgen]
pub fn current_frame() -> usize {
    with_mounted(|m| m.player.state().current_frame_index).unwrap_or(0)
}

/// `{ scrollProgress, currentFrameIndex, isReady }` as JSON.
#[wasm_bindgen]
pub fn playback_state() -> Result<String, JsValue> {
    let state = with_mounted(|m| m.player.state()).unwrap_or_default();
    serde_json::to_string(&state).map_err(js_err)
}

/// Remove listeners, stop the timer and drop every pending fetch.
#[wasm_bindgen]
pub fn unmount() {
    let Some(mut mounted) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        return;
    };
    mounted.listeners.take();
    mounted.player.teardown(&mut mounted.host);
    mounted.host.release();
}

/// The shipped site configuration as JSON.
#[wasm_bindgen]
pub fn default_config() -> Result<String, JsValue> {
    SiteConfig::default().to_json().map_err(js_err)
}

/// `[{ name, url }]` as JSON.
#[wasm_bindgen]
pub fn sequence_presets() -> Result<String, JsValue> {
    serde_json::to_string(presets::SEQUENCE_PRESETS).map_err(js_err)
}

/// `[{ name, value }]` as JSON.
#[wasm_bindgen]
pub fn theme_colors() -> Result<String, JsValue> {
    serde_json::to_string(presets::THEME_COLORS).map_err(js_err)
}

/// Apply one panel edit to `config_json` and return the new config.
#[wasm_bindgen]
pub fn update_config(config_json: &str, key: &str, value: &str) -> Result<String, JsValue> {
    let site = parse_site(config_json)?;
    let update = SiteUpdate::parse(key, value).map_err(js_err)?;
    site.updated(update)
        .and_then(|s| s.to_json())
        .map_err(js_err)
}

/// Set dark mode and the accent color on the document.
#[wasm_bindgen]
pub fn apply_site_theme(config_json: &str) -> Result<(), JsValue> {
    let site = parse_site(config_json)?;
    dom::apply_theme(&dom::window()?, &site)
}

#[wasm_bindgen]
pub fn frame_url(base_url: &str, index: usize) -> Result<String, JsValue> {
    let sequence = SequenceConfig::new(base_url, &SequenceTuning::default()).map_err(js_err)?;
    Ok(sequence.frame_url(index))
}

#[wasm_bindgen]
pub fn compute_frame_index(
    container_top: f64,
    container_height: f64,
    viewport_height: f64,
    scroll_y: f64,
    frame_count: usize,
) -> usize {
    scrollreel_player::compute_frame_index(
        container_top,
        container_height,
        viewport_height,
        scroll_y,
        frame_count,
    )
}

/// Get the version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
