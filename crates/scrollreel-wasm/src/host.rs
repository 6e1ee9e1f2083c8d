//! Browser-side [`PlayerHost`]: `<img>` fetches and a `setTimeout` safety timer.

use std::time::Duration;

use scrollreel_core::ReelError;
use scrollreel_player::{FrameRequest, Generation, PlayerHost};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlImageElement, Window};

use crate::canvas::CanvasImage;

/// An image element plus the handlers that report back to the player.
struct InFlight {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl InFlight {
    /// Detach the handlers and abort the download if it is still running.
    fn abandon(self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
        if !self.image.complete() {
            self.image.set_src("");
        }
    }
}

struct SafetyTimer {
    generation: Generation,
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

pub struct WebHost {
    window: Window,
    generation: Option<Generation>,
    in_flight: Vec<InFlight>,
    timer: Option<SafetyTimer>,
}

impl WebHost {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            generation: None,
            in_flight: Vec::new(),
            timer: None,
        }
    }

    /// Drop every handler this host registered.
    pub fn release(&mut self) {
        for fetch in self.in_flight.drain(..) {
            fetch.abandon();
        }
        self.generation = None;
        if let Some(timer) = self.timer.take() {
            self.window.clear_timeout_with_handle(timer.handle);
        }
    }
}

impl PlayerHost for WebHost {
    fn fetch_frame(&mut self, request: FrameRequest) {
        let FrameRequest { ticket, url } = request;

        // First request of a new frame set: the old images are no longer wanted.
        if self.generation != Some(ticket.generation) {
            for fetch in self.in_flight.drain(..) {
                fetch.abandon();
            }
            self.generation = Some(ticket.generation);
        }

        // Called while the player is borrowed, so a failure here cannot be
        // reported back synchronously; the frame stays pending.
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str("could not create image"), &err);
                return;
            }
        };

        let onload = {
            let image = image.clone();
            Closure::<dyn FnMut()>::new(move || {
                crate::deliver_frame(ticket, Ok(CanvasImage(image.clone())));
            })
        };
        let onerror = {
            let url = url.clone();
            Closure::<dyn FnMut()>::new(move || {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "Failed to load frame {:03}",
                    ticket.index
                )));
                crate::deliver_frame(ticket, Err(ReelError::asset("image failed to load", &url)));
            })
        };

        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(&url);

        self.in_flight.push(InFlight {
            image,
            _onload: onload,
            _onerror: onerror,
        });
    }

    fn arm_safety_timer(&mut self, generation: Generation, after: Duration) {
        if let Some(old) = self.timer.take() {
            self.window.clear_timeout_with_handle(old.handle);
        }

        let callback = Closure::<dyn FnMut()>::new(move || crate::deliver_timeout(generation));
        let millis = after.as_millis().min(i32::MAX as u128) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis,
            ) {
            Ok(handle) => {
                self.timer = Some(SafetyTimer {
                    generation,
                    handle,
                    _callback: callback,
                })
            }
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str("could not arm safety timer"), &err);
            }
        }
    }

    fn disarm_safety_timer(&mut self, generation: Generation) {
        if self.timer.as_ref().map(|t| t.generation) == Some(generation) {
            if let Some(timer) = self.timer.take() {
                self.window.clear_timeout_with_handle(timer.handle);
            }
        }
    }
}
