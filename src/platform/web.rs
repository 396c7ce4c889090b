//! Browser ports: requestAnimationFrame scheduling and DOM text

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::palette::Color;
use crate::ports::{FrameScheduler, TextAlign, TextStyle, TickHandle};

/// Frame callback shared between the scheduler and the page glue
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules frames with `requestAnimationFrame`
///
/// The callback is installed after construction, once the game that it
/// drives exists.
pub struct AnimationFrameScheduler {
    window: Window,
    callback: FrameCallback,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    /// Slot to store the frame closure in
    pub fn callback(&self) -> FrameCallback {
        self.callback.clone()
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_tick(&mut self) -> Option<TickHandle> {
        let slot = self.callback.borrow();
        let Some(closure) = slot.as_ref() else {
            log::warn!("Frame requested before the callback was installed");
            return None;
        };
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => Some(TickHandle(id)),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.window.cancel_animation_frame(handle.0).is_err() {
            log::warn!("cancelAnimationFrame failed for {}", handle.0);
        }
    }
}

/// HUD text as absolutely positioned elements inside a container
///
/// Elements are pooled and reused frame to frame; ones not written during a
/// frame are hidden when it ends.
pub struct DomTextLayer {
    document: Document,
    container: HtmlElement,
    pool: Vec<HtmlElement>,
    used: usize,
}

impl DomTextLayer {
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self {
            document,
            container,
            pool: Vec::new(),
            used: 0,
        }
    }

    pub fn begin(&mut self) {
        self.used = 0;
    }

    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle, color: Color) {
        let Some(el) = self.next_element() else {
            return;
        };
        el.set_text_content(Some(text));

        let transform = match style.align {
            TextAlign::Left => "translate(0, -100%)",
            TextAlign::Center => "translate(-50%, -50%)",
        };
        let css = el.style();
        let _ = css.set_property("display", "block");
        let _ = css.set_property("left", &format!("{}px", x));
        let _ = css.set_property("top", &format!("{}px", y));
        let _ = css.set_property("font-size", &format!("{}pt", style.size_pt));
        let _ = css.set_property("color", &color.to_css());
        let _ = css.set_property("transform", transform);
    }

    /// Hide elements left over from busier frames
    pub fn end(&mut self) {
        for el in &self.pool[self.used..] {
            let _ = el.style().set_property("display", "none");
        }
    }

    fn next_element(&mut self) -> Option<&HtmlElement> {
        if self.used == self.pool.len() {
            let el: HtmlElement = self
                .document
                .create_element("div")
                .ok()?
                .dyn_into()
                .ok()?;
            let css = el.style();
            let _ = css.set_property("position", "absolute");
            let _ = css.set_property("white-space", "nowrap");
            let _ = css.set_property("pointer-events", "none");
            let _ = css.set_property("font-family", "sans-serif");
            self.container.append_child(&el).ok()?;
            self.pool.push(el);
        }
        let el = self.pool.get(self.used)?;
        self.used += 1;
        Some(el)
    }
}
