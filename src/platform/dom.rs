//! DOM presentation (wasm only)
//!
//! Page contract:
//! - `[data-hero-card]`: floating cards, in simulation order
//! - `[data-hero-label]`: rotating headline word
//! - `[data-hero-gradient]`: element whose background carries the gradient
//! - `[data-arc-icon]`: up to three icons riding the arc tips
//! - `[data-toast-root]`: toast stack container

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use super::PresentationSink;
use crate::error::HeroError;
use crate::hero::{ArcSlot, HeroFrame, SLOT_COUNT};
use crate::scheduler::Clock;
use crate::sim::MotionFrame;
use crate::toast::Toast;

/// `performance.now()` clock
#[derive(Debug, Clone, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// All elements matching `selector`, as `HtmlElement`s
pub fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn query_one(document: &Document, selector: &str) -> Option<HtmlElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Log a failed DOM call; the page keeps running without it
pub(crate) fn warn_on_err<T>(what: &str, result: Result<T, JsValue>) {
    if let Err(e) = result {
        log::warn!("Failed to {}: {:?}", what, e);
    }
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    warn_on_err(&format!("set {property}"), el.style().set_property(property, value));
}

/// Writes snapshots into the page
pub struct DomSink {
    document: Document,
    cards: Vec<HtmlElement>,
    label: Option<HtmlElement>,
    gradient: Option<HtmlElement>,
    toast_root: Option<Element>,
}

impl DomSink {
    pub fn from_document(document: &Document) -> Result<Self, HeroError> {
        let cards = query_all(document, "[data-hero-card]");
        let label = query_one(document, "[data-hero-label]");
        let gradient = query_one(document, "[data-hero-gradient]");
        let toast_root = document.query_selector("[data-toast-root]").ok().flatten();

        if label.is_none() && cards.is_empty() {
            return Err(HeroError::MissingElement(
                "[data-hero-card] or [data-hero-label]".to_string(),
            ));
        }
        if toast_root.is_none() {
            log::warn!("No [data-toast-root]; toasts will not be shown");
        }

        log::info!("DOM sink: {} cards", cards.len());
        Ok(Self {
            document: document.clone(),
            cards,
            label,
            gradient,
            toast_root,
        })
    }

    /// Rendered card sizes, in the same order the cards are animated
    pub fn card_sizes(&self) -> Vec<Vec2> {
        self.cards
            .iter()
            .map(|c| Vec2::new(c.offset_width() as f32, c.offset_height() as f32))
            .collect()
    }

    fn toast_element(&self, toast: &Toast) -> Option<Element> {
        let el = self.document.create_element("div").ok()?;
        el.set_class_name(&format!("toast toast-{}", toast.kind.as_str()));
        warn_on_err(
            "tag toast",
            el.set_attribute("data-toast-id", &toast.id.0.to_string()),
        );
        warn_on_err("set toast role", el.set_attribute("role", "status"));

        let title = self.document.create_element("strong").ok()?;
        title.set_text_content(Some(&toast.title));
        warn_on_err("append toast title", el.append_child(&title));

        if !toast.message.is_empty() {
            let message = self.document.create_element("p").ok()?;
            message.set_text_content(Some(&toast.message));
            warn_on_err("append toast message", el.append_child(&message));
        }
        Some(el)
    }
}

impl PresentationSink for DomSink {
    fn apply_motion(&mut self, frame: &MotionFrame) {
        for offset in &frame.offsets {
            if let Some(card) = self.cards.get(offset.index) {
                set_style(
                    card,
                    "transform",
                    &format!("translate3d({:.2}px, {:.2}px, 0)", offset.x, offset.y),
                );
            }
        }
    }

    fn apply_hero(&mut self, hero: &HeroFrame) {
        if let Some(label) = &self.label {
            label.set_text_content(Some(&hero.label));
        }
        if let Some(target) = &self.gradient {
            let [a, b, c] = &hero.gradient;
            set_style(
                target,
                "background-image",
                &format!("linear-gradient(90deg, {a}, {b}, {c})"),
            );
        }
    }

    fn apply_toasts(&mut self, toasts: &[Toast]) {
        let Some(root) = &self.toast_root else {
            return;
        };
        root.set_inner_html("");
        for toast in toasts {
            if let Some(el) = self.toast_element(toast) {
                warn_on_err("append toast", root.append_child(&el));
            }
        }
    }
}

/// Arc-tip icons, driven from overlay bus notifications
pub struct IconOverlay {
    icons: Vec<HtmlElement>,
    palette: [String; SLOT_COUNT],
}

impl IconOverlay {
    pub fn from_document(document: &Document, palette: [String; SLOT_COUNT]) -> Self {
        let icons = query_all(document, "[data-arc-icon]");
        Self { icons, palette }
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    pub fn update(&self, slots: Option<&[ArcSlot; SLOT_COUNT]>) {
        match slots {
            Some(slots) => {
                for (icon, slot) in self.icons.iter().zip(slots.iter()) {
                    set_style(icon, "transform", &format!("rotate({:.2}deg)", slot.angle));
                    set_style(icon, "opacity", &format!("{:.3}", slot.opacity));
                    if let Some(color) = self.palette.get(slot.color) {
                        set_style(icon, "color", color);
                    }
                }
            }
            None => {
                for icon in &self.icons {
                    set_style(icon, "opacity", "0");
                }
            }
        }
    }
}
