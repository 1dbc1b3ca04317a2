//! Browser wiring (wasm only)
//!
//! One `requestAnimationFrame` loop feeds the view's scheduler, a
//! `ResizeObserver` feeds the geometry cache, and `pagehide` unmounts.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, ResizeObserver};

use super::dom::{DomSink, IconOverlay, PerformanceClock, warn_on_err};
use crate::error::HeroError;
use crate::settings::Settings;
use crate::sim::Layout;
use crate::toast::{ToastKind, ToastProvider, Toasts};
use crate::view::HeroView;

struct App {
    view: HeroView,
    toasts: ToastProvider,
    container: HtmlElement,
    raf_handle: Option<i32>,
    resize_observer: Option<ResizeObserver>,
    resize_closure: Option<Closure<dyn FnMut(js_sys::Array)>>,
}

impl App {
    fn shutdown(&mut self) {
        if let Some(handle) = self.raf_handle.take() {
            if let Some(window) = web_sys::window() {
                warn_on_err("cancel animation frame", window.cancel_animation_frame(handle));
            }
        }
        if let Some(observer) = self.resize_observer.take() {
            observer.disconnect();
        }
        self.resize_closure = None;
        self.view.unmount();
        self.toasts.manager().borrow_mut().teardown();
    }
}

/// Measure the container and viewport for the geometry cache
fn measure(container: &HtmlElement) -> Layout {
    let rect = container.get_bounding_client_rect();
    let window = web_sys::window();
    let dimension = |v: Option<Result<JsValue, JsValue>>, fallback: f64| {
        v.and_then(|r| r.ok()).and_then(|j| j.as_f64()).unwrap_or(fallback)
    };
    let vw = dimension(window.as_ref().map(|w| w.inner_width()), rect.width());
    let vh = dimension(window.as_ref().map(|w| w.inner_height()), rect.height());

    Layout {
        container: Vec2::new(rect.width() as f32, rect.height() as f32),
        viewport: Vec2::new(vw as f32, vh as f32),
        offset: Vec2::new(rect.left() as f32, rect.top() as f32),
    }
}

fn request_animation_frame(app: Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let next = app.clone();
    let closure = Closure::once(move |time: f64| {
        frame_loop(next, time);
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => app.borrow_mut().raf_handle = Some(handle),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
    {
        let mut a = app.borrow_mut();
        a.raf_handle = None;
        if !a.view.is_mounted() {
            return;
        }
        a.view.on_frame(time);
    }
    request_animation_frame(app);
}

fn setup_resize_observer(app: &Rc<RefCell<App>>) {
    let weak = Rc::downgrade(app);
    let closure = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let mut a = app.borrow_mut();
        let layout = measure(&a.container);
        a.view.on_resize(layout);
    });

    match ResizeObserver::new(closure.as_ref().unchecked_ref()) {
        Ok(observer) => {
            let mut a = app.borrow_mut();
            observer.observe(&a.container);
            a.resize_observer = Some(observer);
            a.resize_closure = Some(closure);
        }
        Err(e) => log::warn!("ResizeObserver unavailable: {:?}", e),
    }
}

fn setup_pagehide(app: &Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let weak = Rc::downgrade(app);
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if let Some(app) = weak.upgrade() {
            app.borrow_mut().shutdown();
        }
    });
    warn_on_err(
        "listen for pagehide",
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref()),
    );
    closure.forget();
}

fn to_js(e: HeroError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Handle returned to page scripts
#[wasm_bindgen]
pub struct HeroApp {
    app: Rc<RefCell<App>>,
    toasts: Toasts,
}

#[wasm_bindgen]
impl HeroApp {
    fn push(&self, kind: ToastKind, title: &str, message: &str, duration: Option<f64>) -> Result<f64, JsValue> {
        self.toasts
            .enqueue(kind, title, message, duration)
            .map(|id| id.0 as f64)
            .map_err(to_js)
    }

    pub fn success(&self, title: &str, message: &str, duration: Option<f64>) -> Result<f64, JsValue> {
        self.push(ToastKind::Success, title, message, duration)
    }

    pub fn error(&self, title: &str, message: &str, duration: Option<f64>) -> Result<f64, JsValue> {
        self.push(ToastKind::Error, title, message, duration)
    }

    pub fn warning(&self, title: &str, message: &str, duration: Option<f64>) -> Result<f64, JsValue> {
        self.push(ToastKind::Warning, title, message, duration)
    }

    pub fn info(&self, title: &str, message: &str, duration: Option<f64>) -> Result<f64, JsValue> {
        self.push(ToastKind::Info, title, message, duration)
    }

    pub fn dismiss(&self, id: f64) -> Result<bool, JsValue> {
        self.toasts
            .dismiss(crate::toast::ToastId(id as u64))
            .map_err(to_js)
    }

    pub fn unmount(&self) {
        self.app.borrow_mut().shutdown();
    }
}

/// Mount the hero onto the element with id `root_id`
///
/// `settings_json` overrides the defaults; invalid JSON is reported and the
/// defaults are used.
#[wasm_bindgen]
pub fn mount_hero(root_id: &str, settings_json: Option<String>) -> Result<HeroApp, JsValue> {
    let window = web_sys::window().ok_or_else(|| to_js(HeroError::MissingElement("window".into())))?;
    let document = window
        .document()
        .ok_or_else(|| to_js(HeroError::MissingElement("document".into())))?;

    let container: HtmlElement = document
        .get_element_by_id(root_id)
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| to_js(HeroError::MissingElement(format!("#{root_id}"))))?;

    let settings = match settings_json.as_deref().map(Settings::from_json) {
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            log::warn!("{}; using defaults", e);
            Settings::default()
        }
        None => Settings::default(),
    };

    let sink = DomSink::from_document(&document).map_err(to_js)?;
    let card_sizes = sink.card_sizes();
    let sink = Rc::new(RefCell::new(sink));

    let seed = js_sys::Date::now() as u64;
    let mut view = HeroView::mount(measure(&container), &card_sizes, &settings, seed, sink);

    let icons = IconOverlay::from_document(&document, settings.cycle.palette.clone());
    if !icons.is_empty() {
        view.subscribe_overlay(move |slots| icons.update(slots));
    }

    let toasts = ToastProvider::new(PerformanceClock);
    view.attach_toasts(&toasts);
    let handle = toasts.handle();

    let app = Rc::new(RefCell::new(App {
        view,
        toasts,
        container,
        raf_handle: None,
        resize_observer: None,
        resize_closure: None,
    }));

    setup_resize_observer(&app);
    setup_pagehide(&app);
    request_animation_frame(app.clone());

    log::info!("Hero running (seed {})", seed);
    Ok(HeroApp { app, toasts: handle })
}

/// Mount onto `#hero` and keep the app alive for the page's lifetime
pub fn mount_page() {
    match mount_hero("hero", None) {
        // Lives until pagehide
        Ok(app) => std::mem::forget(app),
        Err(e) => log::error!("Hero mount failed: {:?}", e),
    }
}
