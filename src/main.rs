//! Hero Drift entry point
//!
//! On the web this mounts the hero onto `#hero`. Natively it runs the same
//! view headless for a few simulated seconds and logs what it would draw.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Hero Drift starting...");
    hero_drift::platform::web::mount_page();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Hero Drift (native) starting...");

    // Argument is either a preset name or a settings JSON file
    let settings = match std::env::args().nth(1) {
        None => hero_drift::Settings::default(),
        Some(arg) => match hero_drift::MotionPreset::parse(&arg) {
            Some(preset) => {
                log::info!("Using preset {}", preset.as_str());
                hero_drift::Settings::from_preset(preset)
            }
            None => load_settings(&arg),
        },
    };

    headless::run(&settings, 10.0);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> hero_drift::Settings {
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read: {e}"))
        .and_then(|json| hero_drift::Settings::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}: {}", path, e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use hero_drift::Settings;
    use hero_drift::platform::RecordingSink;
    use hero_drift::scheduler::ManualClock;
    use hero_drift::sim::Layout;
    use hero_drift::toast::ToastProvider;
    use hero_drift::view::HeroView;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Simulate `seconds` of page time at 60 Hz
    pub fn run(settings: &Settings, seconds: f64) {
        let layout = Layout::full_viewport(Vec2::new(1440.0, 900.0));
        let cards = [
            Vec2::new(200.0, 96.0),
            Vec2::new(180.0, 88.0),
            Vec2::new(220.0, 104.0),
            Vec2::new(160.0, 80.0),
            Vec2::new(190.0, 92.0),
            Vec2::new(210.0, 100.0),
        ];

        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        let clock = ManualClock::new();
        let provider = ToastProvider::new(clock.clone());

        let mut view = HeroView::mount(layout, &cards, settings, 2024, sink.clone());
        view.attach_toasts(&provider);

        let toasts = provider.handle();
        let mut last_label = String::new();
        let mut now = 0.0;
        let mut frame = 0u64;

        while now <= seconds * 1000.0 {
            clock.set(now);
            if frame % 180 == 0 {
                let result = match (frame / 180) % 4 {
                    0 => toasts.success("Subscribed", "You're on the list", None),
                    1 => toasts.info("Tip", "Drag a card to pause it", Some(2000.0)),
                    2 => toasts.warning("Heads up", "Preview build", Some(1500.0)),
                    _ => toasts.error("Offline", "Retrying shortly", Some(1000.0)),
                };
                if let Err(e) = result {
                    log::error!("{}", e);
                }
            }
            if frame == 300 {
                view.on_resize(Layout::full_viewport(Vec2::new(1024.0, 768.0)));
            }

            view.on_frame(now);

            let sink = sink.borrow();
            if let Some(hero) = &sink.hero {
                if hero.label != last_label {
                    log::info!(
                        "t={:>6.0}ms headline '{}' gradient {:?}",
                        now,
                        hero.label,
                        hero.gradient
                    );
                    last_label = hero.label.clone();
                }
            }

            now += FRAME_MS;
            frame += 1;
        }

        let sink = sink.borrow();
        log::info!(
            "{} motion frames, {} headline changes, {} toasts live, {} geometry rebuilds",
            sink.motion_frames,
            sink.hero_changes,
            sink.toasts.len(),
            view.geometry_recomputes()
        );
        for (i, pos) in view.card_positions().iter().enumerate() {
            log::info!("card {}: ({:.1}, {:.1})", i, pos.x, pos.y);
        }

        view.unmount();
    }
}
