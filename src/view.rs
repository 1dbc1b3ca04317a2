//! Mounted hero section
//!
//! `HeroView` owns the frame scheduler and everything it drives. Mounting
//! registers the `motion` and `arc-cycle` tasks; unmounting unregisters them,
//! cancels the cycle's timers and drops overlay observers, after which frame
//! and resize signals are ignored.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::hero::{ArcCycle, ArcSlot, SLOT_COUNT, SlotUpdate};
use crate::overlay::{OverlayBus, SubscriptionId};
use crate::platform::PresentationSink;
use crate::scheduler::{FrameInfo, FrameScheduler, TaskId};
use crate::settings::{Settings, Tuning};
use crate::sim::{FloatingField, Geometry, GeometryCache, Layout};
use crate::toast::ToastProvider;

/// Seed offset so the cycle and the field don't share a random stream
const CYCLE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Shared state touched by frame tasks
struct HeroState {
    field: FloatingField,
    cache: GeometryCache,
    cycle: ArcCycle,
    overlay: OverlayBus,
    tuning: Tuning,
}

/// The hero section while it is on the page
pub struct HeroView {
    scheduler: FrameScheduler,
    state: Rc<RefCell<HeroState>>,
    sink: Rc<RefCell<dyn PresentationSink>>,
    tasks: Vec<TaskId>,
    mounted: bool,
}

impl HeroView {
    /// Build the field and cycle for `layout` and register their frame tasks
    ///
    /// An empty `card_sizes` or a zero-area container leaves the motion task
    /// idle; the arc cycle runs regardless.
    pub fn mount(
        layout: Layout,
        card_sizes: &[Vec2],
        settings: &Settings,
        seed: u64,
        sink: Rc<RefCell<dyn PresentationSink>>,
    ) -> Self {
        let tuning = settings.effective_tuning();

        let mut cache = GeometryCache::new();
        cache.observe(layout, &tuning);
        let geometry = Geometry::from_layout(&layout, &tuning);
        let field = FloatingField::new(card_sizes, &geometry, tuning.clone(), seed);
        if field.is_empty() {
            log::warn!("Hero mounted without cards; motion disabled");
        }

        let state = Rc::new(RefCell::new(HeroState {
            field,
            cache,
            cycle: ArcCycle::new(settings.cycle.clone(), seed ^ CYCLE_SEED_SALT),
            overlay: OverlayBus::new(),
            tuning: tuning.clone(),
        }));

        let mut scheduler = FrameScheduler::new(tuning.max_frame_dt);
        let mut tasks = Vec::new();

        {
            let state = state.clone();
            let sink = sink.clone();
            tasks.push(scheduler.register("motion", move |info: &FrameInfo| {
                let mut guard = state.borrow_mut();
                let HeroState { field, cache, .. } = &mut *guard;
                let Some(geometry) = cache.geometry() else {
                    return;
                };
                let frame = field.step(geometry, info.dt);
                if !frame.is_empty() {
                    sink.borrow_mut().apply_motion(&frame);
                }
            }));
        }

        {
            let state = state.clone();
            let sink = sink.clone();
            tasks.push(scheduler.register("arc-cycle", move |info: &FrameInfo| {
                let mut guard = state.borrow_mut();
                let HeroState { cycle, overlay, .. } = &mut *guard;
                let update = cycle.advance(info.now_ms);
                if let Some(hero) = &update.hero {
                    sink.borrow_mut().apply_hero(hero);
                }
                match update.slots {
                    SlotUpdate::Publish(slots) => overlay.publish(slots),
                    SlotUpdate::Clear => overlay.clear(),
                    SlotUpdate::Unchanged => {}
                }
            }));
        }

        log::info!(
            "Hero mounted: {} cards, container {}x{}",
            card_sizes.len(),
            layout.container.x,
            layout.container.y
        );

        Self {
            scheduler,
            state,
            sink,
            tasks,
            mounted: true,
        }
    }

    /// Let the view's frame signal also expire and render toasts
    pub fn attach_toasts(&mut self, provider: &ToastProvider) {
        if !self.mounted {
            return;
        }
        // Weak, so dropping the provider still detaches its `Toasts` handles
        let manager = Rc::downgrade(provider.manager());
        let sink = self.sink.clone();
        let mut seen_revision = None;
        let id = self.scheduler.register("toasts", move |_: &FrameInfo| {
            let Some(shared) = manager.upgrade() else {
                if seen_revision.take().is_some() {
                    sink.borrow_mut().apply_toasts(&[]);
                }
                return;
            };
            let mut manager = shared.borrow_mut();
            manager.advance();
            if seen_revision != Some(manager.revision()) {
                seen_revision = Some(manager.revision());
                sink.borrow_mut().apply_toasts(&manager.toasts());
            }
        });
        self.tasks.push(id);
    }

    /// Forward one display frame (timestamp in milliseconds)
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<FrameInfo> {
        if !self.mounted {
            return None;
        }
        self.scheduler.on_frame(timestamp_ms)
    }

    /// Forward a resize observation. Returns true if geometry was rebuilt.
    pub fn on_resize(&mut self, layout: Layout) -> bool {
        if !self.mounted {
            return false;
        }
        let mut guard = self.state.borrow_mut();
        let HeroState {
            field, cache, tuning, ..
        } = &mut *guard;
        if !cache.observe(layout, tuning) {
            return false;
        }
        if let Some(geometry) = cache.geometry() {
            field.refit(geometry);
        }
        true
    }

    /// Observe the arc slots published by the cycle
    pub fn subscribe_overlay(
        &self,
        observer: impl FnMut(Option<&[ArcSlot; SLOT_COUNT]>) + 'static,
    ) -> Option<SubscriptionId> {
        if !self.mounted {
            log::warn!("Overlay subscription on an unmounted hero ignored");
            return None;
        }
        Some(self.state.borrow_mut().overlay.subscribe(observer))
    }

    pub fn unsubscribe_overlay(&self, id: SubscriptionId) -> bool {
        self.state.borrow_mut().overlay.unsubscribe(id)
    }

    /// Cancel frame tasks and timers. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        for id in self.tasks.drain(..) {
            self.scheduler.unregister(id);
        }
        self.scheduler.clear();

        let mut state = self.state.borrow_mut();
        state.cycle.teardown();
        state.overlay.reset();
        self.mounted = false;
        log::info!("Hero unmounted after {} frames", self.scheduler.frames);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Registered frame tasks, in run order
    pub fn task_names(&self) -> Vec<&'static str> {
        self.scheduler.task_names()
    }

    /// Geometry rebuilds so far
    pub fn geometry_recomputes(&self) -> u32 {
        self.state.borrow().cache.recomputes()
    }

    pub fn pending_cycle_timers(&self) -> usize {
        self.state.borrow().cycle.pending_timers()
    }

    /// Current card positions
    pub fn card_positions(&self) -> Vec<Vec2> {
        self.state.borrow().field.cards.iter().map(|c| c.pos).collect()
    }
}

impl Drop for HeroView {
    fn drop(&mut self) {
        self.unmount();
    }
}
