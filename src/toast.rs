//! Toast notifications
//!
//! A `ToastProvider` owns the manager for the page. UI action handlers get a
//! cheap `Toasts` handle from it; a handle without a live provider refuses
//! every call with [`HeroError::NoToastProvider`] instead of silently
//! dropping the notification.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TOAST_MS;
use crate::error::HeroError;
use crate::scheduler::{Clock, TimerId, TimerQueue};

/// Toast identifier, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToastId(pub u64);

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

impl ToastId {
    fn next() -> Self {
        Self(NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Toast flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "success" => Some(ToastKind::Success),
            "error" => Some(ToastKind::Error),
            "warning" | "warn" => Some(ToastKind::Warning),
            "info" => Some(ToastKind::Info),
            _ => None,
        }
    }
}

/// A live notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    pub duration_ms: f64,
    pub created_ms: f64,
}

impl Toast {
    /// Still showing at `now_ms`
    pub fn is_live(&self, now_ms: f64) -> bool {
        now_ms < self.created_ms + self.duration_ms
    }
}

/// Ordered set of live toasts with expiry timers
pub struct ToastManager {
    toasts: Vec<Toast>,
    timers: TimerQueue<ToastId>,
    timer_ids: HashMap<ToastId, TimerId>,
    clock: Box<dyn Clock>,
    /// Bumped on every add/remove so renderers can skip unchanged frames
    revision: u64,
}

impl ToastManager {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            toasts: Vec::new(),
            timers: TimerQueue::new(),
            timer_ids: HashMap::new(),
            clock: Box::new(clock),
            revision: 0,
        }
    }

    /// Add a toast; it expires after `duration_ms` (default 4000)
    pub fn enqueue(
        &mut self,
        kind: ToastKind,
        title: impl Into<String>,
        message: impl Into<String>,
        duration_ms: Option<f64>,
    ) -> ToastId {
        let now = self.clock.now_ms();
        let duration_ms = duration_ms.unwrap_or(DEFAULT_TOAST_MS).max(0.0);
        let id = ToastId::next();

        let toast = Toast {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            duration_ms,
            created_ms: now,
        };
        log::debug!("Toast {} ({}): {}", id.0, kind.as_str(), toast.title);

        self.toasts.push(toast);
        let timer = self.timers.schedule(now, duration_ms, id);
        self.timer_ids.insert(id, timer);
        self.revision += 1;
        id
    }

    /// Remove a toast now, whatever its remaining time
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        if let Some(timer) = self.timer_ids.remove(&id) {
            self.timers.cancel(timer);
        }
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        let removed = self.toasts.len() != before;
        if removed {
            self.revision += 1;
            log::debug!("Toast {} dismissed", id.0);
        }
        removed
    }

    /// Drop every toast whose time is up. Returns the expired ids.
    pub fn advance(&mut self) -> Vec<ToastId> {
        let now = self.clock.now_ms();
        if self.timers.next_deadline().is_none_or(|deadline| deadline > now) {
            return Vec::new();
        }
        let expired = self.timers.fire_due(now);
        for id in &expired {
            self.timer_ids.remove(id);
        }
        self.toasts.retain(|t| !expired.contains(&t.id));
        self.revision += 1;
        log::debug!("{} toast(s) expired", expired.len());
        expired
    }

    /// Live toasts in insertion order
    ///
    /// Toasts past their deadline are left out even before `advance` has
    /// removed them.
    pub fn toasts(&self) -> Vec<Toast> {
        let now = self.clock.now_ms();
        self.toasts
            .iter()
            .filter(|t| t.is_live(now))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        let now = self.clock.now_ms();
        self.toasts.iter().find(|t| t.id == id && t.is_live(now))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Remove everything and cancel pending timers
    pub fn teardown(&mut self) {
        self.toasts.clear();
        self.timers.clear();
        self.timer_ids.clear();
        self.revision += 1;
    }
}

/// Owner of the page's toast manager
pub struct ToastProvider {
    inner: Rc<RefCell<ToastManager>>,
}

impl ToastProvider {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ToastManager::new(clock))),
        }
    }

    /// Handle for UI code; stops working once the provider is dropped
    pub fn handle(&self) -> Toasts {
        Toasts {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn manager(&self) -> &Rc<RefCell<ToastManager>> {
        &self.inner
    }

    /// Expire due toasts
    pub fn advance(&self) -> Vec<ToastId> {
        self.inner.borrow_mut().advance()
    }

    /// Snapshot of live toasts
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.borrow().toasts()
    }
}

impl Drop for ToastProvider {
    fn drop(&mut self) {
        if let Ok(mut manager) = self.inner.try_borrow_mut() {
            manager.teardown();
        }
    }
}

/// Toast API for UI action handlers
#[derive(Clone, Default)]
pub struct Toasts {
    inner: Weak<RefCell<ToastManager>>,
}

impl Toasts {
    /// A handle not attached to any provider
    pub fn detached() -> Self {
        Self::default()
    }

    fn manager(&self) -> Result<Rc<RefCell<ToastManager>>, HeroError> {
        self.inner.upgrade().ok_or_else(|| {
            log::error!("Toast API used outside of a ToastProvider");
            HeroError::NoToastProvider
        })
    }

    pub fn enqueue(
        &self,
        kind: ToastKind,
        title: &str,
        message: &str,
        duration_ms: Option<f64>,
    ) -> Result<ToastId, HeroError> {
        let manager = self.manager()?;
        let id = manager.borrow_mut().enqueue(kind, title, message, duration_ms);
        Ok(id)
    }

    pub fn success(&self, title: &str, message: &str, duration_ms: Option<f64>) -> Result<ToastId, HeroError> {
        self.enqueue(ToastKind::Success, title, message, duration_ms)
    }

    pub fn error(&self, title: &str, message: &str, duration_ms: Option<f64>) -> Result<ToastId, HeroError> {
        self.enqueue(ToastKind::Error, title, message, duration_ms)
    }

    pub fn warning(&self, title: &str, message: &str, duration_ms: Option<f64>) -> Result<ToastId, HeroError> {
        self.enqueue(ToastKind::Warning, title, message, duration_ms)
    }

    pub fn info(&self, title: &str, message: &str, duration_ms: Option<f64>) -> Result<ToastId, HeroError> {
        self.enqueue(ToastKind::Info, title, message, duration_ms)
    }

    pub fn dismiss(&self, id: ToastId) -> Result<bool, HeroError> {
        let manager = self.manager()?;
        let removed = manager.borrow_mut().dismiss(id);
        Ok(removed)
    }
}
