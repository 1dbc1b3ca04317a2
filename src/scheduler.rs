//! Frame fan-out and one-shot timers
//!
//! The page owns exactly one animation-frame callback. `FrameScheduler` sits
//! behind it and runs every registered task, in registration order, once per
//! frame. Timers are deadline based and pumped by whoever owns the clock.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::MAX_FRAME_DT;

/// Source of "now" in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Clock advanced by hand (native runs and tests)
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, by_ms: f64) {
        self.now.set(self.now.get() + by_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Timing for one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frame timestamp (milliseconds)
    pub now_ms: f64,
    /// Seconds since the previous frame, clamped
    pub dt: f32,
}

/// Handle for a registered frame task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

type FrameTask = Box<dyn FnMut(&FrameInfo)>;

/// Runs registered per-frame tasks in a fixed order
pub struct FrameScheduler {
    tasks: Vec<(TaskId, &'static str, FrameTask)>,
    next_id: u32,
    last_timestamp: Option<f64>,
    max_dt: f32,
    /// Frames dispatched to tasks (the timestamp-only first frame excluded)
    pub frames: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT)
    }
}

impl FrameScheduler {
    /// `max_dt` is the longest step handed to tasks; anything not positive
    /// falls back to [`MAX_FRAME_DT`]
    pub fn new(max_dt: f32) -> Self {
        let max_dt = if max_dt.is_finite() && max_dt > 0.0 {
            max_dt
        } else {
            log::warn!("Frame step cap {} unusable, using {}", max_dt, MAX_FRAME_DT);
            MAX_FRAME_DT
        };
        Self {
            tasks: Vec::new(),
            next_id: 1,
            last_timestamp: None,
            max_dt,
            frames: 0,
        }
    }

    /// Add a task; it runs after every task registered before it
    pub fn register(&mut self, name: &'static str, task: impl FnMut(&FrameInfo) + 'static) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push((id, name, Box::new(task)));
        log::debug!("Frame task '{}' registered", name);
        id
    }

    /// Remove a task. Returns false if it was not registered.
    pub fn unregister(&mut self, id: TaskId) -> bool {
        match self.tasks.iter().position(|(tid, _, _)| *tid == id) {
            Some(i) => {
                let (_, name, _) = self.tasks.remove(i);
                log::debug!("Frame task '{}' unregistered", name);
                true
            }
            None => false,
        }
    }

    /// Handle one display frame
    ///
    /// The first frame after construction (or `reset_clock`) only records its
    /// timestamp and returns `None`. Later frames run every task with the
    /// elapsed time, clamped to `[0, max_dt]` seconds.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<FrameInfo> {
        let last = self.last_timestamp.replace(timestamp_ms);
        let last = last?;

        let dt = (((timestamp_ms - last) / 1000.0) as f32).max(0.0).min(self.max_dt);
        let info = FrameInfo {
            now_ms: timestamp_ms,
            dt,
        };
        for (_, _, task) in self.tasks.iter_mut() {
            task(&info);
        }
        self.frames += 1;
        Some(info)
    }

    /// Forget the last timestamp so the next frame is skipped again
    pub fn reset_clock(&mut self) {
        self.last_timestamp = None;
    }

    /// Drop every task
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.last_timestamp = None;
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Registered task names in run order
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(_, name, _)| *name).collect()
    }
}

/// Handle for a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    deadline_ms: f64,
    payload: T,
}

/// One-shot timers carrying a payload
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<Timer<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            deadline_ms: now_ms + delay_ms.max(0.0),
            payload,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Remove and return every payload due at `now_ms`
    ///
    /// Ordered by deadline; equal deadlines fire in scheduling order.
    pub fn fire_due(&mut self, now_ms: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|t| t.deadline_ms <= now_ms);
        self.timers = pending;
        due.sort_by(|a, b| a.deadline_ms.total_cmp(&b.deadline_ms).then(a.id.cmp(&b.id)));
        due.into_iter().map(|t| t.payload).collect()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.iter().map(|t| t.deadline_ms).min_by(|a, b| a.total_cmp(b))
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_unusable_step_cap_falls_back() {
        let mut sched = FrameScheduler::new(-1.0);
        let seen = Rc::new(Cell::new(0.0f32));
        let s = seen.clone();
        sched.register("dt", move |info: &FrameInfo| s.set(info.dt));
        sched.on_frame(0.0);
        sched.on_frame(1000.0);
        assert_eq!(seen.get(), MAX_FRAME_DT);
    }

    #[test]
    fn test_first_frame_skipped() {
        let mut sched = FrameScheduler::default();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        sched.register("count", move |_| r.set(r.get() + 1));

        assert!(sched.on_frame(1000.0).is_none());
        assert_eq!(runs.get(), 0);

        let info = sched.on_frame(1016.0).unwrap();
        assert!((info.dt - 0.016).abs() < 1e-6);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_tasks_run_in_registration_order() {
        let mut sched = FrameScheduler::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["motion", "arc-cycle", "toasts"] {
            let log = log.clone();
            sched.register(name, move |_| log.borrow_mut().push(name));
        }
        sched.on_frame(0.0);
        sched.on_frame(16.0);
        assert_eq!(*log.borrow(), vec!["motion", "arc-cycle", "toasts"]);
        assert_eq!(sched.task_names(), vec!["motion", "arc-cycle", "toasts"]);
    }

    #[test]
    fn test_unregister_stops_task() {
        let mut sched = FrameScheduler::default();
        let runs = Rc::new(Cell::new(0));
        let r = runs.clone();
        let id = sched.register("count", move |_| r.set(r.get() + 1));
        sched.on_frame(0.0);
        sched.on_frame(16.0);
        assert!(sched.unregister(id));
        assert!(!sched.unregister(id));
        sched.on_frame(32.0);
        assert_eq!(runs.get(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn test_dt_clamped_after_suspension() {
        let mut sched = FrameScheduler::new(0.05);
        sched.on_frame(0.0);
        let info = sched.on_frame(30_000.0).unwrap();
        assert_eq!(info.dt, 0.05);
        // Clock going backwards never yields negative dt
        let info = sched.on_frame(29_000.0).unwrap();
        assert_eq!(info.dt, 0.0);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 300.0, "c");
        q.schedule(0.0, 100.0, "a");
        q.schedule(0.0, 100.0, "b");
        assert_eq!(q.next_deadline(), Some(100.0));
        assert!(q.fire_due(99.0).is_empty());
        assert_eq!(q.fire_due(100.0), vec!["a", "b"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.fire_due(1000.0), vec!["c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(0.0, 50.0, 1);
        q.schedule(0.0, 60.0, 2);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.fire_due(100.0), vec![2]);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.set(10.0);
        other.advance(5.0);
        assert_eq!(clock.now_ms(), 15.0);
    }
}
