//! Published arc slot values
//!
//! Decorative icons follow the arc tips drawn by the hero cycle. Instead of
//! reading shared globals they subscribe to an `OverlayBus` owned by the
//! mounted view.

use crate::hero::{ArcSlot, SLOT_COUNT};

/// Current arc slots, or `None` while the arcs are hidden
pub type SlotValues = Option<[ArcSlot; SLOT_COUNT]>;

/// Handle returned by [`OverlayBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

type Observer = Box<dyn FnMut(Option<&[ArcSlot; SLOT_COUNT]>)>;

/// Owned publish/subscribe context for arc slot values
#[derive(Default)]
pub struct OverlayBus {
    observers: Vec<(SubscriptionId, Observer)>,
    current: SlotValues,
    next_id: u32,
}

impl OverlayBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. It is immediately told the current value.
    pub fn subscribe(
        &mut self,
        mut observer: impl FnMut(Option<&[ArcSlot; SLOT_COUNT]>) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        observer(self.current.as_ref());
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Publish new slot values to every observer, in subscription order
    pub fn publish(&mut self, slots: [ArcSlot; SLOT_COUNT]) {
        self.current = Some(slots);
        for (_, observer) in self.observers.iter_mut() {
            observer(Some(&slots));
        }
    }

    /// Hide the slots. Observers hear about it only if something was shown.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            for (_, observer) in self.observers.iter_mut() {
                observer(None);
            }
        }
    }

    pub fn current(&self) -> SlotValues {
        self.current
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Drop all observers and the current value
    pub fn reset(&mut self) {
        self.observers.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn slots(opacity: f32) -> [ArcSlot; SLOT_COUNT] {
        [0, 1, 2].map(|i| ArcSlot {
            angle: i as f32 * 120.0,
            opacity,
            color: i,
        })
    }

    #[test]
    fn test_publish_reaches_all_observers_in_order() {
        let mut bus = OverlayBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = seen.clone();
            bus.subscribe(move |v| seen.borrow_mut().push((tag, v.map(|s| s[0].opacity))));
        }
        bus.publish(slots(0.5));
        assert_eq!(
            *seen.borrow(),
            vec![("a", None), ("b", None), ("a", Some(0.5)), ("b", Some(0.5))]
        );
    }

    #[test]
    fn test_clear_notifies_once() {
        let mut bus = OverlayBus::new();
        let clears = Rc::new(RefCell::new(0));
        let c = clears.clone();
        bus.subscribe(move |v| {
            if v.is_none() {
                *c.borrow_mut() += 1;
            }
        });
        // Initial notification on subscribe
        assert_eq!(*clears.borrow(), 1);
        bus.publish(slots(1.0));
        bus.clear();
        bus.clear();
        assert_eq!(*clears.borrow(), 2);
        assert!(bus.current().is_none());
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = OverlayBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(slots(1.0));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.observer_count(), 0);
    }
}
