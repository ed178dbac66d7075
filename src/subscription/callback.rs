// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener storage behind [`Subscribable`](super::Subscribable).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::StateChange;
use crate::types::{OperatingMode, Temperature, TemperatureZone};

/// Token returned by every `on_*` registration.
///
/// Pass it back to `unsubscribe` to drop the listener. Tokens are never
/// reused within one radiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Payload handed to temperature listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureUpdate {
    /// Circuit the values belong to.
    pub zone: TemperatureZone,
    /// Measured value. `None` when the update comes from a setpoint write.
    pub current: Option<Temperature>,
    pub target: Temperature,
}

#[derive(Clone)]
enum Listener {
    Any(Arc<dyn Fn(&StateChange) + Send + Sync>),
    Mode(Arc<dyn Fn(Option<OperatingMode>) + Send + Sync>),
    Temperature(Arc<dyn Fn(TemperatureUpdate) + Send + Sync>),
    Disconnected(Arc<dyn Fn() + Send + Sync>),
}

/// Ordered list of listeners for one radiator.
///
/// Listeners run in registration order on the task that committed the
/// change, so they must return quickly. The list is cloned before any
/// listener runs, which lets a listener unsubscribe itself or register
/// another one; such edits take effect from the next dispatch.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    fn register(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// `None` is passed when the radiator reports a mode code this crate
    /// does not know.
    pub fn on_mode_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Option<OperatingMode>) + Send + Sync + 'static,
    {
        self.register(Listener::Mode(Arc::new(callback)))
    }

    pub fn on_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(TemperatureUpdate) + Send + Sync + 'static,
    {
        self.register(Listener::Temperature(Arc::new(callback)))
    }

    pub fn on_disconnected<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(Listener::Disconnected(Arc::new(callback)))
    }

    /// Sees every change, including the batch itself when one is dispatched.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.register(Listener::Any(Arc::new(callback)))
    }

    /// Returns `false` if `id` was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        match listeners.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    fn snapshot(&self) -> Vec<Listener> {
        self.listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    /// Delivers a committed change.
    ///
    /// `on_state_changed` listeners run first, then the typed ones. A batch
    /// is delivered whole and then entry by entry.
    pub fn dispatch(&self, change: &StateChange) {
        let listeners = self.snapshot();
        Self::deliver(&listeners, change);
    }

    fn deliver(listeners: &[Listener], change: &StateChange) {
        for listener in listeners {
            if let Listener::Any(callback) = listener {
                callback(change);
            }
        }

        let update = match change {
            StateChange::Batch(changes) => {
                for nested in changes {
                    Self::deliver(listeners, nested);
                }
                return;
            }
            StateChange::Mode(mode) => {
                for listener in listeners {
                    if let Listener::Mode(callback) = listener {
                        callback(*mode);
                    }
                }
                return;
            }
            StateChange::Temperature {
                zone,
                current,
                target,
            } => TemperatureUpdate {
                zone: *zone,
                current: Some(*current),
                target: *target,
            },
            StateChange::TargetTemperature { zone, target } => TemperatureUpdate {
                zone: *zone,
                current: None,
                target: *target,
            },
        };

        for listener in listeners {
            if let Listener::Temperature(callback) = listener {
                callback(update);
            }
        }
    }

    /// Runs the `on_disconnected` listeners.
    pub fn dispatch_disconnected(&self) {
        for listener in self.snapshot() {
            if let Listener::Disconnected(callback) = listener {
                callback();
            }
        }
    }

    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.listeners.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("listeners", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn t(raw: u16) -> Temperature {
        Temperature::from_raw(raw)
    }

    fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn generic_listeners_run_before_typed_ones() {
        let registry = CallbackRegistry::new();
        let seen = log();

        let s = seen.clone();
        registry.on_mode_changed(move |mode| s.lock().push(format!("mode {mode:?}")));
        let s = seen.clone();
        registry.on_state_changed(move |_| s.lock().push("any".into()));

        registry.dispatch(&StateChange::mode(OperatingMode::On));
        assert_eq!(*seen.lock(), ["any", "mode Some(On)"]);
    }

    #[test]
    fn typed_listeners_follow_registration_order() {
        let registry = CallbackRegistry::new();
        let seen = log();
        for name in ["first", "second", "third"] {
            let s = seen.clone();
            registry.on_temperature_changed(move |_| s.lock().push(name.into()));
        }

        registry.dispatch(&StateChange::target_temperature(TemperatureZone::Room, t(210)));
        assert_eq!(*seen.lock(), ["first", "second", "third"]);
    }

    #[test]
    fn readings_and_setpoint_writes_map_to_updates() {
        let registry = CallbackRegistry::new();
        let updates = Arc::new(Mutex::new(Vec::new()));
        let u = updates.clone();
        registry.on_temperature_changed(move |update| u.lock().push(update));

        registry.dispatch(&StateChange::temperature(TemperatureZone::Room, t(195), t(210)));
        registry.dispatch(&StateChange::target_temperature(TemperatureZone::Element, t(450)));

        let updates = updates.lock();
        assert_eq!(
            updates[0],
            TemperatureUpdate {
                zone: TemperatureZone::Room,
                current: Some(t(195)),
                target: t(210),
            }
        );
        assert_eq!(
            updates[1],
            TemperatureUpdate {
                zone: TemperatureZone::Element,
                current: None,
                target: t(450),
            }
        );
    }

    #[test]
    fn batch_is_seen_whole_then_per_entry() {
        let registry = CallbackRegistry::new();
        let seen = log();
        let s = seen.clone();
        registry.on_state_changed(move |change| {
            let label = if matches!(change, StateChange::Batch(_)) { "batch" } else { "leaf" };
            s.lock().push(label.into());
        });
        let s = seen.clone();
        registry.on_mode_changed(move |_| s.lock().push("mode".into()));

        registry.dispatch(&StateChange::batch(vec![
            StateChange::temperature(TemperatureZone::Element, t(400), t(450)),
            StateChange::mode(OperatingMode::Off),
        ]));
        assert_eq!(*seen.lock(), ["batch", "leaf", "leaf", "mode"]);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let calls = Arc::new(AtomicU64::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let r = Arc::downgrade(&registry);
        let c = calls.clone();
        let slot = own_id.clone();
        let id = registry.on_disconnected(move || {
            c.fetch_add(1, Ordering::SeqCst);
            if let (Some(registry), Some(id)) = (r.upgrade(), *slot.lock()) {
                registry.unsubscribe(id);
            }
        });
        *own_id.lock() = Some(id);

        registry.dispatch_disconnected();
        registry.dispatch_disconnected();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn unsubscribe_and_clear() {
        let registry = CallbackRegistry::new();
        let a = registry.on_mode_changed(|_| {});
        let b = registry.on_state_changed(|_| {});
        assert!(a < b);
        assert_eq!(registry.callback_count(), 2);

        assert!(registry.unsubscribe(a));
        assert!(!registry.unsubscribe(a));
        assert_eq!(format!("{registry:?}"), "CallbackRegistry { listeners: 1 }");

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(b.to_string(), format!("Sub({})", b.value()));
    }
}
