//! Thread-safe parameter storage.
//!
//! A [`Parameter`] is shared between the scheduling threads, the real-time
//! thread and the background worker through an `Arc`. Its value is never
//! guarded by a lock:
//!
//! - Scalars (`Float`, `Integer`, `Boolean`) live in an `AtomicU64` holding
//!   the `f64` bit pattern.
//! - Bytes (`Text`, `Blob`) are published through `ArcSwap`, so a reader
//!   always sees one complete buffer.
//! - Observers are kept in a copy-on-write `ArcSwap<Vec<_>>`; the real-time
//!   thread reads the list without locking while registration happens
//!   elsewhere.
//!
//! Mutation happens through [`Parameter::apply`], which the dispatch layer
//! calls from exactly one thread per change. Readers outside an apply step
//! see eventually-consistent values.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use crate::observer::{ObserverRef, Priority, same_observer};
use crate::param_info::{ParamDescriptor, ParamFlags, ParamScale, ParamUnit};
use crate::value::Payload;

/// Closed set of parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Continuous scalar.
    Float,
    /// Scalar rounded to whole numbers.
    Integer,
    /// On/off switch; values above 0.5 read as `true`.
    Boolean,
    /// UTF-8 string stored as bytes.
    Text,
    /// Opaque byte buffer.
    Blob,
}

impl ParamKind {
    /// Whether this kind stores bytes instead of a scalar.
    #[inline]
    pub const fn supports_data(self) -> bool {
        matches!(self, ParamKind::Text | ParamKind::Blob)
    }
}

/// A named, typed parameter that can be read from any thread.
pub struct Parameter {
    descriptor: ParamDescriptor,
    kind: ParamKind,
    value: AtomicU64,
    data: ArcSwap<Vec<u8>>,
    observers: ArcSwap<Vec<ObserverRef>>,
}

impl Parameter {
    /// Creates a parameter of `kind` described by `descriptor`.
    ///
    /// The scalar value starts at the descriptor default (quantized for the
    /// kind); byte storage starts empty.
    pub fn new(kind: ParamKind, descriptor: ParamDescriptor) -> Self {
        let initial = quantize(kind, &descriptor, descriptor.default);
        Self {
            descriptor,
            kind,
            value: AtomicU64::new(initial.to_bits()),
            data: ArcSwap::from_pointee(Vec::new()),
            observers: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Continuous parameter over `[min, max]`.
    pub fn float(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self::new(ParamKind::Float, ParamDescriptor::new(name, min, max, default))
    }

    /// Whole-number parameter over `[min, max]`.
    pub fn integer(name: impl Into<String>, min: i64, max: i64, default: i64) -> Self {
        let descriptor = ParamDescriptor::new(name, min as f64, max as f64, default as f64)
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED));
        Self::new(ParamKind::Integer, descriptor)
    }

    /// On/off parameter.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        let descriptor = ParamDescriptor::new(name, 0.0, 1.0, if default { 1.0 } else { 0.0 })
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED));
        Self::new(ParamKind::Boolean, descriptor)
    }

    /// Gain parameter in decibels.
    pub fn decibel(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        let descriptor = ParamDescriptor::new(name, min, max, default).with_unit(ParamUnit::Decibels);
        Self::new(ParamKind::Float, descriptor)
    }

    /// Frequency parameter in Hz with logarithmic normalization.
    ///
    /// `min` must be positive for the logarithmic curve to be meaningful.
    pub fn frequency(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        let descriptor = ParamDescriptor::new(name, min, max, default)
            .with_unit(ParamUnit::Hertz)
            .with_scale(ParamScale::Logarithmic);
        Self::new(ParamKind::Float, descriptor)
    }

    /// String parameter holding `default` initially.
    pub fn text(name: impl Into<String>, default: &str) -> Self {
        let param = Self::new(ParamKind::Text, ParamDescriptor::new(name, 0.0, 1.0, 0.0));
        param.data.store(Arc::new(default.as_bytes().to_vec()));
        param
    }

    /// Opaque byte-buffer parameter, initially empty.
    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Blob, ParamDescriptor::new(name, 0.0, 1.0, 0.0))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Kind of value this parameter stores.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Range, unit and scale metadata.
    pub fn descriptor(&self) -> &ParamDescriptor {
        &self.descriptor
    }

    /// Whether data payloads (`set_data`) are accepted.
    pub fn supports_data(&self) -> bool {
        self.kind.supports_data()
    }

    /// Current plain value. Always `0.0` for text and blob parameters.
    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Current value mapped to \[0.0, 1.0\].
    #[inline]
    pub fn normalized(&self) -> f64 {
        self.descriptor.normalize(self.value())
    }

    /// Current value read as a switch (`value > 0.5`).
    #[inline]
    pub fn as_bool(&self) -> bool {
        self.value() > 0.5
    }

    /// Current byte buffer (empty for scalar kinds).
    pub fn data(&self) -> Arc<Vec<u8>> {
        self.data.load_full()
    }

    /// Current byte buffer decoded as UTF-8, replacing invalid sequences.
    pub fn text_value(&self) -> String {
        String::from_utf8_lossy(&self.data.load()).into_owned()
    }

    /// Human-readable value including the unit suffix.
    pub fn display_text(&self) -> String {
        let suffix = self.descriptor.unit.suffix();
        match self.kind {
            ParamKind::Float => format!("{:.2}{suffix}", self.value()),
            ParamKind::Integer => format!("{}{suffix}", self.value() as i64),
            ParamKind::Boolean => self.as_bool().to_string(),
            ParamKind::Text => self.text_value(),
            ParamKind::Blob => {
                if self.data.load().is_empty() {
                    "(Null)".to_string()
                } else {
                    "(Data)".to_string()
                }
            }
        }
    }

    /// Stores `payload` as the new value.
    ///
    /// Scalars are clamped to the descriptor range, rounded for integers and
    /// thresholded at 0.5 for booleans. Payloads the kind cannot hold, and
    /// empty buffers, are ignored.
    ///
    /// Returns the byte buffer displaced by a data payload so the caller can
    /// choose which thread releases it.
    pub fn apply(&self, payload: &Payload) -> Option<Arc<Vec<u8>>> {
        match (self.kind, payload) {
            (ParamKind::Text | ParamKind::Blob, Payload::Data(bytes)) => {
                if bytes.is_empty() {
                    return None;
                }
                Some(self.data.swap(Arc::clone(bytes)))
            }
            (ParamKind::Text | ParamKind::Blob, _) | (_, Payload::Data(_)) => None,
            (kind, Payload::Plain(value)) => {
                self.store(quantize(kind, &self.descriptor, *value));
                None
            }
            (kind, Payload::Normalized(normalized)) => {
                let plain = self.descriptor.denormalize(*normalized);
                self.store(quantize(kind, &self.descriptor, plain));
                None
            }
            (kind, Payload::Boolean(on)) => {
                let plain = if *on { 1.0 } else { 0.0 };
                self.store(quantize(kind, &self.descriptor, plain));
                None
            }
        }
    }

    #[inline]
    fn store(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Release);
    }

    // ── Observers ───────────────────────────────────────────────────────────

    /// Registers an observer. Registering the same handle twice delivers
    /// two callbacks per change.
    pub fn add_observer(&self, observer: ObserverRef) {
        self.observers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(Arc::clone(&observer));
            next
        });
    }

    /// Unregisters every registration of `observer` (by identity).
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_observer(&self, observer: &ObserverRef) -> bool {
        let previous = self.observers.rcu(|current| {
            current
                .iter()
                .filter(|o| !same_observer(o, observer))
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|o| same_observer(o, observer))
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.load().len()
    }

    /// Calls every observer of `priority` except `excluding`.
    ///
    /// Reads the observer list without locking, so it is safe on the
    /// real-time thread as long as the observers themselves are.
    pub fn notify_observers(&self, priority: Priority, excluding: Option<&ObserverRef>) {
        let observers = self.observers.load();
        for observer in observers.iter() {
            if observer.priority() != priority {
                continue;
            }
            if excluding.is_some_and(|sender| same_observer(sender, observer)) {
                continue;
            }
            observer.on_parameter_updated(self);
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.descriptor.name)
            .field("kind", &self.kind)
            .field("value", &self.value())
            .field("data_len", &self.data.load().len())
            .field("observers", &self.observer_count())
            .finish()
    }
}

fn quantize(kind: ParamKind, descriptor: &ParamDescriptor, value: f64) -> f64 {
    let clamped = descriptor.clamp(value);
    match kind {
        ParamKind::Integer => descriptor.clamp(clamped.round()),
        ParamKind::Boolean => {
            if clamped > 0.5 {
                1.0
            } else {
                0.0
            }
        }
        ParamKind::Float | ParamKind::Text | ParamKind::Blob => clamped,
    }
}
