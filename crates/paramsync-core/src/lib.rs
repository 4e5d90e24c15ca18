//! Paramsync Core - named, typed parameters shared across threads
//!
//! This crate provides the parameter layer that the dispatch crate
//! (`paramsync-dispatch`) schedules changes against. It has no threads of
//! its own; every type here is safe to share, and all value storage is
//! lock-free so the real-time thread can read and apply without blocking.
//!
//! # Core Abstractions
//!
//! - [`ParamDescriptor`] - Range, unit and normalization curve
//! - [`Parameter`] - Atomic value storage plus observer list
//! - [`Payload`] - Tagged new value carried by a scheduled change
//! - [`ParameterObserver`] / [`Priority`] - Change callbacks per thread class
//! - [`ParameterSet`] / [`Target`] - Name- and index-addressable collection
//!
//! # Example
//!
//! ```rust
//! use paramsync_core::{Parameter, ParameterSet, Payload};
//!
//! let mut set = ParameterSet::new();
//! let cutoff = set.add(Parameter::frequency("Cutoff", 20.0, 20000.0, 1000.0)).unwrap();
//!
//! cutoff.apply(&Payload::Plain(440.0));
//! assert_eq!(set.get("cutoff").unwrap().value(), 440.0);
//! ```

pub mod error;
pub mod observer;
pub mod param_info;
pub mod parameter;
pub mod set;
pub mod value;

pub use error::ParamError;
pub use observer::{ObserverRef, ParameterObserver, Priority, same_observer};
pub use param_info::{ParamDescriptor, ParamFlags, ParamScale, ParamUnit, lookup_key};
pub use parameter::{ParamKind, Parameter};
pub use set::{ParameterLookup, ParameterSet, Target};
pub use value::Payload;
