//! Thread-safe wrappers for `bool`, `i64`, `String` and `String` to `String` map values.
//!
//! # Overview
//! Each wrapper owns its value together with a reader/writer lock. Readers share
//! the lock, writers take it exclusively, and every operation, including the
//! read-modify-write ones, is atomic with respect to the other operations on the
//! same wrapper.
//!
//! # Features
//! - `get`/`set` plus atomic `set_func` updates on every wrapper
//! - Arithmetic and concatenation helpers, with `*_r` variants that return the
//!   new value from the same lock acquisition
//! - Snapshot-based `range` on [`SafeStringMap`], safe to re-enter from the callback
//! - Lock-free `*_unsync` variants on `&mut self` for setting things up before
//!   a wrapper is shared
//! - No poisoning, the lock is released normally on panic
//! - Optional `serde` support behind the `serde` feature
//!
//! # Examples
//! ```
//! use safecell::{SafeInt, SafeStringMap};
//! use std::sync::Arc;
//!
//! let counter = Arc::new(SafeInt::default());
//! let map = Arc::new(SafeStringMap::new());
//!
//! let threads = ["foo", "zoo", "bar"]
//!     .into_iter()
//!     .map(|k| {
//!         let counter = counter.clone();
//!         let map = map.clone();
//!         std::thread::spawn(move || {
//!             map.set(k, format!("{k} world"));
//!             counter.add(1);
//!         })
//!     })
//!     .collect::<Vec<_>>();
//! threads.into_iter().for_each(|t| t.join().unwrap());
//!
//! assert_eq!(counter.get(), 3);
//! map.range(|k, v| assert_eq!(v, format!("{k} world")));
//! ```
mod boolean;
mod cell;
mod integer;
#[doc = include_str!("../README.md")]
mod map_string;
mod rwlock;
#[cfg(feature = "serde")]
mod serde_impl;
mod string;

pub use boolean::*;
pub use cell::*;
pub use integer::*;
pub use map_string::*;
pub use rwlock::*;
pub use string::*;
