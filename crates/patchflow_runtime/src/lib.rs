// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control loop tying the Patchflow graph to the media layer.
//!
//! The runtime owns one [`Graph`](patchflow_graph::Graph), one kind
//! catalog, and one media context, applies every edit from a single
//! logical thread, and steps media ingest and refresh policies through
//! [`Runtime::tick`].

pub mod clock;
pub mod runtime;
pub mod services;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runtime::{Runtime, RuntimeError};
pub use services::MediaContext;
