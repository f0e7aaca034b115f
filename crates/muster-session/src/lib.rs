//! User-to-connection binding for Muster.
//!
//! This crate answers one question: "which live connection do I use to
//! reach user X right now?" The [`ConnectionRegistry`] holds the answer
//! as a map from [`UserId`] to the connection's outbound
//! [`FrameSender`](muster_transport::FrameSender).
//!
//! # How it fits in the stack
//!
//! ```text
//! Coordinator (above)   ← broadcasts look recipients up here
//!     ↕
//! Session Layer (this crate)   ← identity → live connection
//!     ↕
//! Transport Layer (below)   ← provides FrameSender, ConnectionId
//! ```
//!
//! Identity itself is taken on trust: whoever hands a `UserId` to a
//! client has already validated it. There is no authentication here and
//! no reconnection token either; a user who reconnects simply registers
//! again, superseding the old binding.

mod registry;

pub use registry::ConnectionRegistry;

pub use muster_protocol::UserId;
