//! Session and game relay server.
//!
//! Binds transient WebSocket connections to durable player sessions, tracks
//! which game each session has joined, and fans state updates out to every
//! member of a game.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
