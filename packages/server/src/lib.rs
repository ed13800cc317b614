//! Signaling and collaboration relay for live coding interviews.
//!
//! This library coordinates a live interview session between a recruiter and
//! a candidate: WebRTC offer/answer/ICE relaying (camera and screen-share
//! links), per-question collaborative code state, and room-scoped chat with
//! full-history replay. All state lives in process memory for the lifetime
//! of a room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
