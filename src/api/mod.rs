//! API module for HTTP and WebSocket endpoints
//!
//! The WebSocket endpoint carries all tag mutations; REST is read-only.

pub mod http;
pub mod rest;
pub mod websocket;
