//! A thin client binding for the WeCom (WeChat Work) HTTP API.
//!
//! The client authenticates an application, snapshots the organisational
//! structure, sends the eight supported message kinds and uploads media
//! assets. Every operation is a single authenticated HTTP call answering
//! with a shared `errcode`/`errmsg` JSON envelope; see [api::WorkClient].

pub mod api;
pub mod auth;
mod de;
pub mod directory;
pub mod error;
pub mod media;
pub mod menu;
pub mod message;
