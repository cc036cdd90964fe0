//! Backdrop daemon internals.
//!
//! A looping background video with a handful of controls: mute, volume,
//! overlay opacity, video selection and timed rotation. The [`page::Page`]
//! task owns all of it; the IPC server forwards control requests to it.

pub mod assets;
pub mod audio;
pub mod config;
pub mod context;
pub mod controls;
pub mod ipc_server;
mod macros;
pub mod opacity;
pub mod page;
pub mod playback;
pub mod preferences;
pub mod rotation;
pub mod video;
