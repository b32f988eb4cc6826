//! Native interop glue for an OBS OpenVR capture plugin.
//!
//! The host plugin lives on the other side of a C ABI and owns both the OBS
//! lifecycle and the active GL context; this library only copies GL texture
//! data into host-readable buffers and forwards OpenVR compositor, overlay
//! and headset-view calls, passing SDK status codes through untranslated.

#[macro_use] extern crate log;
extern crate env_logger;
extern crate libc;
pub extern crate openvr;

pub use openvr::sys as openvr_sys;

mod logging;
pub mod gl;
pub mod copy;
pub mod capi;
