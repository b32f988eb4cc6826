//! Safe wrappers over the OpenVR runtime's C API.
//!
//! Interface access follows one pattern throughout: fetch the `FnTable` for
//! a pinned interface version once, null-check the entry points we forward
//! to, and keep them as plain function pointers in a small `Copy` capability
//! struct. Call sites never reach through process globals, which also makes
//! every wrapper testable against stub tables.

#[macro_use] extern crate log;
extern crate thiserror;
pub extern crate openvr_sys as sys;

pub mod error_ext;
pub mod compositor;
pub mod headset_view;
pub mod overlay;

use error_ext::ErrorCode;

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    OtherInitializer(bool),
    Initialized(bool),
}

impl InitResult {
    #[inline(always)]
    pub fn new(is_other: bool, value: bool) -> InitResult {
        use InitResult::*;
        if is_other {
            OtherInitializer(value)
        } else {
            Initialized(value)
        }
    }

    #[inline(always)]
    pub fn value(&self) -> bool {
        use InitResult::*;
        match *self {
            OtherInitializer(v) => v,
            Initialized(v) => v,
        }
    }

    #[inline(always)]
    pub fn is_other(&self) -> bool {
        if let &InitResult::OtherInitializer(_) = self {
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("OpenVR runtime library unavailable: {0}")]
    Load(&'static sys::LoadError),
    #[error("VR_InitInternal failed: {0:?}")]
    Init(sys::EVRInitError),
}

impl InitError {
    /// Collapses to the SDK error enum for callers that only speak
    /// `EVRInitError`. A missing runtime library reports as the SDK's own
    /// missing-client-DLL code.
    pub fn as_init_error(&self) -> sys::EVRInitError {
        match self {
            InitError::Load(_) => sys::EVRInitError::EVRInitError_VRInitError_Init_VRClientDLLNotFound,
            InitError::Init(e) => *e,
        }
    }
}

/// Failure to produce a capability struct for an interface.
#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("OpenVR runtime library unavailable: {0}")]
    Load(&'static sys::LoadError),
    #[error("requesting interface `{0}` failed: {1:?}")]
    Interface(&'static str, sys::EVRInitError),
    #[error("interface `{0}` is missing entry point `{1}`")]
    MissingEntry(&'static str, &'static str),
}

pub(crate) fn interface_table<T>(version: &'static str) -> Result<&'static T, InterfaceError> {
    let lib = sys::Lib::get().map_err(InterfaceError::Load)?;
    unsafe { lib.interface_table::<T>(version) }
        .map_err(|e| InterfaceError::Interface(version, e))
}

pub(crate) fn entry<T: Copy>(slot: Option<T>, interface: &'static str, name: &'static str) -> Result<T, InterfaceError> {
    slot.ok_or(InterfaceError::MissingEntry(interface, name))
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the openvr system, returning a result indicating that another
/// initialization already happened, or that we successfully initialized
pub fn init(application_type: sys::EVRApplicationType) -> Result<InitResult, InitError> {
    if INITIALIZED.fetch_or(true, Ordering::SeqCst) {
        warn!("OpenVR was already initialized?");
        return Ok(InitResult::new(true, true));
    }
    match init_runtime(application_type) {
        Ok(()) => Ok(InitResult::new(false, true)),
        Err(e) => {
            INITIALIZED.store(false, Ordering::SeqCst);
            Err(e)
        },
    }
}

fn init_runtime(application_type: sys::EVRApplicationType) -> Result<(), InitError> {
    let lib = sys::Lib::get().map_err(InitError::Load)?;
    let mut e = sys::EVRInitError::NONE;
    unsafe {
        lib.init_internal(&mut e as *mut sys::EVRInitError, application_type);
    }
    e.ok().map_err(InitError::Init)
}

/// Shuts down openvr, returning true if openvr was initialized, and shutdown
/// was actually called
pub fn shutdown() -> bool {
    if !INITIALIZED.fetch_and(false, Ordering::SeqCst) {
        return false;
    }
    match sys::Lib::get() {
        Ok(lib) => {
            unsafe { lib.shutdown_internal(); }
            true
        },
        // unreachable once init succeeded, but don't pretend we shut down
        Err(_) => false,
    }
}
