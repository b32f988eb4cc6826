//! Hand-maintained FFI surface for the OpenVR runtime.
//!
//! The runtime is consumed through its C API: the flat `VR_*Internal` entry
//! points exported by `libopenvr_api`, plus per-interface function tables
//! obtained with `VR_GetGenericInterface("FnTable:...")`. The library is
//! opened at first use with `libloading`, so nothing here links against the
//! SDK at build time.
//!
//! Naming follows `openvr_capi.h` so call sites read like the upstream API.

#![allow(non_camel_case_types, non_upper_case_globals, non_snake_case)]

#[macro_use] extern crate log;
extern crate libloading;
extern crate thiserror;

mod interfaces;

pub use interfaces::*;

use std::{
    ffi::CString,
    os::raw::{
        c_char,
        c_void,
    },
    sync::OnceLock,
};
use thiserror::Error;

pub type glUInt_t = u32;
pub type glSharedTextureHandle_t = *mut c_void;
pub type VROverlayHandle_t = u64;

pub const k_ulOverlayHandleInvalid: VROverlayHandle_t = 0;

pub const IVRCompositor_Version: &'static str = "IVRCompositor_026";
pub const IVROverlay_Version: &'static str = "IVROverlay_024";
pub const IVRHeadsetView_Version: &'static str = "IVRHeadsetView_001";

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EVRApplicationType {
    EVRApplicationType_VRApplication_Other = 0,
    EVRApplicationType_VRApplication_Scene = 1,
    EVRApplicationType_VRApplication_Overlay = 2,
    EVRApplicationType_VRApplication_Background = 3,
    EVRApplicationType_VRApplication_Utility = 4,
    EVRApplicationType_VRApplication_VRMonitor = 5,
    EVRApplicationType_VRApplication_SteamWatchdog = 6,
    EVRApplicationType_VRApplication_Bootstrapper = 7,
    EVRApplicationType_VRApplication_WebHelper = 8,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EVREye {
    EVREye_Eye_Left = 0,
    EVREye_Eye_Right = 1,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EVRInitError {
    EVRInitError_VRInitError_None = 0,
    EVRInitError_VRInitError_Unknown = 1,
    EVRInitError_VRInitError_Init_InstallationNotFound = 100,
    EVRInitError_VRInitError_Init_InstallationCorrupt = 101,
    EVRInitError_VRInitError_Init_VRClientDLLNotFound = 102,
    EVRInitError_VRInitError_Init_FileNotFound = 103,
    EVRInitError_VRInitError_Init_FactoryNotFound = 104,
    EVRInitError_VRInitError_Init_InterfaceNotFound = 105,
    EVRInitError_VRInitError_Init_InvalidInterface = 106,
    EVRInitError_VRInitError_Init_UserConfigDirectoryInvalid = 107,
    EVRInitError_VRInitError_Init_HmdNotFound = 108,
    EVRInitError_VRInitError_Init_NotInitialized = 109,
    EVRInitError_VRInitError_Init_PathRegistryNotFound = 110,
    EVRInitError_VRInitError_Init_NoConfigPath = 111,
    EVRInitError_VRInitError_Init_NoLogPath = 112,
    EVRInitError_VRInitError_Init_PathRegistryNotWritable = 113,
    EVRInitError_VRInitError_Init_AppInfoInitFailed = 114,
    EVRInitError_VRInitError_Init_Retry = 115,
    EVRInitError_VRInitError_Init_InitCanceledByUser = 116,
    EVRInitError_VRInitError_Init_AnotherAppLaunching = 117,
    EVRInitError_VRInitError_Init_SettingsInitFailed = 118,
    EVRInitError_VRInitError_Init_ShuttingDown = 119,
    EVRInitError_VRInitError_Init_TooManyObjects = 120,
    EVRInitError_VRInitError_Init_NoServerForBackgroundApp = 121,
    EVRInitError_VRInitError_Init_NotSupportedWithCompositor = 122,
    EVRInitError_VRInitError_Init_NotAvailableToUtilityApps = 123,
    EVRInitError_VRInitError_Init_Internal = 124,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EVRCompositorError {
    EVRCompositorError_VRCompositorError_None = 0,
    EVRCompositorError_VRCompositorError_RequestFailed = 1,
    EVRCompositorError_VRCompositorError_IncompatibleVersion = 100,
    EVRCompositorError_VRCompositorError_DoNotHaveFocus = 101,
    EVRCompositorError_VRCompositorError_InvalidTexture = 102,
    EVRCompositorError_VRCompositorError_IsNotSceneApplication = 103,
    EVRCompositorError_VRCompositorError_TextureIsOnWrongDevice = 104,
    EVRCompositorError_VRCompositorError_TextureUsesUnsupportedFormat = 105,
    EVRCompositorError_VRCompositorError_SharedTexturesNotSupported = 106,
    EVRCompositorError_VRCompositorError_IndexOutOfRange = 107,
    EVRCompositorError_VRCompositorError_AlreadySubmitted = 108,
    EVRCompositorError_VRCompositorError_InvalidBounds = 109,
    EVRCompositorError_VRCompositorError_AlreadySet = 110,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EVROverlayError {
    EVROverlayError_VROverlayError_None = 0,
    EVROverlayError_VROverlayError_UnknownOverlay = 10,
    EVROverlayError_VROverlayError_InvalidHandle = 11,
    EVROverlayError_VROverlayError_PermissionDenied = 12,
    EVROverlayError_VROverlayError_OverlayLimitExceeded = 13,
    EVROverlayError_VROverlayError_WrongVisibilityType = 14,
    EVROverlayError_VROverlayError_KeyTooLong = 15,
    EVROverlayError_VROverlayError_NameTooLong = 16,
    EVROverlayError_VROverlayError_KeyInUse = 17,
    EVROverlayError_VROverlayError_WrongTransformType = 18,
    EVROverlayError_VROverlayError_InvalidTrackedDevice = 19,
    EVROverlayError_VROverlayError_InvalidParameter = 20,
    EVROverlayError_VROverlayError_ThumbnailCantBeDestroyed = 21,
    EVROverlayError_VROverlayError_ArrayTooSmall = 22,
    EVROverlayError_VROverlayError_RequestFailed = 23,
    EVROverlayError_VROverlayError_InvalidTexture = 24,
    EVROverlayError_VROverlayError_UnableToLoadFile = 25,
    EVROverlayError_VROverlayError_KeyboardAlreadyInUse = 26,
    EVROverlayError_VROverlayError_NoNeighbor = 27,
    EVROverlayError_VROverlayError_TooManyMaskPrimitives = 29,
    EVROverlayError_VROverlayError_BadMaskPrimitive = 30,
    EVROverlayError_VROverlayError_TextureAlreadyLocked = 31,
    EVROverlayError_VROverlayError_TextureLockCapacityReached = 32,
    EVROverlayError_VROverlayError_TextureNotLocked = 33,
    EVROverlayError_VROverlayError_TimedOut = 34,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadsetViewMode_t {
    HeadsetViewMode_Left = 0,
    HeadsetViewMode_Right = 1,
    HeadsetViewMode_Both = 2,
}

type VRInitInternalFn = unsafe extern "C" fn(peError: *mut EVRInitError, eApplicationType: EVRApplicationType) -> u32;
type VRShutdownInternalFn = unsafe extern "C" fn();
type VRGetGenericInterfaceFn = unsafe extern "C" fn(pchInterfaceVersion: *const c_char, peError: *mut EVRInitError) -> isize;
type VRIsInterfaceVersionValidFn = unsafe extern "C" fn(pchInterfaceVersion: *const c_char) -> bool;

#[cfg(target_os = "linux")]
const RUNTIME_NAMES: &'static [&'static str] = &["libopenvr_api.so", "libopenvr_api.so.1"];
#[cfg(target_os = "macos")]
const RUNTIME_NAMES: &'static [&'static str] = &["libopenvr_api.dylib"];
#[cfg(target_os = "windows")]
const RUNTIME_NAMES: &'static [&'static str] = &["openvr_api.dll"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no OpenVR runtime library could be loaded (tried {0:?})")]
    NotFound(&'static [&'static str]),
    #[error("OpenVR runtime is missing `{0}`: {1}")]
    Symbol(&'static str, #[source] libloading::Error),
}

/// The OpenVR runtime library and its flat entry points.
///
/// The library stays open for the life of the process; function table
/// pointers handed out by [`Lib::interface_table`] are owned by the runtime
/// and remain valid until `VR_ShutdownInternal`.
pub struct Lib {
    init_internal: VRInitInternalFn,
    shutdown_internal: VRShutdownInternalFn,
    get_generic_interface: VRGetGenericInterfaceFn,
    is_interface_version_valid: VRIsInterfaceVersionValidFn,
    _library: libloading::Library,
}

static LIB: OnceLock<Result<Lib, LoadError>> = OnceLock::new();

impl Lib {
    /// Returns the process-wide runtime handle, loading it on first call.
    pub fn get() -> Result<&'static Lib, &'static LoadError> {
        LIB.get_or_init(Lib::load).as_ref()
    }

    fn load() -> Result<Lib, LoadError> {
        for name in RUNTIME_NAMES {
            match unsafe { libloading::Library::new(name) } {
                Ok(library) => {
                    debug!("loaded OpenVR runtime from {}", name);
                    return unsafe { Lib::from_library(library) };
                },
                Err(e) => debug!("could not load {}: {}", name, e),
            }
        }
        Err(LoadError::NotFound(RUNTIME_NAMES))
    }

    unsafe fn from_library(library: libloading::Library) -> Result<Lib, LoadError> {
        unsafe fn entry<T: Copy>(library: &libloading::Library, name: &'static str) -> Result<T, LoadError> {
            library.get::<T>(name.as_bytes())
                .map(|sym| *sym)
                .map_err(|e| LoadError::Symbol(name, e))
        }
        Ok(Lib {
            init_internal: entry(&library, "VR_InitInternal\0")?,
            shutdown_internal: entry(&library, "VR_ShutdownInternal\0")?,
            get_generic_interface: entry(&library, "VR_GetGenericInterface\0")?,
            is_interface_version_valid: entry(&library, "VR_IsInterfaceVersionValid\0")?,
            _library: library,
        })
    }

    pub unsafe fn init_internal(&self, e: *mut EVRInitError, application_type: EVRApplicationType) -> u32 {
        (self.init_internal)(e, application_type)
    }

    pub unsafe fn shutdown_internal(&self) {
        (self.shutdown_internal)()
    }

    /// Fetches the `FnTable:`-style function table for an interface version,
    /// e.g. [`IVRCompositor_Version`].
    pub unsafe fn interface_table<T>(&self, version: &str) -> Result<&'static T, EVRInitError> {
        use EVRInitError::*;
        let version_c = CString::new(version)
            .map_err(|_| EVRInitError_VRInitError_Init_InvalidInterface)?;
        if !(self.is_interface_version_valid)(version_c.as_ptr()) {
            return Err(EVRInitError_VRInitError_Init_InterfaceNotFound);
        }
        let table_name = CString::new(format!("FnTable:{}", version))
            .map_err(|_| EVRInitError_VRInitError_Init_InvalidInterface)?;
        let mut e = EVRInitError_VRInitError_None;
        let table = (self.get_generic_interface)(table_name.as_ptr(), &mut e);
        if e != EVRInitError_VRInitError_None {
            return Err(e);
        }
        (table as *const T).as_ref()
            .map(Ok)
            .unwrap_or(Err(EVRInitError_VRInitError_Init_InterfaceNotFound))
    }
}
