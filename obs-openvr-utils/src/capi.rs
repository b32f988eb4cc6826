//! The C ABI the OBS plugin links against.
//!
//! Pointers crossing this boundary follow one convention: `_create` hands the
//! caller an owned opaque pointer, `_destroy` takes it back, and every other
//! entry point tolerates NULL by returning the type's empty value or an
//! `InvalidParameter`-class status. SDK status codes pass through unchanged;
//! failures to reach the runtime at all map onto the closest SDK code.

use libc::{
    c_char,
    size_t,
};
use std::{
    ffi::{
        CStr,
        CString,
    },
    ptr,
    sync::OnceLock,
};

use crate::{
    copy::{
        CopyContext,
        TextureFormat,
        TextureSize,
    },
    gl::{
        self,
        GLenum,
        GLuint,
        GlFns,
        GlLoadError,
    },
    logging,
};
use openvr::{
    compositor::Compositor,
    headset_view::{
        HeadsetView,
        HeadsetViewSize,
    },
    overlay::{
        Overlay,
        OverlayImage,
    },
    sys,
};

use std::os::raw::c_void;

pub type GlGetProcAddressFn = unsafe extern "C" fn(symbol: *const c_char) -> *const c_void;

/// Borrowed view into a context-owned byte buffer, invalidated by the next
/// copy into (or destruction of) the owning object.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BufferData {
    pub size: size_t,
    pub data: *const u8,
}

impl BufferData {
    const fn empty() -> BufferData {
        BufferData {
            size: 0,
            data: ptr::null(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OverlayImageData {
    pub width: u32,
    pub height: u32,
    pub data: *const u8,
    pub length: size_t,
}

fn load_gl(get_proc_address: GlGetProcAddressFn) -> Result<GlFns, GlLoadError> {
    GlFns::load(|name| match CString::new(name) {
        Ok(name) => unsafe { get_proc_address(name.as_ptr()) },
        Err(_) => ptr::null(),
    })
}

fn compositor() -> Option<Compositor> {
    match Compositor::get() {
        Ok(compositor) => Some(compositor),
        Err(e) => {
            error!("IVRCompositor unavailable: {}", e);
            None
        },
    }
}

fn overlay() -> Option<Overlay> {
    match Overlay::get() {
        Ok(overlay) => Some(overlay),
        Err(e) => {
            error!("IVROverlay unavailable: {}", e);
            None
        },
    }
}

/// Initializes logging. Safe to call more than once.
#[no_mangle]
pub extern "C" fn obs_openvr_utils_init() {
    logging::init();
}

/// Creates a copy context for `texture`, resolving GL through the caller's
/// loader. Returns NULL if the loader is missing or incomplete; the caller
/// owns the result and must pass it to `obs_openvr_copy_context_destroy`.
#[no_mangle]
pub extern "C" fn obs_openvr_copy_context_create(texture: GLuint, get_proc_address: Option<GlGetProcAddressFn>) -> *mut CopyContext {
    let get_proc_address = match get_proc_address {
        Some(f) => f,
        None => {
            error!("obs_openvr_copy_context_create called without a GL loader");
            return ptr::null_mut();
        },
    };
    match load_gl(get_proc_address) {
        Ok(fns) => Box::into_raw(Box::new(CopyContext::new(texture, fns))),
        Err(e) => {
            error!("failed to resolve GL entry points: {}", e);
            ptr::null_mut()
        },
    }
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_context_destroy(ctx: *mut CopyContext) {
    if ctx.is_null() {
        return;
    }
    trace!("destroying {:?}", &*ctx);
    drop(Box::from_raw(ctx));
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_context_ensure_size(ctx: *mut CopyContext, width: u32, height: u32, format: GLenum) {
    let ctx = match ctx.as_mut() {
        Some(ctx) => ctx,
        None => return,
    };
    match TextureFormat::from_raw(format) {
        Some(format) => {
            ctx.ensure_size(width, height, format);
        },
        None => warn!("ensure_size ignoring unknown texture format: {:#x}", format),
    }
}

/// Copies the context's texture into its owned buffer, growing the buffer
/// first if needed. Returns `GL_NO_ERROR` on success, `GL_INVALID_ENUM` for
/// an unsupported format, or the first failing GL call's error.
#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_texture(ctx: *mut CopyContext, width: u32, height: u32, format: GLenum) -> GLenum {
    let ctx = match ctx.as_mut() {
        Some(ctx) => ctx,
        None => return gl::INVALID_VALUE,
    };
    let format = match TextureFormat::from_raw(format) {
        Some(format) => format,
        None => return gl::INVALID_ENUM,
    };
    match ctx.copy_texture(width, height, format) {
        Ok(()) => gl::NO_ERROR,
        Err(e) => e,
    }
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_context_get_texture_size(ctx: *const CopyContext) -> TextureSize {
    ctx.as_ref()
        .map(|ctx| ctx.get_size())
        .unwrap_or(TextureSize::empty())
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_context_get_buffer(ctx: *const CopyContext) -> BufferData {
    ctx.as_ref()
        .map(|ctx| {
            let buffer = ctx.image_buffer();
            BufferData {
                size: buffer.len() as size_t,
                data: buffer.as_ptr(),
            }
        })
        .unwrap_or(BufferData::empty())
}

/// Bytes per pixel of a supported readback format, or 0 if unsupported.
#[no_mangle]
pub extern "C" fn obs_openvr_bytes_per_pixel(format: GLenum) -> u8 {
    TextureFormat::from_raw(format)
        .map(|f| f.bytes_per_pixel())
        .unwrap_or(0)
}

/// One-shot texture size query for callers without a copy context.
#[no_mangle]
pub unsafe extern "C" fn obs_openvr_get_gl_texture_size(texture: GLuint, get_proc_address: Option<GlGetProcAddressFn>, size: *mut TextureSize) -> bool {
    let size = match size.as_mut() {
        Some(size) => size,
        None => return false,
    };
    let fns = match get_proc_address.map(load_gl) {
        Some(Ok(fns)) => fns,
        _ => return false,
    };
    *size = crate::copy::get_gl_texture_size(&fns, texture);
    true
}

/// One-shot readback into a caller-owned buffer, which must fit the
/// texture's full level-0 contents in `format`.
#[no_mangle]
pub unsafe extern "C" fn obs_openvr_copy_gl_texture(texture: GLuint, format: GLenum, get_proc_address: Option<GlGetProcAddressFn>, img: *mut u8) -> GLenum {
    if img.is_null() {
        return gl::INVALID_VALUE;
    }
    let fns = match get_proc_address.map(load_gl) {
        Some(Ok(fns)) => fns,
        _ => return gl::INVALID_OPERATION,
    };
    match crate::copy::copy_gl_texture(&fns, texture, format, img) {
        Ok(()) => gl::NO_ERROR,
        Err(e) => e,
    }
}

/// Initializes the OpenVR runtime. On failure the SDK error is written
/// through `e` (when non-NULL) and false is returned. An already-initialized
/// runtime counts as success.
#[no_mangle]
pub unsafe extern "C" fn obs_openvr_init_openvr(e: *mut sys::EVRInitError, application_type: sys::EVRApplicationType) -> bool {
    match openvr::init(application_type) {
        Ok(result) => {
            if let Some(e) = e.as_mut() {
                *e = sys::EVRInitError::EVRInitError_VRInitError_None;
            }
            result.value()
        },
        Err(err) => {
            error!("OpenVR initialization failed: {}", err);
            if let Some(e) = e.as_mut() {
                *e = err.as_init_error();
            }
            false
        },
    }
}

/// Shuts the runtime down, returning true if this call actually did so.
#[no_mangle]
pub extern "C" fn obs_openvr_shutdown_openvr() -> bool {
    openvr::shutdown()
}

/// Requests the compositor's shared GL mirror texture for `eye`, writing the
/// texture id and shared handle through the out pointers. Ownership of the
/// handle moves to the caller, who releases it with
/// `obs_openvr_vrcompositor_releasesharedgltexture`.
#[no_mangle]
pub unsafe extern "C" fn obs_openvr_vrcompositor_getmirrortexturegl(eye: sys::EVREye, id: *mut sys::glUInt_t, handle: *mut sys::glSharedTextureHandle_t) -> sys::EVRCompositorError {
    use sys::EVRCompositorError::*;
    let (id, handle) = match (id.as_mut(), handle.as_mut()) {
        (Some(id), Some(handle)) => (id, handle),
        _ => return EVRCompositorError_VRCompositorError_RequestFailed,
    };
    let compositor = match compositor() {
        Some(compositor) => compositor,
        None => return EVRCompositorError_VRCompositorError_RequestFailed,
    };
    match compositor.get_mirror_texture_gl(eye) {
        Ok(info) => {
            let (raw_id, raw_handle) = info.into_raw();
            *id = raw_id;
            *handle = raw_handle;
            EVRCompositorError_VRCompositorError_None
        },
        Err(e) => e,
    }
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_vrcompositor_releasesharedgltexture(id: sys::glUInt_t, handle: sys::glSharedTextureHandle_t) -> bool {
    match compositor() {
        Some(compositor) => compositor.release_shared_gl_texture(id, handle),
        None => false,
    }
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_vrcompositor_locksharedgltexture(handle: sys::glSharedTextureHandle_t) {
    if let Some(compositor) = compositor() {
        compositor.lock_shared_gl_texture(handle);
    }
}

#[no_mangle]
pub unsafe extern "C" fn obs_openvr_vrcompositor_unlocksharedgltexture(handle: sys::glSharedTextureHandle_t) {
    if let Some(compositor) = compositor() {
        compositor.unlock_shared_gl_texture(handle);
    }
}

static HEADSET_VIEW: OnceLock<Option<HeadsetView>> = OnceLock::new();

/// Fetches `IVRHeadsetView`, caching the capability struct for the life of
/// the process. Returns NULL when the interface is unavailable; the pointer
/// is library-owned and must not be freed.
#[no_mangle]
pub extern "C" fn openvr_utils_get_headset_view() -> *const HeadsetView {
    let view = HEADSET_VIEW.get_or_init(|| match HeadsetView::get() {
        Ok(view) => Some(view),
        Err(e) => {
            error!("IVRHeadsetView unavailable: {}", e);
            None
        },
    });
    view.as_ref()
        .map(|view| view as *const HeadsetView)
        .unwrap_or(ptr::null())
}

#[no_mangle]
pub unsafe extern "C" fn openvr_utils_headset_view_get_size(view: *const HeadsetView) -> HeadsetViewSize {
    view.as_ref()
        .map(|view| view.get_size())
        .unwrap_or(HeadsetViewSize {
            width: 0,
            height: 0,
        })
}

#[no_mangle]
pub unsafe extern "C" fn openvr_utils_headset_view_get_aspect_ratio(view: *const HeadsetView) -> f32 {
    view.as_ref()
        .map(|view| view.get_aspect_ratio())
        .unwrap_or(0.0)
}

#[no_mangle]
pub unsafe extern "C" fn openvr_utils_headset_view_get_mode(view: *const HeadsetView) -> sys::HeadsetViewMode_t {
    view.as_ref()
        .map(|view| view.get_mode())
        .unwrap_or(sys::HeadsetViewMode_t::HeadsetViewMode_Left)
}

/// Creates an empty overlay image buffer. The caller owns the result and
/// must pass it to `openvrs_overlay_image_destroy`.
#[no_mangle]
pub extern "C" fn openvrs_overlay_image_create() -> *mut OverlayImage {
    Box::into_raw(Box::new(OverlayImage::new()))
}

#[no_mangle]
pub unsafe extern "C" fn openvrs_overlay_image_destroy(image: *mut OverlayImage) {
    if image.is_null() {
        return;
    }
    drop(Box::from_raw(image));
}

/// Refreshes `image` with the current contents of the overlay identified by
/// `handle`, growing the owned buffer as needed.
#[no_mangle]
pub unsafe extern "C" fn openvrs_overlay_image_fill(image: *mut OverlayImage, handle: sys::VROverlayHandle_t) -> sys::EVROverlayError {
    use sys::EVROverlayError::*;
    let image = match image.as_mut() {
        Some(image) => image,
        None => return EVROverlayError_VROverlayError_InvalidParameter,
    };
    let overlay = match overlay() {
        Some(overlay) => overlay,
        None => return EVROverlayError_VROverlayError_RequestFailed,
    };
    match image.fill(&overlay, handle) {
        Ok(()) => EVROverlayError_VROverlayError_None,
        Err(e) => e,
    }
}

#[no_mangle]
pub unsafe extern "C" fn openvrs_overlay_image_get_data(image: *const OverlayImage) -> OverlayImageData {
    image.as_ref()
        .map(|image| {
            let (width, height) = image.dimensions();
            OverlayImageData {
                width: width,
                height: height,
                data: image.data().as_ptr(),
                length: image.data().len() as size_t,
            }
        })
        .unwrap_or(OverlayImageData {
            width: 0,
            height: 0,
            data: ptr::null(),
            length: 0,
        })
}

#[no_mangle]
pub extern "C" fn openvrs_is_overlay_visible(handle: sys::VROverlayHandle_t) -> bool {
    overlay()
        .map(|overlay| overlay.is_overlay_visible(handle))
        .unwrap_or(false)
}

/// Looks an overlay up by key, writing its handle on success.
#[no_mangle]
pub unsafe extern "C" fn openvr_utils_find_overlay(key: *const c_char, handle: *mut sys::VROverlayHandle_t) -> sys::EVROverlayError {
    use sys::EVROverlayError::*;
    if key.is_null() || handle.is_null() {
        return EVROverlayError_VROverlayError_InvalidParameter;
    }
    let overlay = match overlay() {
        Some(overlay) => overlay,
        None => return EVROverlayError_VROverlayError_RequestFailed,
    };
    match overlay.find_overlay(CStr::from_ptr(key)) {
        Ok(overlay_ref) => {
            *handle = overlay_ref.handle();
            EVROverlayError_VROverlayError_None
        },
        Err(e) => e,
    }
}
