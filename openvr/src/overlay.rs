use crate::{
    entry,
    error_ext::ErrorCode,
    interface_table,
    InterfaceError,
    sys,
};

use std::{
    ffi::CStr,
    fmt::{
        self,
        Display,
    },
    os::raw::c_void,
};

// GetOverlayImageData always returns tightly packed RGBA8
const BYTES_PER_PIXEL: usize = 4;

/// The overlay entry points this layer forwards to, null-checked once at
/// fetch time.
#[derive(Clone, Copy)]
pub struct Overlay {
    find_overlay: sys::OverlayFindFn,
    get_image_data: sys::OverlayGetImageDataFn,
    is_visible: sys::OverlayIsVisibleFn,
}

impl Overlay {
    pub fn get() -> Result<Overlay, InterfaceError> {
        const VERSION: &'static str = sys::IVROverlay_Version;
        let t: &'static sys::VR_IVROverlay_FnTable = interface_table(VERSION)?;
        Ok(Overlay {
            find_overlay: entry(t.FindOverlay, VERSION, "FindOverlay")?,
            get_image_data: entry(t.GetOverlayImageData, VERSION, "GetOverlayImageData")?,
            is_visible: entry(t.IsOverlayVisible, VERSION, "IsOverlayVisible")?,
        })
    }

    pub fn find_overlay<K: AsRef<CStr>>(&self, k: K) -> Result<OverlayRef, sys::EVROverlayError> {
        let mut handle: sys::VROverlayHandle_t = sys::k_ulOverlayHandleInvalid;
        let e = unsafe {
            (self.find_overlay)(k.as_ref().as_ptr(), &mut handle as *mut _)
        };
        e.ok().map(move |_| OverlayRef::from(handle))
    }

    #[inline]
    pub fn is_overlay_visible(&self, handle: sys::VROverlayHandle_t) -> bool {
        unsafe { (self.is_visible)(handle) }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OverlayRef(sys::VROverlayHandle_t);

impl Display for OverlayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.handle())
    }
}

impl OverlayRef {
    #[inline(always)]
    pub fn handle(&self) -> sys::VROverlayHandle_t {
        self.0
    }
}

impl From<sys::VROverlayHandle_t> for OverlayRef {
    #[inline]
    fn from(handle: sys::VROverlayHandle_t) -> Self {
        OverlayRef(handle)
    }
}

/// CPU-side copy of an overlay's image, refilled in place.
///
/// The buffer starts empty and grows when the compositor reports it
/// undersized; it is owned by the image and invalidated by the next
/// [`fill`](OverlayImage::fill).
pub struct OverlayImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl OverlayImage {
    pub fn new() -> OverlayImage {
        OverlayImage {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    #[inline]
    fn required_size(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Fetches the overlay's image into the owned buffer.
    ///
    /// `GetOverlayImageData` reports the overlay's dimensions even when the
    /// buffer was too small, so an `ArrayTooSmall` answer is retried exactly
    /// once after growing the buffer. Every other status is surfaced
    /// unchanged.
    pub fn fill(&mut self, overlay: &Overlay, handle: sys::VROverlayHandle_t) -> Result<(), sys::EVROverlayError> {
        let mut status = unsafe { self.request(overlay, handle) };
        if status == sys::EVROverlayError::EVROverlayError_VROverlayError_ArrayTooSmall {
            debug!("growing buffer for overlay handle {:x} to {}x{}", handle, self.width, self.height);
            self.data.resize(self.required_size(), 0);
            status = unsafe { self.request(overlay, handle) };
        }
        status.ok()
    }

    unsafe fn request(&mut self, overlay: &Overlay, handle: sys::VROverlayHandle_t) -> sys::EVROverlayError {
        (overlay.get_image_data)(
            handle,
            self.data.as_mut_ptr() as *mut c_void,
            self.data.len() as u32,
            &mut self.width as *mut _,
            &mut self.height as *mut _,
        )
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data<'a>(&'a self) -> &'a [u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };
    use crate::sys::EVROverlayError::*;

    unsafe extern "C" fn stub_find(_key: *const std::os::raw::c_char, handle: *mut sys::VROverlayHandle_t) -> sys::EVROverlayError {
        *handle = 42;
        EVROverlayError_VROverlayError_None
    }

    unsafe extern "C" fn stub_visible(handle: sys::VROverlayHandle_t) -> bool {
        handle == 42
    }

    fn overlay_with_image_data(get_image_data: sys::OverlayGetImageDataFn) -> Overlay {
        Overlay {
            find_overlay: stub_find,
            get_image_data: get_image_data,
            is_visible: stub_visible,
        }
    }

    #[test]
    fn overlay_image_starts_with_empty_data() {
        let image = OverlayImage::new();
        assert_eq!(image.data().len(), 0);
        assert_eq!(image.dimensions(), (0, 0));
    }

    static GROWING_CALLS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn image_data_4x2(_handle: sys::VROverlayHandle_t, buffer: *mut c_void, size: u32, width: *mut u32, height: *mut u32) -> sys::EVROverlayError {
        GROWING_CALLS.fetch_add(1, Ordering::SeqCst);
        *width = 4;
        *height = 2;
        if (size as usize) < 4 * 2 * BYTES_PER_PIXEL {
            return EVROverlayError_VROverlayError_ArrayTooSmall;
        }
        std::ptr::write_bytes(buffer as *mut u8, 0x5a, 4 * 2 * BYTES_PER_PIXEL);
        EVROverlayError_VROverlayError_None
    }

    #[test]
    fn fill_grows_and_retries_exactly_once() {
        let overlay = overlay_with_image_data(image_data_4x2);
        let mut image = OverlayImage::new();
        GROWING_CALLS.store(0, Ordering::SeqCst);
        image.fill(&overlay, 42).unwrap();
        assert_eq!(GROWING_CALLS.load(Ordering::SeqCst), 2);
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.data().len(), 4 * 2 * BYTES_PER_PIXEL);
        assert!(image.data().iter().all(|&b| b == 0x5a));
        // buffer is already big enough now, so no second round trip
        image.fill(&overlay, 42).unwrap();
        assert_eq!(GROWING_CALLS.load(Ordering::SeqCst), 3);
    }

    static FAILING_CALLS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn image_data_unknown_overlay(_handle: sys::VROverlayHandle_t, _buffer: *mut c_void, _size: u32, _width: *mut u32, _height: *mut u32) -> sys::EVROverlayError {
        FAILING_CALLS.fetch_add(1, Ordering::SeqCst);
        EVROverlayError_VROverlayError_UnknownOverlay
    }

    #[test]
    fn fill_surfaces_other_errors_without_retry() {
        let overlay = overlay_with_image_data(image_data_unknown_overlay);
        let mut image = OverlayImage::new();
        FAILING_CALLS.store(0, Ordering::SeqCst);
        let e = image.fill(&overlay, 9).unwrap_err();
        assert_eq!(e, EVROverlayError_VROverlayError_UnknownOverlay);
        assert_eq!(FAILING_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(image.data().len(), 0);
    }

    #[test]
    fn find_overlay_returns_handle() {
        let overlay = overlay_with_image_data(image_data_4x2);
        let key = std::ffi::CString::new("test.overlay").unwrap();
        let overlay_ref = overlay.find_overlay(&key).unwrap();
        assert_eq!(overlay_ref.handle(), 42);
        assert!(overlay.is_overlay_visible(overlay_ref.handle()));
        assert!(!overlay.is_overlay_visible(7));
    }
}
