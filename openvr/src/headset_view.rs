use crate::{
    entry,
    interface_table,
    InterfaceError,
    sys,
};

/// Read-only access to `IVRHeadsetView`. No state is cached; every query
/// goes to the runtime.
#[derive(Clone, Copy)]
pub struct HeadsetView {
    get_view_size: sys::HeadsetViewGetSizeFn,
    get_aspect_ratio: sys::HeadsetViewGetAspectRatioFn,
    get_mode: sys::HeadsetViewGetModeFn,
}

impl HeadsetView {
    pub fn get() -> Result<HeadsetView, InterfaceError> {
        const VERSION: &'static str = sys::IVRHeadsetView_Version;
        let t: &'static sys::VR_IVRHeadsetView_FnTable = interface_table(VERSION)?;
        Ok(HeadsetView {
            get_view_size: entry(t.GetHeadsetViewSize, VERSION, "GetHeadsetViewSize")?,
            get_aspect_ratio: entry(t.GetHeadsetViewAspectRatio, VERSION, "GetHeadsetViewAspectRatio")?,
            get_mode: entry(t.GetHeadsetViewMode, VERSION, "GetHeadsetViewMode")?,
        })
    }

    pub fn get_size(&self) -> HeadsetViewSize {
        let mut ret = HeadsetViewSize {
            width: 0,
            height: 0,
        };
        unsafe {
            (self.get_view_size)(&mut ret.width as *mut _, &mut ret.height as *mut _);
        }
        trace!("headset view size: ({}, {})", ret.width, ret.height);
        ret
    }

    pub fn get_aspect_ratio(&self) -> f32 {
        unsafe { (self.get_aspect_ratio)() }
    }

    pub fn get_mode(&self) -> sys::HeadsetViewMode_t {
        unsafe { (self.get_mode)() }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadsetViewSize {
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn stub_size(width: *mut u32, height: *mut u32) {
        *width = 2468;
        *height = 2740;
    }

    unsafe extern "C" fn stub_aspect_ratio() -> f32 {
        0.9
    }

    unsafe extern "C" fn stub_mode() -> sys::HeadsetViewMode_t {
        sys::HeadsetViewMode_t::HeadsetViewMode_Both
    }

    fn stub_view() -> HeadsetView {
        HeadsetView {
            get_view_size: stub_size,
            get_aspect_ratio: stub_aspect_ratio,
            get_mode: stub_mode,
        }
    }

    #[test]
    fn queries_read_fresh_values() {
        let view = stub_view();
        let size = view.get_size();
        assert_eq!(size, HeadsetViewSize { width: 2468, height: 2740 });
        assert_eq!(view.get_aspect_ratio(), 0.9);
        assert_eq!(view.get_mode(), sys::HeadsetViewMode_t::HeadsetViewMode_Both);
    }
}
