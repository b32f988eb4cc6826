use crate::sys;

/// Status enums from the SDK all carry a dedicated "none" value. This maps
/// them onto `Result` without translating the codes themselves.
pub trait ErrorCode: PartialEq + Sized {
    const NONE: Self;

    #[inline]
    fn is_error(&self) -> bool {
        *self != Self::NONE
    }

    fn ok(self) -> Result<(), Self> {
        if self.is_error() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl ErrorCode for sys::EVRInitError {
    const NONE: Self = sys::EVRInitError::EVRInitError_VRInitError_None;
}

impl ErrorCode for sys::EVRCompositorError {
    const NONE: Self = sys::EVRCompositorError::EVRCompositorError_VRCompositorError_None;
}

impl ErrorCode for sys::EVROverlayError {
    const NONE: Self = sys::EVROverlayError::EVROverlayError_VROverlayError_None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_maps_to_ok() {
        assert_eq!(sys::EVROverlayError::NONE.ok(), Ok(()));
        assert!(!sys::EVRCompositorError::NONE.is_error());
    }

    #[test]
    fn errors_pass_through_unchanged() {
        let e = sys::EVROverlayError::EVROverlayError_VROverlayError_ArrayTooSmall;
        assert_eq!(e.ok(), Err(e));
    }
}
