//! Reduced `VR_IVR*_FnTable` layouts.
//!
//! Slot order follows `openvr_capi.h` for the pinned interface versions.
//! Only the entry points this workspace actually calls carry real
//! signatures; every other slot is kept as an opaque pointer so the offsets
//! of the typed entries stay correct. Touching an opaque slot means giving
//! it a signature here first.

use std::os::raw::{
    c_char,
    c_void,
};
use crate::{
    glSharedTextureHandle_t,
    glUInt_t,
    EVRCompositorError,
    EVREye,
    EVROverlayError,
    HeadsetViewMode_t,
    VROverlayHandle_t,
};

pub type CompositorGetMirrorTextureGlFn = unsafe extern "C" fn(eEye: EVREye, pglTextureId: *mut glUInt_t, pglSharedTextureHandle: *mut glSharedTextureHandle_t) -> EVRCompositorError;
pub type CompositorReleaseSharedGlTextureFn = unsafe extern "C" fn(glTextureId: glUInt_t, glSharedTextureHandle: glSharedTextureHandle_t) -> bool;
pub type CompositorLockSharedGlTextureFn = unsafe extern "C" fn(glSharedTextureHandle: glSharedTextureHandle_t);
pub type CompositorUnlockSharedGlTextureFn = unsafe extern "C" fn(glSharedTextureHandle: glSharedTextureHandle_t);

pub type OverlayFindFn = unsafe extern "C" fn(pchOverlayKey: *const c_char, pOverlayHandle: *mut VROverlayHandle_t) -> EVROverlayError;
pub type OverlayGetImageDataFn = unsafe extern "C" fn(ulOverlayHandle: VROverlayHandle_t, pvBuffer: *mut c_void, unBufferSize: u32, punWidth: *mut u32, punHeight: *mut u32) -> EVROverlayError;
pub type OverlayIsVisibleFn = unsafe extern "C" fn(ulOverlayHandle: VROverlayHandle_t) -> bool;

pub type HeadsetViewSetSizeFn = unsafe extern "C" fn(nWidth: u32, nHeight: u32);
pub type HeadsetViewGetSizeFn = unsafe extern "C" fn(pnWidth: *mut u32, pnHeight: *mut u32);
pub type HeadsetViewSetModeFn = unsafe extern "C" fn(eHeadsetViewMode: HeadsetViewMode_t);
pub type HeadsetViewGetModeFn = unsafe extern "C" fn() -> HeadsetViewMode_t;
pub type HeadsetViewSetCroppedFn = unsafe extern "C" fn(bCropped: bool);
pub type HeadsetViewGetCroppedFn = unsafe extern "C" fn() -> bool;
pub type HeadsetViewGetAspectRatioFn = unsafe extern "C" fn() -> f32;
pub type HeadsetViewSetBlendRangeFn = unsafe extern "C" fn(flStartPct: f32, flEndPct: f32);
pub type HeadsetViewGetBlendRangeFn = unsafe extern "C" fn(pflStartPct: *mut f32, pflEndPct: *mut f32);

#[repr(C)]
pub struct VR_IVRCompositor_FnTable {
    pub SetTrackingSpace: *const c_void,
    pub GetTrackingSpace: *const c_void,
    pub WaitGetPoses: *const c_void,
    pub GetLastPoses: *const c_void,
    pub GetLastPoseForTrackedDeviceIndex: *const c_void,
    pub Submit: *const c_void,
    pub ClearLastSubmittedFrame: *const c_void,
    pub PostPresentHandoff: *const c_void,
    pub GetFrameTiming: *const c_void,
    pub GetFrameTimings: *const c_void,
    pub GetFrameTimeRemaining: *const c_void,
    pub GetCumulativeStats: *const c_void,
    pub FadeToColor: *const c_void,
    pub GetCurrentFadeColor: *const c_void,
    pub FadeGrid: *const c_void,
    pub GetCurrentGridAlpha: *const c_void,
    pub SetSkyboxOverride: *const c_void,
    pub ClearSkyboxOverride: *const c_void,
    pub CompositorBringToFront: *const c_void,
    pub CompositorGoToBack: *const c_void,
    pub CompositorQuit: *const c_void,
    pub IsFullscreen: *const c_void,
    pub GetCurrentSceneFocusProcess: *const c_void,
    pub GetLastFrameRenderer: *const c_void,
    pub CanRenderScene: *const c_void,
    pub ShowMirrorWindow: *const c_void,
    pub HideMirrorWindow: *const c_void,
    pub IsMirrorWindowVisible: *const c_void,
    pub CompositorDumpImages: *const c_void,
    pub ShouldAppRenderWithLowResources: *const c_void,
    pub ForceInterleavedReprojectionOn: *const c_void,
    pub ForceReconnectProcess: *const c_void,
    pub SuspendRendering: *const c_void,
    pub GetMirrorTextureD3D11: *const c_void,
    pub ReleaseMirrorTextureD3D11: *const c_void,
    pub GetMirrorTextureGL: Option<CompositorGetMirrorTextureGlFn>,
    pub ReleaseSharedGLTexture: Option<CompositorReleaseSharedGlTextureFn>,
    pub LockGLSharedTextureForAccess: Option<CompositorLockSharedGlTextureFn>,
    pub UnlockGLSharedTextureForAccess: Option<CompositorUnlockSharedGlTextureFn>,
    pub GetVulkanInstanceExtensionsRequired: *const c_void,
    pub GetVulkanDeviceExtensionsRequired: *const c_void,
    pub SetExplicitTimingMode: *const c_void,
    pub SubmitExplicitTimingData: *const c_void,
    pub IsMotionSmoothingEnabled: *const c_void,
    pub IsMotionSmoothingSupported: *const c_void,
    pub IsCurrentSceneFocusAppLoading: *const c_void,
    pub SetStageOverride_Async: *const c_void,
    pub ClearStageOverride: *const c_void,
    pub GetCompositorBenchmarkResults: *const c_void,
    pub GetLastPosePredictionIDs: *const c_void,
    pub GetPosesForFrame: *const c_void,
}

#[repr(C)]
pub struct VR_IVROverlay_FnTable {
    pub FindOverlay: Option<OverlayFindFn>,
    pub CreateOverlay: *const c_void,
    pub DestroyOverlay: *const c_void,
    pub GetOverlayKey: *const c_void,
    pub GetOverlayName: *const c_void,
    pub SetOverlayName: *const c_void,
    pub GetOverlayImageData: Option<OverlayGetImageDataFn>,
    pub GetOverlayErrorNameFromEnum: *const c_void,
    pub SetOverlayRenderingPid: *const c_void,
    pub GetOverlayRenderingPid: *const c_void,
    pub SetOverlayFlag: *const c_void,
    pub GetOverlayFlag: *const c_void,
    pub GetOverlayFlags: *const c_void,
    pub SetOverlayColor: *const c_void,
    pub GetOverlayColor: *const c_void,
    pub SetOverlayAlpha: *const c_void,
    pub GetOverlayAlpha: *const c_void,
    pub SetOverlayTexelAspect: *const c_void,
    pub GetOverlayTexelAspect: *const c_void,
    pub SetOverlaySortOrder: *const c_void,
    pub GetOverlaySortOrder: *const c_void,
    pub SetOverlayWidthInMeters: *const c_void,
    pub GetOverlayWidthInMeters: *const c_void,
    pub SetOverlayCurvature: *const c_void,
    pub GetOverlayCurvature: *const c_void,
    pub SetOverlayPreCurvePitch: *const c_void,
    pub GetOverlayPreCurvePitch: *const c_void,
    pub SetOverlayTextureColorSpace: *const c_void,
    pub GetOverlayTextureColorSpace: *const c_void,
    pub SetOverlayTextureBounds: *const c_void,
    pub GetOverlayTextureBounds: *const c_void,
    pub GetOverlayTransformType: *const c_void,
    pub SetOverlayTransformAbsolute: *const c_void,
    pub GetOverlayTransformAbsolute: *const c_void,
    pub SetOverlayTransformTrackedDeviceRelative: *const c_void,
    pub GetOverlayTransformTrackedDeviceRelative: *const c_void,
    pub SetOverlayTransformTrackedDeviceComponent: *const c_void,
    pub GetOverlayTransformTrackedDeviceComponent: *const c_void,
    pub GetOverlayTransformOverlayRelative: *const c_void,
    pub SetOverlayTransformOverlayRelative: *const c_void,
    pub SetOverlayTransformCursor: *const c_void,
    pub GetOverlayTransformCursor: *const c_void,
    pub ShowOverlay: *const c_void,
    pub HideOverlay: *const c_void,
    pub IsOverlayVisible: Option<OverlayIsVisibleFn>,
    pub GetTransformForOverlayCoordinates: *const c_void,
    pub PollNextOverlayEvent: *const c_void,
    pub GetOverlayInputMethod: *const c_void,
    pub SetOverlayInputMethod: *const c_void,
    pub GetOverlayMouseScale: *const c_void,
    pub SetOverlayMouseScale: *const c_void,
    pub ComputeOverlayIntersection: *const c_void,
    pub IsHoverTargetOverlay: *const c_void,
    pub SetOverlayIntersectionMask: *const c_void,
    pub TriggerLaserMouseHapticVibration: *const c_void,
    pub SetOverlayCursor: *const c_void,
    pub SetOverlayCursorPositionOverride: *const c_void,
    pub ClearOverlayCursorPositionOverride: *const c_void,
    pub SetOverlayTexture: *const c_void,
    pub ClearOverlayTexture: *const c_void,
    pub SetOverlayRaw: *const c_void,
    pub SetOverlayFromFile: *const c_void,
    pub GetOverlayTexture: *const c_void,
    pub ReleaseNativeOverlayHandle: *const c_void,
    pub GetOverlayTextureSize: *const c_void,
    pub CreateDashboardOverlay: *const c_void,
    pub IsDashboardVisible: *const c_void,
    pub IsActiveDashboardOverlay: *const c_void,
    pub SetDashboardOverlaySceneProcess: *const c_void,
    pub GetDashboardOverlaySceneProcess: *const c_void,
    pub ShowDashboard: *const c_void,
    pub GetPrimaryDashboardDevice: *const c_void,
    pub ShowKeyboard: *const c_void,
    pub ShowKeyboardForOverlay: *const c_void,
    pub GetKeyboardText: *const c_void,
    pub HideKeyboard: *const c_void,
    pub SetKeyboardTransformAbsolute: *const c_void,
    pub SetKeyboardPositionForOverlay: *const c_void,
    pub ShowMessageOverlay: *const c_void,
    pub CloseMessageOverlay: *const c_void,
}

#[repr(C)]
pub struct VR_IVRHeadsetView_FnTable {
    pub SetHeadsetViewSize: Option<HeadsetViewSetSizeFn>,
    pub GetHeadsetViewSize: Option<HeadsetViewGetSizeFn>,
    pub SetHeadsetViewMode: Option<HeadsetViewSetModeFn>,
    pub GetHeadsetViewMode: Option<HeadsetViewGetModeFn>,
    pub SetHeadsetViewCropped: Option<HeadsetViewSetCroppedFn>,
    pub GetHeadsetViewCropped: Option<HeadsetViewGetCroppedFn>,
    pub GetHeadsetViewAspectRatio: Option<HeadsetViewGetAspectRatioFn>,
    pub SetHeadsetViewBlendRange: Option<HeadsetViewSetBlendRangeFn>,
    pub GetHeadsetViewBlendRange: Option<HeadsetViewGetBlendRangeFn>,
}
