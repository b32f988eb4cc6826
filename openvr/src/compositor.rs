use crate::{
    entry,
    error_ext::ErrorCode,
    interface_table,
    InterfaceError,
    sys,
};

use std::{
    marker::PhantomData,
    ptr,
};

/// The shared-GL-texture entry points of `IVRCompositor`, null-checked once
/// at fetch time.
#[derive(Clone, Copy)]
pub struct Compositor {
    mirror_texture_gl: sys::CompositorGetMirrorTextureGlFn,
    release_shared_texture: sys::CompositorReleaseSharedGlTextureFn,
    lock_shared_texture: sys::CompositorLockSharedGlTextureFn,
    unlock_shared_texture: sys::CompositorUnlockSharedGlTextureFn,
}

impl Compositor {
    pub fn get() -> Result<Compositor, InterfaceError> {
        const VERSION: &'static str = sys::IVRCompositor_Version;
        let t: &'static sys::VR_IVRCompositor_FnTable = interface_table(VERSION)?;
        Ok(Compositor {
            mirror_texture_gl: entry(t.GetMirrorTextureGL, VERSION, "GetMirrorTextureGL")?,
            release_shared_texture: entry(t.ReleaseSharedGLTexture, VERSION, "ReleaseSharedGLTexture")?,
            lock_shared_texture: entry(t.LockGLSharedTextureForAccess, VERSION, "LockGLSharedTextureForAccess")?,
            unlock_shared_texture: entry(t.UnlockGLSharedTextureForAccess, VERSION, "UnlockGLSharedTextureForAccess")?,
        })
    }

    /// Requests the shared GL mirror texture for an eye. The returned info
    /// releases the shared texture when dropped.
    ///
    /// Must be called on the thread owning the active GL context.
    pub unsafe fn get_mirror_texture_gl(&self, eye: sys::EVREye) -> Result<MirrorTextureInfo, sys::EVRCompositorError> {
        let mut id: sys::glUInt_t = 0;
        let mut handle: sys::glSharedTextureHandle_t = ptr::null_mut();
        (self.mirror_texture_gl)(eye, &mut id as *mut _, &mut handle as *mut _).ok()?;
        Ok(MirrorTextureInfo {
            id: id,
            handle: handle,
            compositor: *self,
        })
    }

    pub unsafe fn release_shared_gl_texture(&self, id: sys::glUInt_t, handle: sys::glSharedTextureHandle_t) -> bool {
        debug!("releasing shared GL texture {:x}", handle as usize);
        (self.release_shared_texture)(id, handle)
    }

    pub unsafe fn lock_shared_gl_texture(&self, handle: sys::glSharedTextureHandle_t) {
        trace!("locking shared gl texture: {:x}", handle as usize);
        (self.lock_shared_texture)(handle)
    }

    pub unsafe fn unlock_shared_gl_texture(&self, handle: sys::glSharedTextureHandle_t) {
        trace!("unlocking shared gl texture: {:x}", handle as usize);
        (self.unlock_shared_texture)(handle)
    }
}

pub struct MirrorTextureLock<'a>(sys::glSharedTextureHandle_t, Compositor, PhantomData<&'a MirrorTextureInfo>);

impl<'a> Drop for MirrorTextureLock<'a> {
    fn drop(&mut self) {
        unsafe {
            self.1.unlock_shared_gl_texture(self.0);
        }
    }
}

#[derive(Debug)]
pub struct MirrorTextureInfo {
    pub id: sys::glUInt_t,
    pub handle: sys::glSharedTextureHandle_t,
    compositor: Compositor,
}

impl MirrorTextureInfo {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id == 0 || self.handle.is_null()
    }

    /// Locks the shared texture for CPU access for the lifetime of the
    /// returned guard. Dropping the guard unlocks; holding it across frames
    /// stalls the compositor.
    pub unsafe fn lock<'a>(&'a self) -> MirrorTextureLock<'a> {
        self.compositor.lock_shared_gl_texture(self.handle);
        MirrorTextureLock(self.handle, self.compositor, PhantomData {})
    }

    /// Hands ownership of the raw id/handle pair to the caller, who becomes
    /// responsible for releasing it.
    pub fn into_raw(self) -> (sys::glUInt_t, sys::glSharedTextureHandle_t) {
        let raw = (self.id, self.handle);
        std::mem::forget(self);
        raw
    }
}

impl Drop for MirrorTextureInfo {
    fn drop(&mut self) {
        if self.is_empty() {
            return;
        }
        let released = unsafe {
            self.compositor.release_shared_gl_texture(self.id, self.handle)
        };
        if !released {
            warn!("failed to release shared GL texture {:x}", self.handle as usize);
        }
        self.id = 0;
        self.handle = ptr::null_mut();
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    static LOCKS: AtomicUsize = AtomicUsize::new(0);
    static UNLOCKS: AtomicUsize = AtomicUsize::new(0);
    static RELEASES: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn stub_mirror_texture(_eye: sys::EVREye, id: *mut sys::glUInt_t, handle: *mut sys::glSharedTextureHandle_t) -> sys::EVRCompositorError {
        *id = 7;
        *handle = 0xdead as sys::glSharedTextureHandle_t;
        sys::EVRCompositorError::EVRCompositorError_VRCompositorError_None
    }

    unsafe extern "C" fn stub_release(_id: sys::glUInt_t, _handle: sys::glSharedTextureHandle_t) -> bool {
        RELEASES.fetch_add(1, Ordering::SeqCst);
        true
    }

    unsafe extern "C" fn stub_lock(_handle: sys::glSharedTextureHandle_t) {
        LOCKS.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_unlock(_handle: sys::glSharedTextureHandle_t) {
        UNLOCKS.fetch_add(1, Ordering::SeqCst);
    }

    fn stub_compositor() -> Compositor {
        Compositor {
            mirror_texture_gl: stub_mirror_texture,
            release_shared_texture: stub_release,
            lock_shared_texture: stub_lock,
            unlock_shared_texture: stub_unlock,
        }
    }

    #[test]
    fn lock_guard_unlocks_on_drop() {
        let compositor = stub_compositor();
        let info = unsafe { compositor.get_mirror_texture_gl(sys::EVREye::EVREye_Eye_Left) }.unwrap();
        let locks_before = LOCKS.load(Ordering::SeqCst);
        let unlocks_before = UNLOCKS.load(Ordering::SeqCst);
        {
            let _guard = unsafe { info.lock() };
            assert_eq!(LOCKS.load(Ordering::SeqCst), locks_before + 1);
            assert_eq!(UNLOCKS.load(Ordering::SeqCst), unlocks_before);
        }
        assert_eq!(UNLOCKS.load(Ordering::SeqCst), unlocks_before + 1);
    }

    #[test]
    fn info_releases_shared_texture_on_drop() {
        let compositor = stub_compositor();
        let before = RELEASES.load(Ordering::SeqCst);
        let info = unsafe { compositor.get_mirror_texture_gl(sys::EVREye::EVREye_Eye_Left) }.unwrap();
        assert!(!info.is_empty());
        drop(info);
        assert_eq!(RELEASES.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn into_raw_skips_release() {
        let compositor = stub_compositor();
        let before = RELEASES.load(Ordering::SeqCst);
        let info = unsafe { compositor.get_mirror_texture_gl(sys::EVREye::EVREye_Eye_Left) }.unwrap();
        let (id, handle) = info.into_raw();
        assert_eq!(id, 7);
        assert!(!handle.is_null());
        assert_eq!(RELEASES.load(Ordering::SeqCst), before);
    }
}
