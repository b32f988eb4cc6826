//! CPU-side mirror of a GL texture.
//!
//! A [`CopyContext`] borrows a texture handle (the host keeps ownership of
//! the GL object) and owns the byte buffer the readback lands in. The
//! buffer grows on demand to exactly width × height × bytes-per-pixel and
//! is freed on drop. Callers must serialize access to a context and only
//! touch it on the GL-context-owning thread.

use std::fmt;

use crate::gl::{
    self,
    GlFns,
    GLenum,
    GLint,
    GLuint,
};

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb = gl::RGB,
    Rgba = gl::RGBA,
    Bgra = gl::BGRA,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> u8 {
        use TextureFormat::*;
        match self {
            Rgb => 3,
            Rgba | Bgra => 4,
        }
    }

    pub fn from_raw(raw: GLenum) -> Option<TextureFormat> {
        use TextureFormat::*;
        match raw {
            gl::RGB => Some(Rgb),
            gl::RGBA => Some(Rgba),
            gl::BGRA => Some(Bgra),
            _ => None,
        }
    }
}

impl Into<GLenum> for TextureFormat {
    #[inline]
    fn into(self) -> GLenum {
        self as GLenum
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSize {
    pub width: GLint,
    pub height: GLint,
}

impl TextureSize {
    pub const fn empty() -> Self {
        TextureSize {
            width: 0,
            height: 0,
        }
    }
}

impl Into<(i32, i32)> for TextureSize {
    #[inline]
    fn into(self) -> (i32, i32) {
        (self.width, self.height)
    }
}

fn required_buffer_size(width: u32, height: u32, format: TextureFormat) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(format.bytes_per_pixel() as usize)
}

unsafe fn check_error(fns: &GlFns, call: &str) -> Result<(), GLenum> {
    let status = (fns.get_error)();
    if status != gl::NO_ERROR {
        debug!("{} failed with error: {:#x}", call, status);
        Err(status)
    } else {
        Ok(())
    }
}

unsafe fn drain_stale_error(fns: &GlFns) {
    let stale = (fns.get_error)();
    if stale != gl::NO_ERROR {
        debug!("starting with stale GL error: {:#x}", stale);
    }
}

pub struct CopyContext {
    texture: GLuint,
    fns: GlFns,
    img: Vec<u8>,
}

impl fmt::Debug for CopyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyContext")
            .field("texture", &self.texture)
            .field("img_len", &self.img.len())
            .finish()
    }
}

impl CopyContext {
    pub fn new(texture: GLuint, fns: GlFns) -> CopyContext {
        trace!("CopyContext::new({})", texture);
        CopyContext {
            texture: texture,
            fns: fns,
            img: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn texture(&self) -> GLuint {
        self.texture
    }

    #[inline(always)]
    pub fn image_buffer<'a>(&'a self) -> &'a [u8] {
        &self.img
    }

    /// Grows the buffer to fit `width` × `height` pixels of `format`.
    /// Non-increasing requirements leave the buffer untouched. Returns
    /// false (buffer untouched) when the required size overflows `usize`.
    pub fn ensure_size(&mut self, width: u32, height: u32, format: TextureFormat) -> bool {
        let n = match required_buffer_size(width, height, format) {
            Some(n) => n,
            None => {
                warn!("buffer size overflow for ({}, {}) {:?}", width, height, format);
                return false;
            },
        };
        if self.img.len() < n {
            debug!("growing image buffer to {} bytes for ({}, {}) {:?}", n, width, height, format);
            self.img.resize(n, 0);
        }
        true
    }

    /// Binds the texture and reads its pixels back into the owned buffer.
    ///
    /// Returns the GL error of the first failing call; a bind failure is
    /// reported without attempting the readback. Dimensions whose buffer
    /// size would overflow fail with `GL_INVALID_VALUE` before any GL call.
    pub fn copy_texture(&mut self, width: u32, height: u32, format: TextureFormat) -> Result<(), GLenum> {
        trace!("copy_texture({}, {}, {}, {:?})", self.texture, width, height, format);
        if !self.ensure_size(width, height, format) {
            return Err(gl::INVALID_VALUE);
        }
        unsafe {
            drain_stale_error(&self.fns);
            (self.fns.bind_texture)(gl::TEXTURE_2D, self.texture);
            check_error(&self.fns, "glBindTexture")?;
            (self.fns.get_tex_image)(gl::TEXTURE_2D, 0, format.into(), gl::UNSIGNED_BYTE, self.img.as_mut_ptr() as *mut _);
            check_error(&self.fns, "glGetTexImage")?;
        }
        Ok(())
    }

    pub fn get_size(&self) -> TextureSize {
        unsafe { get_gl_texture_size(&self.fns, self.texture) }
    }
}

/// Reads a texture's level-0 dimensions. Leaves the texture bound to
/// `GL_TEXTURE_2D`.
pub unsafe fn get_gl_texture_size(fns: &GlFns, texture: GLuint) -> TextureSize {
    let mut ret = TextureSize::empty();
    (fns.bind_texture)(gl::TEXTURE_2D, texture);
    (fns.get_tex_level_parameter_iv)(gl::TEXTURE_2D, 0, gl::TEXTURE_WIDTH, &mut ret.width as *mut _);
    (fns.get_tex_level_parameter_iv)(gl::TEXTURE_2D, 0, gl::TEXTURE_HEIGHT, &mut ret.height as *mut _);
    ret
}

/// Raw readback into a caller-owned buffer, which must be large enough for
/// the texture's full level-0 contents in `format`.
pub unsafe fn copy_gl_texture(fns: &GlFns, texture: GLuint, format: GLenum, img: *mut u8) -> Result<(), GLenum> {
    drain_stale_error(fns);
    (fns.bind_texture)(gl::TEXTURE_2D, texture);
    check_error(fns, "glBindTexture")?;
    (fns.get_tex_image)(gl::TEXTURE_2D, 0, format, gl::UNSIGNED_BYTE, img as *mut _);
    check_error(fns, "glGetTexImage")?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{
        Mutex,
        MutexGuard,
        atomic::{
            AtomicI32,
            AtomicUsize,
            Ordering,
        },
    };

    // The stub GL below is process-global state, so tests touching it hold
    // this lock for their whole body.
    static GL_STUB: Mutex<()> = Mutex::new(());
    static NEXT_ERRORS: Mutex<Vec<GLenum>> = Mutex::new(Vec::new());
    static BIND_CALLS: AtomicUsize = AtomicUsize::new(0);
    static READ_CALLS: AtomicUsize = AtomicUsize::new(0);
    static TEXTURE_WIDTH: AtomicI32 = AtomicI32::new(0);
    static TEXTURE_HEIGHT: AtomicI32 = AtomicI32::new(0);

    pub(crate) fn lock_stub<'a>() -> MutexGuard<'a, ()> {
        GL_STUB.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn reset_stub(errors: &[GLenum]) {
        *NEXT_ERRORS.lock().unwrap() = errors.to_vec();
        BIND_CALLS.store(0, Ordering::SeqCst);
        READ_CALLS.store(0, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_get_error() -> GLenum {
        let mut errors = NEXT_ERRORS.lock().unwrap();
        if errors.is_empty() {
            gl::NO_ERROR
        } else {
            errors.remove(0)
        }
    }

    unsafe extern "C" fn stub_bind_texture(_target: GLenum, _texture: GLuint) {
        BIND_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    unsafe extern "C" fn stub_get_tex_image(_target: GLenum, _level: GLint, _format: GLenum, _pixel_type: GLenum, pixels: *mut std::os::raw::c_void) {
        READ_CALLS.fetch_add(1, Ordering::SeqCst);
        if !pixels.is_null() {
            *(pixels as *mut u8) = 0xab;
        }
    }

    unsafe extern "C" fn stub_get_tex_level_parameter_iv(_target: GLenum, _level: GLint, pname: GLenum, params: *mut GLint) {
        *params = match pname {
            gl::TEXTURE_WIDTH => TEXTURE_WIDTH.load(Ordering::SeqCst),
            gl::TEXTURE_HEIGHT => TEXTURE_HEIGHT.load(Ordering::SeqCst),
            _ => 0,
        };
    }

    pub(crate) fn stub_fns() -> GlFns {
        GlFns {
            get_error: stub_get_error,
            bind_texture: stub_bind_texture,
            get_tex_image: stub_get_tex_image,
            get_tex_level_parameter_iv: stub_get_tex_level_parameter_iv,
        }
    }

    #[test]
    fn bytes_per_pixel_follows_format() {
        assert_eq!(TextureFormat::Rgb.bytes_per_pixel(), 3);
        assert_eq!(TextureFormat::Rgba.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Bgra.bytes_per_pixel(), 4);
    }

    #[test]
    fn format_round_trips_through_raw() {
        for format in &[TextureFormat::Rgb, TextureFormat::Rgba, TextureFormat::Bgra] {
            let raw: GLenum = (*format).into();
            assert_eq!(TextureFormat::from_raw(raw), Some(*format));
        }
        assert_eq!(TextureFormat::from_raw(0x1406), None);
    }

    #[test]
    fn ensure_size_allocates_exactly_once() {
        let _guard = lock_stub();
        reset_stub(&[]);
        let mut ctx = CopyContext::new(1, stub_fns());
        ctx.ensure_size(100, 50, TextureFormat::Rgb);
        assert_eq!(ctx.image_buffer().len(), 15000);
        let ptr = ctx.image_buffer().as_ptr();
        ctx.ensure_size(100, 50, TextureFormat::Rgb);
        ctx.ensure_size(50, 50, TextureFormat::Rgb);
        assert_eq!(ctx.image_buffer().len(), 15000);
        assert_eq!(ctx.image_buffer().as_ptr(), ptr);
    }

    #[test]
    fn ensure_size_grows_for_wider_formats() {
        let _guard = lock_stub();
        reset_stub(&[]);
        let mut ctx = CopyContext::new(1, stub_fns());
        ctx.ensure_size(100, 50, TextureFormat::Rgb);
        ctx.ensure_size(100, 50, TextureFormat::Rgba);
        assert_eq!(ctx.image_buffer().len(), 20000);
    }

    #[test]
    fn copy_does_not_reallocate_a_sized_buffer() {
        let _guard = lock_stub();
        reset_stub(&[]);
        let mut ctx = CopyContext::new(1, stub_fns());
        ctx.ensure_size(100, 50, TextureFormat::Rgb);
        let ptr = ctx.image_buffer().as_ptr();
        ctx.copy_texture(100, 50, TextureFormat::Rgb).unwrap();
        assert_eq!(ctx.image_buffer().as_ptr(), ptr);
        assert_eq!(ctx.image_buffer().len(), 15000);
        assert_eq!(ctx.image_buffer()[0], 0xab);
    }

    #[test]
    fn bind_error_takes_precedence() {
        let _guard = lock_stub();
        // stale error drained, then glBindTexture fails
        reset_stub(&[gl::NO_ERROR, gl::INVALID_OPERATION]);
        let mut ctx = CopyContext::new(1, stub_fns());
        assert_eq!(ctx.copy_texture(4, 4, TextureFormat::Rgba), Err(gl::INVALID_OPERATION));
        assert_eq!(READ_CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn read_error_is_returned() {
        let _guard = lock_stub();
        reset_stub(&[gl::NO_ERROR, gl::NO_ERROR, gl::INVALID_VALUE]);
        let mut ctx = CopyContext::new(1, stub_fns());
        assert_eq!(ctx.copy_texture(4, 4, TextureFormat::Rgba), Err(gl::INVALID_VALUE));
        assert_eq!(READ_CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let _guard = lock_stub();
        reset_stub(&[]);
        let mut ctx = CopyContext::new(1, stub_fns());
        assert!(!ctx.ensure_size(u32::MAX, u32::MAX, TextureFormat::Rgba));
        assert_eq!(ctx.image_buffer().len(), 0);
        assert_eq!(ctx.copy_texture(u32::MAX, u32::MAX, TextureFormat::Rgba), Err(gl::INVALID_VALUE));
        assert_eq!(BIND_CALLS.load(Ordering::SeqCst), 0);
        assert_eq!(READ_CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn get_size_reads_texture_dimensions() {
        let _guard = lock_stub();
        reset_stub(&[]);
        TEXTURE_WIDTH.store(1920, Ordering::SeqCst);
        TEXTURE_HEIGHT.store(1080, Ordering::SeqCst);
        let ctx = CopyContext::new(3, stub_fns());
        assert_eq!(ctx.get_size(), TextureSize { width: 1920, height: 1080 });
    }

    #[test]
    fn raw_copy_reports_first_failure() {
        let _guard = lock_stub();
        reset_stub(&[gl::NO_ERROR, gl::INVALID_ENUM]);
        let mut buf = [0u8; 16];
        let e = unsafe {
            copy_gl_texture(&stub_fns(), 1, gl::RGBA, buf.as_mut_ptr())
        };
        assert_eq!(e, Err(gl::INVALID_ENUM));
    }
}
