//! The slice of OpenGL the readback path needs.
//!
//! The host owns the GL context and its loader; no process-global function
//! pointers are resolved here. [`GlFns`] carries exactly the entry points
//! the copy path calls, resolved through a loader the caller hands in
//! (typically its `glfwGetProcAddress` equivalent).

use std::{
    mem,
    os::raw::c_void,
};
use thiserror::Error;

pub type GLenum = u32;
pub type GLint = i32;
pub type GLuint = u32;

pub const NO_ERROR: GLenum = 0;
pub const INVALID_ENUM: GLenum = 0x0500;
pub const INVALID_VALUE: GLenum = 0x0501;
pub const INVALID_OPERATION: GLenum = 0x0502;
pub const TEXTURE_2D: GLenum = 0x0de1;
pub const TEXTURE_WIDTH: GLenum = 0x1000;
pub const TEXTURE_HEIGHT: GLenum = 0x1001;
pub const UNSIGNED_BYTE: GLenum = 0x1401;
pub const RGB: GLenum = 0x1907;
pub const RGBA: GLenum = 0x1908;
pub const BGRA: GLenum = 0x80e1;

pub(crate) type GetErrorFn = unsafe extern "C" fn() -> GLenum;
pub(crate) type BindTextureFn = unsafe extern "C" fn(target: GLenum, texture: GLuint);
pub(crate) type GetTexImageFn = unsafe extern "C" fn(target: GLenum, level: GLint, format: GLenum, pixel_type: GLenum, pixels: *mut c_void);
pub(crate) type GetTexLevelParameterIvFn = unsafe extern "C" fn(target: GLenum, level: GLint, pname: GLenum, params: *mut GLint);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GlLoadError {
    #[error("GL loader returned no pointer for `{0}`")]
    MissingSymbol(&'static str),
}

/// The GL entry points used for texture readback, resolved once per owner.
#[derive(Debug, Clone, Copy)]
pub struct GlFns {
    pub(crate) get_error: GetErrorFn,
    pub(crate) bind_texture: BindTextureFn,
    pub(crate) get_tex_image: GetTexImageFn,
    pub(crate) get_tex_level_parameter_iv: GetTexLevelParameterIvFn,
}

impl GlFns {
    /// Resolves the entry points through `loader`. The resulting struct is
    /// only valid for use on the thread owning the GL context the loader
    /// belongs to.
    pub fn load<F>(mut loader: F) -> Result<GlFns, GlLoadError> where
        F: FnMut(&str) -> *const c_void,
    {
        unsafe {
            Ok(GlFns {
                get_error: load_fn(&mut loader, "glGetError")?,
                bind_texture: load_fn(&mut loader, "glBindTexture")?,
                get_tex_image: load_fn(&mut loader, "glGetTexImage")?,
                get_tex_level_parameter_iv: load_fn(&mut loader, "glGetTexLevelParameteriv")?,
            })
        }
    }
}

unsafe fn load_fn<T, F>(loader: &mut F, name: &'static str) -> Result<T, GlLoadError> where
    F: FnMut(&str) -> *const c_void,
{
    let p = loader(name);
    if p.is_null() {
        trace!("{}() = NULL", name);
        return Err(GlLoadError::MissingSymbol(name));
    }
    trace!("{}() = {:p}", name, p);
    Ok(mem::transmute_copy(&p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    unsafe extern "C" fn no_error() -> GLenum {
        NO_ERROR
    }

    #[test]
    fn load_fails_on_missing_symbol() {
        let e = GlFns::load(|_| ptr::null()).unwrap_err();
        assert_eq!(e, GlLoadError::MissingSymbol("glGetError"));
    }

    #[test]
    fn load_resolves_all_entry_points() {
        // every symbol resolves to *something*; load must accept it
        let fns = GlFns::load(|_| no_error as *const c_void).unwrap();
        assert_eq!(unsafe { (fns.get_error)() }, NO_ERROR);
        assert!(format!("{:?}", fns).starts_with("GlFns"));
    }
}
