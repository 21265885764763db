//! Runtime binding to the shared Xlib library
//!
//! Nothing here links against X11 at build time. The first window to open
//! loads `libX11` through the dynamic loader and resolves every entry point
//! the library needs into a typed function-pointer table; the last window to
//! close drops the library again. Resolution is all-or-nothing: a single
//! missing symbol fails the whole acquire and no partially-filled table is
//! ever handed out.

use std::sync::Mutex;

use libloading::Library;

use crate::error::BindError;
use crate::xlib::abi::{
    Display, Drawable, Gc, Visual, Window, XEvent, XImage, XPoint, XWindowAttributes,
};
use libc::{c_char, c_int, c_long, c_uint, c_ulong, c_void};

/// Preferred shared object name; the bare `.so` form is tried as a fallback
/// for systems without the dev symlink convention.
const SONAME: &str = "libX11.so.6";
const SONAME_FALLBACK: &str = "libX11.so";

/// Resolved Xlib entry points. Plain function pointers, `Copy`, so a window
/// handle can carry its own table; the refcount in [`BindingSlot`] keeps the
/// underlying library loaded for as long as any handle is alive.
#[derive(Clone, Copy)]
pub(crate) struct XlibFns {
    // Display / window lifecycle
    pub open_display: unsafe extern "C" fn(*const c_char) -> *mut Display,
    pub close_display: unsafe extern "C" fn(*mut Display) -> c_int,
    pub create_simple_window: unsafe extern "C" fn(
        *mut Display,
        Window,
        c_int,
        c_int,
        c_uint,
        c_uint,
        c_uint,
        c_ulong,
        c_ulong,
    ) -> Window,
    pub destroy_window: unsafe extern "C" fn(*mut Display, Window) -> c_int,
    pub map_window: unsafe extern "C" fn(*mut Display, Window) -> c_int,
    pub select_input: unsafe extern "C" fn(*mut Display, Window, c_long) -> c_int,
    pub store_name: unsafe extern "C" fn(*mut Display, Window, *const c_char) -> c_int,
    pub get_window_attributes:
        unsafe extern "C" fn(*mut Display, Window, *mut XWindowAttributes) -> c_int,

    // Graphics context
    pub create_gc: unsafe extern "C" fn(*mut Display, Drawable, c_ulong, *mut c_void) -> Gc,
    pub free_gc: unsafe extern "C" fn(*mut Display, Gc) -> c_int,
    pub set_foreground: unsafe extern "C" fn(*mut Display, Gc, c_ulong) -> c_int,
    pub set_line_attributes:
        unsafe extern "C" fn(*mut Display, Gc, c_uint, c_int, c_int, c_int) -> c_int,

    // Image creation / blit
    pub create_image: unsafe extern "C" fn(
        *mut Display,
        *mut Visual,
        c_uint,
        c_int,
        c_int,
        *mut c_char,
        c_uint,
        c_uint,
        c_int,
        c_int,
    ) -> *mut XImage,
    pub put_image: unsafe extern "C" fn(
        *mut Display,
        Drawable,
        Gc,
        *mut XImage,
        c_int,
        c_int,
        c_int,
        c_int,
        c_uint,
        c_uint,
    ) -> c_int,

    // Shape primitives
    pub draw_rectangle:
        unsafe extern "C" fn(*mut Display, Drawable, Gc, c_int, c_int, c_uint, c_uint) -> c_int,
    pub fill_rectangle:
        unsafe extern "C" fn(*mut Display, Drawable, Gc, c_int, c_int, c_uint, c_uint) -> c_int,
    pub draw_line:
        unsafe extern "C" fn(*mut Display, Drawable, Gc, c_int, c_int, c_int, c_int) -> c_int,
    pub draw_arc: unsafe extern "C" fn(
        *mut Display,
        Drawable,
        Gc,
        c_int,
        c_int,
        c_uint,
        c_uint,
        c_int,
        c_int,
    ) -> c_int,
    pub fill_arc: unsafe extern "C" fn(
        *mut Display,
        Drawable,
        Gc,
        c_int,
        c_int,
        c_uint,
        c_uint,
        c_int,
        c_int,
    ) -> c_int,
    pub draw_point: unsafe extern "C" fn(*mut Display, Drawable, Gc, c_int, c_int) -> c_int,
    pub fill_polygon:
        unsafe extern "C" fn(*mut Display, Drawable, Gc, *mut XPoint, c_int, c_int, c_int) -> c_int,
    pub draw_string: unsafe extern "C" fn(
        *mut Display,
        Drawable,
        Gc,
        c_int,
        c_int,
        *const c_char,
        c_int,
    ) -> c_int,
    pub set_window_background: unsafe extern "C" fn(*mut Display, Window, c_ulong) -> c_int,
    pub clear_window: unsafe extern "C" fn(*mut Display, Window) -> c_int,

    // Event pump / output flush
    pub pending: unsafe extern "C" fn(*mut Display) -> c_int,
    pub next_event: unsafe extern "C" fn(*mut Display, *mut XEvent) -> c_int,
    pub put_back_event: unsafe extern "C" fn(*mut Display, *mut XEvent) -> c_int,
    pub flush: unsafe extern "C" fn(*mut Display) -> c_int,
}

/// Resolves one symbol, copying the function pointer out of the library.
///
/// # Safety
/// `T` must be the correct function-pointer type for `name`; a mismatch is
/// undefined behavior at the first call through the pointer.
unsafe fn sym<T: Copy>(lib: &Library, name: &'static str) -> Result<T, BindError> {
    let mut cname = Vec::with_capacity(name.len() + 1);
    cname.extend_from_slice(name.as_bytes());
    cname.push(0);
    match lib.get::<T>(&cname) {
        Ok(symbol) => Ok(*symbol),
        Err(source) => Err(BindError::MissingSymbol {
            symbol: name,
            source,
        }),
    }
}

impl XlibFns {
    /// Resolves the whole table from an opened library.
    ///
    /// # Safety
    /// `lib` must actually be Xlib; the declared signatures are trusted.
    unsafe fn resolve(lib: &Library) -> Result<Self, BindError> {
        Ok(Self {
            open_display: sym(lib, "XOpenDisplay")?,
            close_display: sym(lib, "XCloseDisplay")?,
            create_simple_window: sym(lib, "XCreateSimpleWindow")?,
            destroy_window: sym(lib, "XDestroyWindow")?,
            map_window: sym(lib, "XMapWindow")?,
            select_input: sym(lib, "XSelectInput")?,
            store_name: sym(lib, "XStoreName")?,
            get_window_attributes: sym(lib, "XGetWindowAttributes")?,
            create_gc: sym(lib, "XCreateGC")?,
            free_gc: sym(lib, "XFreeGC")?,
            set_foreground: sym(lib, "XSetForeground")?,
            set_line_attributes: sym(lib, "XSetLineAttributes")?,
            create_image: sym(lib, "XCreateImage")?,
            put_image: sym(lib, "XPutImage")?,
            draw_rectangle: sym(lib, "XDrawRectangle")?,
            fill_rectangle: sym(lib, "XFillRectangle")?,
            draw_line: sym(lib, "XDrawLine")?,
            draw_arc: sym(lib, "XDrawArc")?,
            fill_arc: sym(lib, "XFillArc")?,
            draw_point: sym(lib, "XDrawPoint")?,
            fill_polygon: sym(lib, "XFillPolygon")?,
            draw_string: sym(lib, "XDrawString")?,
            set_window_background: sym(lib, "XSetWindowBackground")?,
            clear_window: sym(lib, "XClearWindow")?,
            pending: sym(lib, "XPending")?,
            next_event: sym(lib, "XNextEvent")?,
            put_back_event: sym(lib, "XPutBackEvent")?,
            flush: sym(lib, "XFlush")?,
        })
    }
}

/// An open library together with its resolved table. Dropping this unloads
/// the shared object.
pub(crate) struct NativeBinding {
    fns: XlibFns,
    _lib: Library,
}

impl NativeBinding {
    fn load() -> Result<Self, BindError> {
        let lib = match unsafe { Library::new(SONAME) } {
            Ok(lib) => lib,
            Err(_) => unsafe { Library::new(SONAME_FALLBACK) }
                .map_err(|source| BindError::OpenFailed { source })?,
        };
        let fns = unsafe { XlibFns::resolve(&lib)? };
        log::debug!("resolved Xlib entry points from {}", SONAME);
        Ok(Self { fns, _lib: lib })
    }
}

/// Reference-counted slot for the process-wide binding. Generic over the
/// binding payload so the counting rules are testable without a real X
/// installation.
pub(crate) struct BindingSlot<B> {
    binding: Option<B>,
    windows: usize,
}

impl<B> BindingSlot<B> {
    pub(crate) const fn new() -> Self {
        Self {
            binding: None,
            windows: 0,
        }
    }

    /// Loads the binding if this is the first dependent, then counts the new
    /// dependent. A failed load leaves the slot exactly as it was.
    pub(crate) fn acquire_with<E>(
        &mut self,
        load: impl FnOnce() -> Result<B, E>,
    ) -> Result<&B, E> {
        if self.binding.is_none() {
            self.binding = Some(load()?);
        }
        self.windows += 1;
        match self.binding.as_ref() {
            Some(binding) => Ok(binding),
            // acquire_with just stored a value; this arm is unreachable.
            None => unreachable!("binding slot populated above"),
        }
    }

    /// Drops one dependent. Returns true when that was the last one and the
    /// binding was torn down. An unbalanced release is refused so the count
    /// can never go negative.
    pub(crate) fn release(&mut self) -> bool {
        if self.windows == 0 {
            log::warn!("binding released with no matching acquire");
            return false;
        }
        self.windows -= 1;
        if self.windows == 0 {
            self.binding = None;
            return true;
        }
        false
    }

    #[cfg(test)]
    fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    #[cfg(test)]
    fn windows(&self) -> usize {
        self.windows
    }
}

lazy_static::lazy_static! {
    static ref XLIB: Mutex<BindingSlot<NativeBinding>> = Mutex::new(BindingSlot::new());
}

/// Acquires the process-wide binding for one window, loading and resolving
/// the library when no other window holds it.
pub(crate) fn acquire() -> Result<XlibFns, BindError> {
    let mut slot = XLIB.lock().unwrap();
    let binding = slot.acquire_with(NativeBinding::load)?;
    Ok(binding.fns)
}

/// Releases one window's hold on the binding; the library is unloaded when
/// the last window lets go.
pub(crate) fn release() {
    let mut slot = XLIB.lock().unwrap();
    if slot.release() {
        log::debug!("last window closed, unloaded {}", SONAME);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_acquire_loads_then_counts() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        let loaded = slot.acquire_with(|| Ok::<_, ()>(7)).copied();
        assert_eq!(loaded, Ok(7));
        assert!(slot.is_bound());
        assert_eq!(slot.windows(), 1);
    }

    #[test]
    fn acquire_while_bound_does_not_reload() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        slot.acquire_with(|| Ok::<_, ()>(1)).unwrap();
        // A second acquire must not invoke the loader at all.
        slot.acquire_with(|| -> Result<u32, ()> {
            panic!("loader invoked while already bound")
        })
        .unwrap();
        assert_eq!(slot.windows(), 2);
    }

    #[test]
    fn failed_load_leaves_slot_untouched() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        let result = slot.acquire_with(|| Err::<u32, &str>("no library"));
        assert_eq!(result.err(), Some("no library"));
        assert!(!slot.is_bound());
        assert_eq!(slot.windows(), 0);
    }

    #[test]
    fn releases_tear_down_only_at_zero() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        for _ in 0..3 {
            slot.acquire_with(|| Ok::<_, ()>(9)).unwrap();
        }
        assert!(!slot.release());
        assert!(!slot.release());
        assert!(slot.is_bound());
        assert!(slot.release());
        assert!(!slot.is_bound());
        assert_eq!(slot.windows(), 0);
    }

    #[test]
    fn rebinds_from_scratch_after_teardown() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        slot.acquire_with(|| Ok::<_, ()>(1)).unwrap();
        slot.release();
        let reloaded = slot.acquire_with(|| Ok::<_, ()>(2)).copied();
        assert_eq!(reloaded, Ok(2));
    }

    #[test]
    fn unbalanced_release_is_refused() {
        let mut slot: BindingSlot<u32> = BindingSlot::new();
        assert!(!slot.release());
        assert_eq!(slot.windows(), 0);
        assert!(!slot.is_bound());
    }
}
