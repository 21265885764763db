//! ABI mirrors of the Xlib structures this library touches
//!
//! xlite never includes the X11 headers and never links Xlib at build time,
//! so every structure the runtime-resolved entry points read or write is
//! re-declared here with the exact 64-bit Unix layout. These are typed views
//! over memory owned by the X library; nothing in this module allocates.
//! The layouts are pinned by the tests at the bottom of the file.

use libc::{c_char, c_int, c_long, c_short, c_uint, c_ulong, c_void};

/// Generic X resource identifier.
pub type Xid = c_ulong;
/// Window identifier.
pub type Window = Xid;
/// Anything a graphics operation can target (window or pixmap).
pub type Drawable = Xid;
/// Colormap identifier.
pub type Colormap = Xid;
/// Server timestamp in milliseconds.
pub type Time = c_ulong;
/// Xlib's Bool: a C int holding 0 or 1.
pub type Bool = c_int;

/// Opaque connection to the X server (`struct _XDisplay`). Only ever
/// handled through a pointer; field access goes through [`PrivDisplay`].
#[repr(C)]
pub struct Display {
    _opaque: [u8; 0],
}

/// Opaque visual type (`struct _Visual`).
#[repr(C)]
pub struct Visual {
    _opaque: [u8; 0],
}

/// Opaque graphics context record (`struct _XGC`).
#[repr(C)]
pub struct GcRec {
    _opaque: [u8; 0],
}

/// Graphics context handle (Xlib's `GC` is a pointer typedef).
pub type Gc = *mut GcRec;

/// Per-screen record, mirrored for the root window, default visual, and
/// the white/black pixel values.
#[repr(C)]
pub struct Screen {
    pub ext_data: *mut c_void,
    pub display: *mut Display,
    pub root: Window,
    pub width: c_int,
    pub height: c_int,
    pub mwidth: c_int,
    pub mheight: c_int,
    pub ndepths: c_int,
    pub depths: *mut c_void,
    pub root_depth: c_int,
    pub root_visual: *mut Visual,
    pub default_gc: Gc,
    pub cmap: Colormap,
    pub white_pixel: c_ulong,
    pub black_pixel: c_ulong,
    pub max_maps: c_int,
    pub min_maps: c_int,
    pub backing_store: c_int,
    pub save_unders: Bool,
    pub root_input_mask: c_long,
}

/// Leading fields of `struct _XDisplay`, the part Xlib itself exposes to
/// its accessor macros (`_XPrivDisplay` in `Xlib.h`). This is a prefix
/// view: the real structure continues past `xdefaults`, so the mirror is
/// only ever read through a pointer, never sized or copied.
#[repr(C)]
pub struct PrivDisplay {
    pub ext_data: *mut c_void,
    pub private1: *mut c_void,
    pub fd: c_int,
    pub private2: c_int,
    pub proto_major_version: c_int,
    pub proto_minor_version: c_int,
    pub vendor: *mut c_char,
    pub private3: Xid,
    pub private4: Xid,
    pub private5: Xid,
    pub private6: c_int,
    pub resource_alloc: Option<unsafe extern "C" fn(*mut Display) -> Xid>,
    pub byte_order: c_int,
    pub bitmap_unit: c_int,
    pub bitmap_pad: c_int,
    pub bitmap_bit_order: c_int,
    pub nformats: c_int,
    pub pixmap_format: *mut c_void,
    pub private8: c_int,
    pub release: c_int,
    pub private9: *mut c_void,
    pub private10: *mut c_void,
    pub qlen: c_int,
    pub last_request_read: c_ulong,
    pub request: c_ulong,
    pub private11: *mut c_char,
    pub private12: *mut c_char,
    pub private13: *mut c_char,
    pub private14: *mut c_char,
    pub max_request_size: c_uint,
    pub db: *mut c_void,
    pub private15: Option<unsafe extern "C" fn(*mut Display) -> c_int>,
    pub display_name: *mut c_char,
    pub default_screen: c_int,
    pub nscreens: c_int,
    pub screens: *mut Screen,
    pub motion_buffer: c_ulong,
    pub private16: c_ulong,
    pub min_keycode: c_int,
    pub max_keycode: c_int,
    pub private17: *mut c_char,
    pub private18: *mut c_char,
    pub private19: c_int,
    pub xdefaults: *mut c_char,
}

/// Fields common to every event record.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct XAnyEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
}

/// Keyboard event record (KeyPress / KeyRelease).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct XKeyEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Time,
    pub x: c_int,
    pub y: c_int,
    pub x_root: c_int,
    pub y_root: c_int,
    pub state: c_uint,
    pub keycode: c_uint,
    pub same_screen: Bool,
}

/// Pointer button event record (ButtonPress / ButtonRelease).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct XButtonEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Time,
    pub x: c_int,
    pub y: c_int,
    pub x_root: c_int,
    pub y_root: c_int,
    pub state: c_uint,
    pub button: c_uint,
    pub same_screen: Bool,
}

/// Pointer motion event record (MotionNotify).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct XMotionEvent {
    pub type_: c_int,
    pub serial: c_ulong,
    pub send_event: Bool,
    pub display: *mut Display,
    pub window: Window,
    pub root: Window,
    pub subwindow: Window,
    pub time: Time,
    pub x: c_int,
    pub y: c_int,
    pub x_root: c_int,
    pub y_root: c_int,
    pub state: c_uint,
    pub is_hint: c_char,
    pub same_screen: Bool,
}

/// The generic event record: a 24-longword union, exactly the size the
/// server writes. Copies of this are what `XPutBackEvent` expects, which is
/// why decoded events keep one around verbatim.
#[repr(C)]
#[derive(Clone, Copy)]
pub union XEvent {
    pub type_: c_int,
    pub any: XAnyEvent,
    pub key: XKeyEvent,
    pub button: XButtonEvent,
    pub motion: XMotionEvent,
    pub pad: [c_long; 24],
}

/// Window state snapshot filled in by `XGetWindowAttributes`. The full
/// layout is declared because the server writes the whole record into
/// memory we own; only `map_state` is read.
#[repr(C)]
pub struct XWindowAttributes {
    pub x: c_int,
    pub y: c_int,
    pub width: c_int,
    pub height: c_int,
    pub border_width: c_int,
    pub depth: c_int,
    pub visual: *mut Visual,
    pub root: Window,
    pub class: c_int,
    pub bit_gravity: c_int,
    pub win_gravity: c_int,
    pub backing_store: c_int,
    pub backing_planes: c_ulong,
    pub backing_pixel: c_ulong,
    pub save_under: Bool,
    pub colormap: Colormap,
    pub map_installed: Bool,
    pub map_state: c_int,
    pub all_event_masks: c_long,
    pub your_event_mask: c_long,
    pub do_not_propagate_mask: c_long,
    pub override_redirect: Bool,
    pub screen: *mut Screen,
}

/// Function vector embedded in [`XImage`]. `XDestroyImage` is a macro over
/// `image->f.destroy_image`, not a dynamic symbol, so freeing an image from
/// a runtime binding has to go through this slot.
#[repr(C)]
pub struct XImageFuncs {
    pub create_image: *mut c_void,
    pub destroy_image: Option<unsafe extern "C" fn(*mut XImage) -> c_int>,
    pub get_pixel: *mut c_void,
    pub put_pixel: *mut c_void,
    pub sub_image: *mut c_void,
    pub add_pixel: *mut c_void,
}

/// Client-side image descriptor returned by `XCreateImage`. `data` points
/// at caller-owned pixels; detach it before destroying the image or Xlib
/// will free memory it does not own.
#[repr(C)]
pub struct XImage {
    pub width: c_int,
    pub height: c_int,
    pub xoffset: c_int,
    pub format: c_int,
    pub data: *mut c_char,
    pub byte_order: c_int,
    pub bitmap_unit: c_int,
    pub bitmap_bit_order: c_int,
    pub bitmap_pad: c_int,
    pub depth: c_int,
    pub bytes_per_line: c_int,
    pub bits_per_pixel: c_int,
    pub red_mask: c_ulong,
    pub green_mask: c_ulong,
    pub blue_mask: c_ulong,
    pub obdata: *mut c_char,
    pub f: XImageFuncs,
}

/// Polygon vertex for `XFillPolygon`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct XPoint {
    pub x: c_short,
    pub y: c_short,
}

// Protocol constants (X.h), limited to what the library uses.

pub const KEY_PRESS: c_int = 2;
pub const KEY_RELEASE: c_int = 3;
pub const BUTTON_PRESS: c_int = 4;
pub const BUTTON_RELEASE: c_int = 5;
pub const MOTION_NOTIFY: c_int = 6;

pub const KEY_PRESS_MASK: c_long = 1 << 0;
pub const KEY_RELEASE_MASK: c_long = 1 << 1;
pub const BUTTON_PRESS_MASK: c_long = 1 << 2;
pub const BUTTON_RELEASE_MASK: c_long = 1 << 3;
pub const POINTER_MOTION_MASK: c_long = 1 << 6;

/// `map_state` value once the window is mapped and visible.
pub const IS_VIEWABLE: c_int = 2;

pub const ZPIXMAP: c_int = 2;
pub const LINE_SOLID: c_int = 0;
pub const CAP_BUTT: c_int = 1;
pub const JOIN_MITER: c_int = 0;
pub const NONCONVEX: c_int = 1;
pub const COORD_MODE_ORIGIN: c_int = 0;

// Accessor helpers standing in for the Xlib macros of the same shape
// (DefaultScreen, RootWindow, DefaultVisual, WhitePixel, BlackPixel).

/// Index of the default screen for a connection.
///
/// # Safety
/// `display` must be a live pointer returned by `XOpenDisplay`.
pub unsafe fn default_screen(display: *mut Display) -> c_int {
    (*(display as *mut PrivDisplay)).default_screen
}

/// Pointer into the connection's screen array.
///
/// # Safety
/// `display` must be live and `screen` in `0..nscreens`.
pub unsafe fn screen_of_display(display: *mut Display, screen: c_int) -> *mut Screen {
    (*(display as *mut PrivDisplay)).screens.offset(screen as isize)
}

/// Root window of a screen.
///
/// # Safety
/// Same contract as [`screen_of_display`].
pub unsafe fn root_window(display: *mut Display, screen: c_int) -> Window {
    (*screen_of_display(display, screen)).root
}

/// Default visual of a screen.
///
/// # Safety
/// Same contract as [`screen_of_display`].
pub unsafe fn default_visual(display: *mut Display, screen: c_int) -> *mut Visual {
    (*screen_of_display(display, screen)).root_visual
}

/// White pixel value of a screen.
///
/// # Safety
/// Same contract as [`screen_of_display`].
pub unsafe fn white_pixel(display: *mut Display, screen: c_int) -> c_ulong {
    (*screen_of_display(display, screen)).white_pixel
}

/// Black pixel value of a screen.
///
/// # Safety
/// Same contract as [`screen_of_display`].
pub unsafe fn black_pixel(display: *mut Display, screen: c_int) -> c_ulong {
    (*screen_of_display(display, screen)).black_pixel
}

// The mirrors are useless if they drift from the real ABI, so the layout is
// asserted against the X11R7 64-bit values here.
#[cfg(all(test, target_pointer_width = "64"))]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn event_records_match_xlib_layout() {
        assert_eq!(size_of::<XEvent>(), 192);
        assert_eq!(size_of::<XKeyEvent>(), 96);
        assert_eq!(size_of::<XButtonEvent>(), 96);
        assert_eq!(size_of::<XMotionEvent>(), 96);
        assert_eq!(offset_of!(XKeyEvent, keycode), 84);
        assert_eq!(offset_of!(XButtonEvent, button), 84);
        assert_eq!(offset_of!(XButtonEvent, x), 64);
        assert_eq!(offset_of!(XButtonEvent, x_root), 72);
        assert_eq!(offset_of!(XMotionEvent, state), 80);
    }

    #[test]
    fn screen_matches_xlib_layout() {
        assert_eq!(size_of::<Screen>(), 128);
        assert_eq!(offset_of!(Screen, root), 16);
        assert_eq!(offset_of!(Screen, root_visual), 64);
        assert_eq!(offset_of!(Screen, white_pixel), 88);
        assert_eq!(offset_of!(Screen, black_pixel), 96);
    }

    #[test]
    fn display_prefix_matches_xlib_layout() {
        assert_eq!(offset_of!(PrivDisplay, fd), 16);
        assert_eq!(offset_of!(PrivDisplay, default_screen), 224);
        assert_eq!(offset_of!(PrivDisplay, nscreens), 228);
        assert_eq!(offset_of!(PrivDisplay, screens), 232);
    }

    #[test]
    fn window_attributes_match_xlib_layout() {
        assert_eq!(size_of::<XWindowAttributes>(), 136);
        assert_eq!(offset_of!(XWindowAttributes, map_state), 92);
    }

    #[test]
    fn image_matches_xlib_layout() {
        assert_eq!(size_of::<XImage>(), 136);
        assert_eq!(offset_of!(XImage, data), 16);
        assert_eq!(offset_of!(XImage, bytes_per_line), 44);
        assert_eq!(offset_of!(XImage, f), 88);
    }

    #[test]
    fn point_is_two_shorts() {
        assert_eq!(size_of::<XPoint>(), 4);
    }
}
