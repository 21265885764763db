//! Window handle and surface state
//!
//! One handle owns one display connection, one window, and one graphics
//! context. Opening the first window establishes the process-wide Xlib
//! binding; dropping the last one releases it. A handle can additionally
//! carry one connected caller-owned pixel buffer that
//! [`draw_flush`](WindowHandle::draw_flush) blits to the window.

use std::ffi::CString;
use std::mem;
use std::ptr;
use std::time::Duration;

use libc::{c_char, c_long};

use crate::error::OpenError;
use crate::xlib::abi::{self, Display, Gc, Window, XImage, XWindowAttributes};
use crate::xlib::binding::{self, XlibFns};
use crate::WindowConfig;

/// Input every window subscribes to at creation.
const INPUT_MASK: c_long = abi::KEY_PRESS_MASK
    | abi::KEY_RELEASE_MASK
    | abi::BUTTON_PRESS_MASK
    | abi::BUTTON_RELEASE_MASK
    | abi::POINTER_MOTION_MASK;

/// A caller-owned pixel buffer bound as the blit source.
struct ConnectedImage {
    image: *mut XImage,
    width: u32,
    height: u32,
}

/// An open window and the native resources behind it.
///
/// Dropping the handle tears everything down in order (connected image,
/// graphics context, window, connection) and releases its hold on the
/// runtime binding, so a handle cannot be closed twice. Holds raw native
/// pointers, so it is deliberately neither `Send` nor `Sync`; keep all
/// windows on one thread.
pub struct WindowHandle {
    fns: XlibFns,
    display: *mut Display,
    window: Window,
    gc: Gc,
    image: Option<ConnectedImage>,
    title: String,
    width: u32,
    height: u32,
    poll_interval: Duration,
}

impl WindowHandle {
    /// Opens a `width` x `height` window titled `title` with default
    /// configuration.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, OpenError> {
        Self::open_with(&WindowConfig {
            title: title.to_owned(),
            width,
            height,
            ..WindowConfig::default()
        })
    }

    /// Opens a window from a full configuration.
    ///
    /// Establishes the runtime binding (first window only), connects to the
    /// server, creates and maps the window, selects the input mask, and
    /// does not return until the server reports the window viewable.
    /// Drawing into a window that is not yet mapped would be silently
    /// dropped.
    pub fn open_with(config: &WindowConfig) -> Result<Self, OpenError> {
        let title = CString::new(config.title.as_str()).map_err(|_| OpenError::InvalidTitle)?;

        let fns = binding::acquire()?;
        let display = unsafe { (fns.open_display)(ptr::null()) };
        if display.is_null() {
            log::error!("unable to connect to the X server");
            binding::release();
            return Err(OpenError::DisplayUnavailable);
        }

        let window = unsafe {
            let screen = abi::default_screen(display);
            let root = abi::root_window(display, screen);
            let white = abi::white_pixel(display, screen);
            (fns.create_simple_window)(
                display,
                root,
                0,
                0,
                config.width,
                config.height,
                0,
                0x000000,
                white,
            )
        };

        unsafe {
            (fns.store_name)(display, window, title.as_ptr());
            (fns.select_input)(display, window, INPUT_MASK);
            (fns.map_window)(display, window);
        }
        let gc = unsafe { (fns.create_gc)(display, window, 0, ptr::null_mut()) };

        // The map request is asynchronous; spin on the attributes until the
        // server reports the window viewable.
        let mut attributes: XWindowAttributes = unsafe { mem::zeroed() };
        loop {
            unsafe { (fns.get_window_attributes)(display, window, &mut attributes) };
            if attributes.map_state == abi::IS_VIEWABLE {
                break;
            }
        }

        log::debug!(
            "opened {}x{} window {:?}",
            config.width,
            config.height,
            config.title
        );

        Ok(Self {
            fns,
            display,
            window,
            gc,
            image: None,
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    /// Binds a caller-owned pixel buffer (one 32-bit `0xRRGGBB` value per
    /// pixel, row-major) as the blit source for
    /// [`draw_flush`](Self::draw_flush). The pixels are not copied; every
    /// flush re-reads the buffer in place. At most one buffer can be
    /// connected per window; a second call fails and changes nothing.
    ///
    /// # Safety
    /// `buffer` must point to `width * height` readable `u32` values and
    /// must stay valid and at the same address for the remaining lifetime
    /// of the handle.
    pub unsafe fn connect_image(&mut self, buffer: *mut u32, width: u32, height: u32) -> bool {
        if self.image.is_some() {
            log::error!("window {:?} already has a connected image", self.title);
            return false;
        }

        let screen = abi::default_screen(self.display);
        let visual = abi::default_visual(self.display, screen);
        let image = (self.fns.create_image)(
            self.display,
            visual,
            24,
            abi::ZPIXMAP,
            0,
            buffer as *mut c_char,
            width,
            height,
            32,
            0,
        );
        if image.is_null() {
            log::error!("could not create a {}x{} image", width, height);
            return false;
        }

        self.image = Some(ConnectedImage {
            image,
            width,
            height,
        });
        true
    }

    /// Blits the connected buffer (if any) over the window, then flushes
    /// every buffered drawing command to the server.
    ///
    /// This is the only synchronization point. Primitive draw calls are
    /// independent unbuffered requests, so whether they end up above or
    /// below the blit is decided purely by call order. The blit overwrites
    /// the region it covers.
    pub fn draw_flush(&mut self) -> bool {
        if let Some(connected) = &self.image {
            unsafe {
                (self.fns.put_image)(
                    self.display,
                    self.window,
                    self.gc,
                    connected.image,
                    0,
                    0,
                    0,
                    0,
                    connected.width,
                    connected.height,
                )
            };
        }
        unsafe { (self.fns.flush)(self.display) != 0 }
    }

    /// The title given at creation.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Width in pixels, as declared at creation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels, as declared at creation.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Declared (width, height) in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Closes the window, releasing every native resource it owns. Purely
    /// an explicit spelling of dropping the handle.
    pub fn close(self) {}

    pub(crate) fn fns(&self) -> &XlibFns {
        &self.fns
    }

    pub(crate) fn display(&self) -> *mut Display {
        self.display
    }

    pub(crate) fn window_id(&self) -> Window {
        self.window
    }

    pub(crate) fn gc(&self) -> Gc {
        self.gc
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Drop for WindowHandle {
    fn drop(&mut self) {
        unsafe {
            if let Some(connected) = self.image.take() {
                // The pixels belong to the caller; detach them before the
                // image destructor runs so Xlib does not free them.
                (*connected.image).data = ptr::null_mut();
                if let Some(destroy) = (*connected.image).f.destroy_image {
                    destroy(connected.image);
                }
            }
            (self.fns.free_gc)(self.display, self.gc);
            (self.fns.destroy_window)(self.display, self.window);
            (self.fns.close_display)(self.display);
        }
        binding::release();
        log::debug!("closed window {:?}", self.title);
    }
}
