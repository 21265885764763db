//! Primitive drawing operations
//!
//! Thin forwarders over the graphics context. Each call is an unbuffered
//! native request that the server applies on receipt, independently of
//! [`draw_flush`](crate::WindowHandle::draw_flush); every call reports
//! success through the native return status.
//!
//! Colors are packed `0xRRGGBB`.

use std::ffi::CString;

use libc::{c_int, c_short, c_ulong};

use crate::window::WindowHandle;
use crate::xlib::abi::{self, XPoint};

impl WindowHandle {
    fn set_foreground(&mut self, color: u32) {
        unsafe { (self.fns().set_foreground)(self.display(), self.gc(), color as c_ulong) };
    }

    /// Repaints the whole window with `color`, wiping previous draws.
    pub fn clear_background(&mut self, color: u32) -> bool {
        unsafe {
            (self.fns().set_window_background)(self.display(), self.window_id(), color as c_ulong);
            (self.fns().clear_window)(self.display(), self.window_id()) != 0
        }
    }

    /// Draws `text` with its baseline starting at (`x`, `y`), using the
    /// graphics context's default font.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: u32) -> bool {
        let Ok(ctext) = CString::new(text) else {
            log::warn!("text with interior NUL not drawn");
            return false;
        };
        self.set_foreground(color);
        unsafe {
            (self.fns().draw_string)(
                self.display(),
                self.window_id(),
                self.gc(),
                x,
                y,
                ctext.as_ptr(),
                text.len() as c_int,
            ) != 0
        }
    }

    /// Draws a `width` x `height` rectangle with its top-left corner at
    /// (`x`, `y`), outlined or filled.
    pub fn draw_rectangle(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        fill: bool,
        color: u32,
    ) -> bool {
        self.set_foreground(color);
        let status = unsafe {
            if fill {
                (self.fns().fill_rectangle)(
                    self.display(),
                    self.window_id(),
                    self.gc(),
                    x,
                    y,
                    width,
                    height,
                )
            } else {
                (self.fns().draw_rectangle)(
                    self.display(),
                    self.window_id(),
                    self.gc(),
                    x,
                    y,
                    width,
                    height,
                )
            }
        };
        status != 0
    }

    /// Draws a `width`-pixel-thick line from (`x0`, `y0`) to (`x1`, `y1`).
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, width: u32, color: u32) -> bool {
        unsafe {
            (self.fns().set_line_attributes)(
                self.display(),
                self.gc(),
                width,
                abi::LINE_SOLID,
                abi::CAP_BUTT,
                abi::JOIN_MITER,
            );
        }
        self.set_foreground(color);
        unsafe {
            (self.fns().draw_line)(self.display(), self.window_id(), self.gc(), x0, y0, x1, y1)
                != 0
        }
    }

    /// Draws a circle of radius `r` centered on (`x`, `y`), outlined or
    /// filled.
    pub fn draw_circle(&mut self, x: i32, y: i32, r: i32, fill: bool, color: u32) -> bool {
        self.set_foreground(color);
        let diameter = (2 * r) as u32;
        let status = unsafe {
            if fill {
                (self.fns().fill_arc)(
                    self.display(),
                    self.window_id(),
                    self.gc(),
                    x - r,
                    y - r,
                    diameter,
                    diameter,
                    0,
                    360 * 64,
                )
            } else {
                (self.fns().draw_arc)(
                    self.display(),
                    self.window_id(),
                    self.gc(),
                    x - r,
                    y - r,
                    diameter,
                    diameter,
                    0,
                    360 * 64,
                )
            }
        };
        status != 0
    }

    /// Sets the single pixel at (`x`, `y`).
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u32) -> bool {
        self.set_foreground(color);
        unsafe {
            (self.fns().draw_point)(self.display(), self.window_id(), self.gc(), x, y) != 0
        }
    }

    /// Draws a filled triangle over the three given vertices. Coordinates
    /// are truncated to the native 16-bit vertex range.
    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: u32,
    ) -> bool {
        self.set_foreground(color);
        let mut points = [
            XPoint {
                x: x0 as c_short,
                y: y0 as c_short,
            },
            XPoint {
                x: x1 as c_short,
                y: y1 as c_short,
            },
            XPoint {
                x: x2 as c_short,
                y: y2 as c_short,
            },
        ];
        unsafe {
            (self.fns().fill_polygon)(
                self.display(),
                self.window_id(),
                self.gc(),
                points.as_mut_ptr(),
                points.len() as c_int,
                abi::NONCONVEX,
                abi::COORD_MODE_ORIGIN,
            ) != 0
        }
    }
}
