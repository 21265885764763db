//! Connects a caller-owned pixel buffer and animates it with full-frame
//! blits. The buffer is written in place each frame; draw_flush re-reads it.

use std::process;
use std::time::Duration;

use xlite::WindowHandle;

/// X key code for Escape on common layouts.
const ESCAPE: u32 = 9;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn main() {
    env_logger::init();

    let mut framebuffer = vec![0u32; (WIDTH * HEIGHT) as usize];
    let mut window = match WindowHandle::open("pixels", WIDTH, HEIGHT) {
        Ok(window) => window,
        Err(err) => {
            eprintln!("could not open window: {err}");
            process::exit(1);
        }
    };

    // The buffer outlives the window and is never reallocated, as
    // connect_image requires.
    if !unsafe { window.connect_image(framebuffer.as_mut_ptr(), WIDTH, HEIGHT) } {
        eprintln!("could not connect the pixel buffer");
        process::exit(1);
    }

    let mut frame: u32 = 0;
    loop {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let r = (x + frame) & 0xFF;
                let g = (y + frame) & 0xFF;
                let b = (x ^ y) & 0xFF;
                framebuffer[(y * WIDTH + x) as usize] = (r << 16) | (g << 8) | b;
            }
        }
        window.draw_flush();
        frame = frame.wrapping_add(1);

        // Doubles as the frame delay: scans the queue for Escape, keeping
        // every other event, and sleeps out the rest of the timeout.
        if window.wait_for_key(ESCAPE, Duration::from_millis(33)) {
            return;
        }
    }
}
