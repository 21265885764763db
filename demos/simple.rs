//! Draws a few primitives and echoes input events until Escape is pressed.

use std::process;

use xlite::{EventKind, WindowHandle};

/// X key code for Escape on common layouts.
const ESCAPE: u32 = 9;

fn main() {
    env_logger::init();

    let mut window = match WindowHandle::open("simple", 640, 480) {
        Ok(window) => window,
        Err(err) => {
            eprintln!("could not open window: {err}");
            process::exit(1);
        }
    };

    loop {
        while window.pending_events() > 0 {
            let event = window.next_event();
            match event.kind() {
                EventKind::KeyPress { key_code: ESCAPE } => return,
                EventKind::KeyPress { key_code } => println!("pressed: {key_code}"),
                EventKind::ButtonPress { button, x, y, .. } => {
                    println!("button {button} at ({x}, {y})")
                }
                _ => {}
            }
        }

        window.draw_line(75, 100, 50, 10, 4, 0x00FFFF);
        window.draw_rectangle(75, 100, 50, 10, true, 0x00FF00);
        window.draw_circle(100, 100, 50, false, 0xFF0000);
        window.draw_triangle(100, 100, 90, 150, 130, 140, 0x0000FF);
        window.draw_text(20, 30, "press Escape to quit", 0x000000);
        window.draw_flush();

        xlite::sleep_ms(33);
    }
}
