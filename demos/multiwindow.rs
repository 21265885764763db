//! Two windows driven round-robin from a single thread: each has its own
//! connection and queue, while both share one runtime Xlib binding.

use std::process;

use xlite::{EventKind, WindowHandle};

/// X key code for Escape on common layouts.
const ESCAPE: u32 = 9;

fn open_or_exit(title: &str, width: u32, height: u32) -> WindowHandle {
    match WindowHandle::open(title, width, height) {
        Ok(window) => window,
        Err(err) => {
            eprintln!("could not open window {title:?}: {err}");
            process::exit(1);
        }
    }
}

fn draw(window: &mut WindowHandle, color: u32, with_circle: bool) {
    window.draw_line(75, 100, 50, 10, 4, color);
    window.draw_rectangle(75, 100, 50, 10, true, 0x00FF00);
    if with_circle {
        window.draw_circle(100, 100, 50, false, 0xFF0000);
    }
    window.draw_triangle(100, 100, 90, 150, 130, 140, color);
    window.draw_flush();
}

/// Reports this window's input; true once Escape is pressed in it.
fn drain(window: &mut WindowHandle) -> bool {
    while window.pending_events() > 0 {
        let event = window.next_event();
        match event.kind() {
            EventKind::KeyPress { key_code: ESCAPE } => return true,
            EventKind::KeyPress { key_code } => {
                println!("{}: pressed {key_code}", window.title())
            }
            EventKind::ButtonPress { button, x, y, .. } => {
                println!("{}: button {button} at ({x}, {y})", window.title())
            }
            _ => {}
        }
    }
    false
}

fn main() {
    env_logger::init();

    let mut left = open_or_exit("left", 400, 300);
    let mut right = open_or_exit("right", 400, 300);

    loop {
        draw(&mut left, 0x00FFFF, true);
        draw(&mut right, 0xFF00FF, false);
        if drain(&mut left) || drain(&mut right) {
            return;
        }
        xlite::sleep_ms(33);
    }
}
