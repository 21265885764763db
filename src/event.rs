//! Event retrieval, translation, and requeueing
//!
//! The native queue only supports destructive dequeue plus single-item
//! front insertion (`XPutBackEvent`). Non-destructive scanning is layered on
//! top as a drain-filter-restore protocol: pop the pending events, keep the
//! ones an inspection does not consume, and feed the kept batch back
//! most-recently-popped first so the original order is rebuilt at the front
//! of the queue. That protocol lives in one place ([`scan_for`]) and is
//! shared by every consumer that needs to peek, including the timed key
//! wait.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::window::WindowHandle;
use crate::xlib::abi::{self, XEvent};

/// Left pointer button.
pub const BUTTON_LEFT: u32 = 1;
/// Middle pointer button (wheel click).
pub const BUTTON_MIDDLE: u32 = 2;
/// Right pointer button.
pub const BUTTON_RIGHT: u32 = 3;
/// Wheel scroll up.
pub const BUTTON_SCROLL_UP: u32 = 4;
/// Wheel scroll down.
pub const BUTTON_SCROLL_DOWN: u32 = 5;

/// Floor for the timed wait's polling quantum. Requests below this would
/// busy-spin against the server.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Decoded event fields.
///
/// Key events carry the raw server key code; pointer events carry the button
/// number and both window-relative and screen-relative coordinates. Anything
/// the library does not decode (expose, configure, ...) comes through as
/// [`EventKind::Other`] so callers can still count and forward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A key went down.
    KeyPress { key_code: u32 },

    /// A key came back up.
    KeyRelease { key_code: u32 },

    /// A pointer button went down.
    ButtonPress {
        button: u32,
        x: i32,
        y: i32,
        x_root: i32,
        y_root: i32,
    },

    /// A pointer button came back up.
    ButtonRelease {
        button: u32,
        x: i32,
        y: i32,
        x_root: i32,
        y_root: i32,
    },

    /// The pointer moved inside the window.
    Motion {
        x: i32,
        y: i32,
        x_root: i32,
        y_root: i32,
    },

    /// Any event type the library does not decode.
    Other { type_code: i32 },
}

/// One event popped from the queue.
///
/// Alongside the decoded fields, the exact native record is retained: a
/// push-back must hand the server the bytes it produced, not a
/// reconstruction, or fields the library does not decode would be lost on
/// replay.
#[derive(Clone, Copy)]
pub struct Event {
    kind: EventKind,
    raw: XEvent,
}

impl Event {
    pub(crate) fn from_raw(raw: XEvent) -> Self {
        let kind = unsafe {
            match raw.type_ {
                abi::KEY_PRESS => EventKind::KeyPress {
                    key_code: raw.key.keycode as u32,
                },
                abi::KEY_RELEASE => EventKind::KeyRelease {
                    key_code: raw.key.keycode as u32,
                },
                abi::BUTTON_PRESS => {
                    let ev = raw.button;
                    EventKind::ButtonPress {
                        button: ev.button as u32,
                        x: ev.x as i32,
                        y: ev.y as i32,
                        x_root: ev.x_root as i32,
                        y_root: ev.y_root as i32,
                    }
                }
                abi::BUTTON_RELEASE => {
                    let ev = raw.button;
                    EventKind::ButtonRelease {
                        button: ev.button as u32,
                        x: ev.x as i32,
                        y: ev.y as i32,
                        x_root: ev.x_root as i32,
                        y_root: ev.y_root as i32,
                    }
                }
                abi::MOTION_NOTIFY => {
                    let ev = raw.motion;
                    EventKind::Motion {
                        x: ev.x as i32,
                        y: ev.y as i32,
                        x_root: ev.x_root as i32,
                        y_root: ev.y_root as i32,
                    }
                }
                other => EventKind::Other {
                    type_code: other as i32,
                },
            }
        };
        Self { kind, raw }
    }

    /// The decoded fields.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// True for a KeyPress of exactly this key code.
    pub fn is_key_press(&self, key_code: u32) -> bool {
        matches!(self.kind, EventKind::KeyPress { key_code: k } if k == key_code)
    }

    pub(crate) fn raw(&self) -> &XEvent {
        &self.raw
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.kind, f)
    }
}

/// The queue operations the scanning protocol needs. [`WindowHandle`]
/// implements this over the native calls; tests drive the same protocol
/// against an in-memory queue.
pub(crate) trait EventSource {
    /// Number of events currently queued.
    fn pending(&mut self) -> usize;
    /// Destructively pops the oldest event. Blocks if the queue is empty.
    fn next(&mut self) -> Event;
    /// Re-inserts an event at the front: it becomes the next one popped.
    fn put_back(&mut self, event: &Event);
}

/// Pops up to the currently-pending number of events looking for the first
/// match. Non-matching events popped along the way are restored at the
/// front in their original relative order; on a match, everything behind
/// the match that was never popped stays queued untouched.
pub(crate) fn scan_for<S, F>(source: &mut S, pred: F) -> Option<Event>
where
    S: EventSource,
    F: Fn(&Event) -> bool,
{
    let pending = source.pending();
    let mut kept: Vec<Event> = Vec::with_capacity(pending);
    let mut found = None;
    for _ in 0..pending {
        let event = source.next();
        if pred(&event) {
            found = Some(event);
            break;
        }
        kept.push(event);
    }
    // The native primitive inserts one item at the front, so restoring the
    // batch most-recently-popped first rebuilds the original order.
    for event in kept.iter().rev() {
        source.put_back(event);
    }
    found
}

/// Polls for a KeyPress of `key_code`, restoring every unrelated event.
/// `timeout` of zero waits indefinitely; otherwise gives up once the
/// accumulated sleep time reaches it. The quantum is floored at
/// [`MIN_POLL_INTERVAL`].
pub(crate) fn wait_for_key_on<S: EventSource>(
    source: &mut S,
    key_code: u32,
    timeout: Duration,
    quantum: Duration,
) -> bool {
    let quantum = quantum.max(MIN_POLL_INTERVAL);
    let mut elapsed = Duration::ZERO;
    loop {
        if scan_for(source, |event| event.is_key_press(key_code)).is_some() {
            return true;
        }
        if !timeout.is_zero() && elapsed >= timeout {
            return false;
        }
        thread::sleep(quantum);
        elapsed += quantum;
    }
}

impl EventSource for WindowHandle {
    fn pending(&mut self) -> usize {
        let count = unsafe { (self.fns().pending)(self.display()) };
        count.max(0) as usize
    }

    fn next(&mut self) -> Event {
        let mut raw: XEvent = unsafe { std::mem::zeroed() };
        unsafe { (self.fns().next_event)(self.display(), &mut raw) };
        Event::from_raw(raw)
    }

    fn put_back(&mut self, event: &Event) {
        let mut raw = *event.raw();
        unsafe { (self.fns().put_back_event)(self.display(), &mut raw) };
    }
}

impl WindowHandle {
    /// Number of events waiting in this window's queue. Call before
    /// [`next_event`](Self::next_event) in a polling loop, since
    /// `next_event` blocks when the queue is empty.
    pub fn pending_events(&mut self) -> usize {
        EventSource::pending(self)
    }

    /// Pops and decodes the oldest queued event, blocking if none is
    /// pending.
    pub fn next_event(&mut self) -> Event {
        EventSource::next(self)
    }

    /// Hands an event back to the queue front, making it the next event
    /// [`next_event`](Self::next_event) returns. To restore several popped
    /// events in their original order, push them back in reverse pop order.
    pub fn push_back(&mut self, event: &Event) {
        EventSource::put_back(self, event)
    }

    /// Scans the currently-pending events for the first one matching
    /// `pred`, consuming only that one. Non-matching events stay queued in
    /// their original order, so other consumers still see them.
    pub fn next_event_matching<F>(&mut self, pred: F) -> Option<Event>
    where
        F: Fn(&Event) -> bool,
    {
        scan_for(self, pred)
    }

    /// Waits for a KeyPress of `key_code`, preserving all other events.
    ///
    /// A zero `timeout` waits indefinitely. Returns false once the
    /// accumulated wait reaches a nonzero `timeout` without the key being
    /// seen. The poll interval comes from the window's configuration.
    pub fn wait_for_key(&mut self, key_code: u32, timeout: Duration) -> bool {
        let quantum = self.poll_interval();
        wait_for_key_on(self, key_code, timeout, quantum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlib::abi::{XButtonEvent, XKeyEvent, XMotionEvent};
    use std::collections::VecDeque;
    use std::time::Instant;

    /// In-memory stand-in for the server-side queue: FIFO pop, front
    /// insertion, no peek. The same contract the native pump gives us.
    struct SimulatedQueue {
        events: VecDeque<Event>,
    }

    impl SimulatedQueue {
        fn new(events: Vec<Event>) -> Self {
            Self {
                events: events.into(),
            }
        }

        fn kinds(&self) -> Vec<EventKind> {
            self.events.iter().map(|e| e.kind()).collect()
        }
    }

    impl EventSource for SimulatedQueue {
        fn pending(&mut self) -> usize {
            self.events.len()
        }

        fn next(&mut self) -> Event {
            self.events.pop_front().expect("next() on empty queue")
        }

        fn put_back(&mut self, event: &Event) {
            self.events.push_front(*event);
        }
    }

    fn key_press(key_code: u32) -> Event {
        let mut key: XKeyEvent = unsafe { std::mem::zeroed() };
        key.type_ = abi::KEY_PRESS;
        key.keycode = key_code;
        let mut raw: XEvent = unsafe { std::mem::zeroed() };
        raw.key = key;
        Event::from_raw(raw)
    }

    fn button_press(button: u32) -> Event {
        let mut press: XButtonEvent = unsafe { std::mem::zeroed() };
        press.type_ = abi::BUTTON_PRESS;
        press.button = button;
        press.x = 10;
        press.y = 20;
        press.x_root = 110;
        press.y_root = 220;
        let mut raw: XEvent = unsafe { std::mem::zeroed() };
        raw.button = press;
        Event::from_raw(raw)
    }

    fn button_press_kind(button: u32) -> EventKind {
        EventKind::ButtonPress {
            button,
            x: 10,
            y: 20,
            x_root: 110,
            y_root: 220,
        }
    }

    #[test]
    fn translation_decodes_each_kind() {
        assert_eq!(key_press(65).kind(), EventKind::KeyPress { key_code: 65 });
        assert_eq!(button_press(BUTTON_LEFT).kind(), button_press_kind(1));

        let mut motion: XMotionEvent = unsafe { std::mem::zeroed() };
        motion.type_ = abi::MOTION_NOTIFY;
        motion.x = 3;
        motion.y = 4;
        let mut raw: XEvent = unsafe { std::mem::zeroed() };
        raw.motion = motion;
        assert_eq!(
            Event::from_raw(raw).kind(),
            EventKind::Motion {
                x: 3,
                y: 4,
                x_root: 0,
                y_root: 0,
            }
        );

        let mut raw: XEvent = unsafe { std::mem::zeroed() };
        raw.type_ = 12; // Expose
        assert_eq!(
            Event::from_raw(raw).kind(),
            EventKind::Other { type_code: 12 }
        );
    }

    #[test]
    fn drain_all_restore_all_preserves_fifo_order() {
        let original = vec![
            key_press(65),
            button_press(1),
            key_press(38),
            button_press(3),
            key_press(9),
        ];
        let expected: Vec<EventKind> = original.iter().map(|e| e.kind()).collect();
        let mut queue = SimulatedQueue::new(original);

        let mut drained = Vec::new();
        while queue.pending() > 0 {
            drained.push(queue.next());
        }
        for event in drained.iter().rev() {
            queue.put_back(event);
        }

        assert_eq!(queue.kinds(), expected);
    }

    #[test]
    fn pending_counts_restored_events() {
        let mut queue = SimulatedQueue::new(vec![
            key_press(1),
            key_press(2),
            key_press(3),
            key_press(4),
            key_press(5),
        ]);

        let a = queue.next();
        let b = queue.next();
        let _dropped = queue.next();
        queue.put_back(&b);
        queue.put_back(&a);

        // 2 never drained, 2 restored.
        assert_eq!(queue.pending(), 4);
        assert_eq!(
            queue.kinds()[..2],
            [
                EventKind::KeyPress { key_code: 1 },
                EventKind::KeyPress { key_code: 2 },
            ]
        );
    }

    #[test]
    fn scan_consumes_match_and_restores_the_rest_in_order() {
        let mut queue = SimulatedQueue::new(vec![key_press(65), button_press(1), key_press(9)]);

        let found = scan_for(&mut queue, |event| event.is_key_press(9));

        assert_eq!(
            found.map(|e| e.kind()),
            Some(EventKind::KeyPress { key_code: 9 })
        );
        assert_eq!(
            queue.kinds(),
            vec![EventKind::KeyPress { key_code: 65 }, button_press_kind(1)]
        );
    }

    #[test]
    fn scan_without_match_restores_everything() {
        let original = vec![key_press(65), button_press(1), key_press(38)];
        let expected: Vec<EventKind> = original.iter().map(|e| e.kind()).collect();
        let mut queue = SimulatedQueue::new(original);

        let found = scan_for(&mut queue, |event| event.is_key_press(9));

        assert!(found.is_none());
        assert_eq!(queue.kinds(), expected);
    }

    #[test]
    fn scan_stops_at_the_match_and_leaves_later_events_alone() {
        let mut queue = SimulatedQueue::new(vec![
            button_press(1),
            key_press(9),
            key_press(65),
            button_press(3),
        ]);

        let found = scan_for(&mut queue, |event| event.is_key_press(9));

        assert!(found.is_some());
        // The first button press was restored ahead of the two events that
        // were never popped.
        assert_eq!(
            queue.kinds(),
            vec![
                button_press_kind(1),
                EventKind::KeyPress { key_code: 65 },
                button_press_kind(3),
            ]
        );
    }

    #[test]
    fn wait_finds_a_pending_key_immediately() {
        let mut queue = SimulatedQueue::new(vec![button_press(1), key_press(9)]);

        let found = wait_for_key_on(
            &mut queue,
            9,
            Duration::from_millis(50),
            Duration::from_millis(1),
        );

        assert!(found);
        assert_eq!(queue.kinds(), vec![button_press_kind(1)]);
    }

    #[test]
    fn wait_times_out_and_restores_scanned_events() {
        let original = vec![button_press(1), key_press(65)];
        let expected: Vec<EventKind> = original.iter().map(|e| e.kind()).collect();
        let mut queue = SimulatedQueue::new(original);

        let start = Instant::now();
        let found = wait_for_key_on(
            &mut queue,
            9,
            Duration::from_millis(10),
            Duration::from_millis(2),
        );

        assert!(!found);
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert_eq!(queue.kinds(), expected);
    }

    /// A queue where the target key only shows up after a few polls, to
    /// exercise the indefinite wait.
    struct LateArrival {
        inner: SimulatedQueue,
        polls: usize,
    }

    impl EventSource for LateArrival {
        fn pending(&mut self) -> usize {
            self.polls += 1;
            if self.polls == 3 {
                self.inner.events.push_back(key_press(9));
            }
            self.inner.pending()
        }

        fn next(&mut self) -> Event {
            self.inner.next()
        }

        fn put_back(&mut self, event: &Event) {
            self.inner.put_back(event)
        }
    }

    #[test]
    fn zero_timeout_waits_until_the_key_arrives() {
        let mut queue = LateArrival {
            inner: SimulatedQueue::new(vec![button_press(1)]),
            polls: 0,
        };

        let found = wait_for_key_on(&mut queue, 9, Duration::ZERO, Duration::from_millis(1));

        assert!(found);
        // The unrelated press survived every scan in place.
        assert_eq!(queue.inner.kinds(), vec![button_press_kind(1)]);
    }
}
