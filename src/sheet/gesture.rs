use super::settle::SettleTimer;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Downward drag distance, in logical pixels, past which releasing the handle
/// asks the host to close the sheet
pub(crate) const DISMISS_THRESHOLD: u32 = 80;

/// Whether pointer input is currently routed to the sheet regardless of where
/// on screen it lands.  Cloning yields another view of the same scope.
#[derive(Clone, Debug, Default)]
pub(crate) struct CaptureScope {
    holders: Rc<Cell<usize>>,
}

impl CaptureScope {
    pub(crate) fn new() -> CaptureScope {
        CaptureScope::default()
    }

    pub(crate) fn acquire(&self) -> CaptureGuard {
        self.holders.set(self.holders.get() + 1);
        CaptureGuard {
            holders: Rc::clone(&self.holders),
        }
    }

    pub(crate) fn is_captured(&self) -> bool {
        self.holders.get() > 0
    }
}

/// Keeps the capture scope held until dropped
#[derive(Debug)]
pub(crate) struct CaptureGuard {
    holders: Rc<Cell<usize>>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.holders.set(self.holders.get().saturating_sub(1));
    }
}

/// One press-drag-release of the sheet's handle
#[derive(Debug)]
struct GestureSession {
    origin_y: i32,
    current_offset: u32,
    _capture: CaptureGuard,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Transition {
    /// The sheet follows the pointer 1:1
    Immediate,
    /// Offset changes are animated
    Eased,
}

/// What a pointer release did
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Release {
    /// No drag was in progress
    Ignored,
    /// The drag was too short and the sheet returns to rest
    SnappedBack,
    /// The close callback was invoked
    Dismissed,
}

/// Drag-to-dismiss state machine for a bottom sheet.
///
/// The sheet's open/closed state belongs to the host: the controller only
/// asks for the sheet to be closed via the callback passed to
/// [`DragDismiss::pointer_up`] and is told of open/close changes through
/// [`DragDismiss::sync_open`].
#[derive(Debug)]
pub(crate) struct DragDismiss {
    scope: CaptureScope,
    // Some iff dragging
    session: Option<GestureSession>,
    offset: u32,
    transition: Transition,
    was_open: bool,
    settle: SettleTimer,
}

impl DragDismiss {
    pub(crate) fn new(scope: CaptureScope) -> DragDismiss {
        DragDismiss {
            scope,
            session: None,
            offset: 0,
            transition: Transition::Eased,
            was_open: false,
            settle: SettleTimer::new(),
        }
    }

    pub(crate) fn offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn transition(&self) -> Transition {
        self.transition
    }

    /// Starts a drag at pointer height `y`.  A drag already in progress is
    /// abandoned; its offset is not carried over.
    pub(crate) fn pointer_down(&mut self, y: i32) {
        if self.session.take().is_some() {
            tracing::debug!("pointer down during drag; restarting gesture");
        }
        self.session = Some(GestureSession {
            origin_y: y,
            current_offset: 0,
            _capture: self.scope.acquire(),
        });
        self.offset = 0;
        self.transition = Transition::Immediate;
    }

    pub(crate) fn pointer_move(&mut self, y: i32) {
        if let Some(session) = self.session.as_mut() {
            session.current_offset = u32::try_from(y.saturating_sub(session.origin_y)).unwrap_or(0);
            self.offset = session.current_offset;
        }
    }

    /// Ends the drag.  If the sheet was pulled down further than
    /// `DISMISS_THRESHOLD`, `on_close` is called; otherwise the sheet snaps
    /// back to rest.
    pub(crate) fn pointer_up<F: FnOnce()>(&mut self, on_close: F) -> Release {
        let Some(session) = self.session.take() else {
            return Release::Ignored;
        };
        let offset = session.current_offset;
        drop(session);
        self.transition = Transition::Eased;
        if offset > DISMISS_THRESHOLD {
            tracing::debug!(offset, "drag past threshold; requesting close");
            on_close();
            Release::Dismissed
        } else {
            tracing::trace!(offset, "drag released under threshold");
            self.offset = 0;
            Release::SnappedBack
        }
    }

    /// An interrupted drag (focus loss, resize) ends exactly like a release
    pub(crate) fn pointer_cancel<F: FnOnce()>(&mut self, on_close: F) -> Release {
        self.pointer_up(on_close)
    }

    /// Informs the controller of the host's current open state.  Closing
    /// schedules the offset reset; reopening before it fires cancels it and
    /// applies the reset at once, so the sheet always opens at rest.
    pub(crate) fn sync_open(&mut self, is_open: bool, now: Instant) {
        if is_open == self.was_open {
            return;
        }
        self.was_open = is_open;
        if is_open {
            if self.session.is_none() {
                self.offset = 0;
                self.transition = Transition::Eased;
            }
            if self.settle.cancel() {
                tracing::trace!("sheet reopened before settling");
            }
        } else {
            self.session = None;
            self.settle.schedule(now);
        }
    }

    /// Runs the settle reset if it is due
    pub(crate) fn tick(&mut self, now: Instant) {
        if self.settle.fire(now) {
            self.offset = 0;
            self.transition = Transition::Eased;
        }
    }

    /// How long the event loop may sleep before `tick()` has work to do
    pub(crate) fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.settle.remaining(now)
    }

    /// Releases everything the controller holds: the capture scope of an
    /// active drag and any pending reset
    pub(crate) fn teardown(&mut self) {
        self.session = None;
        self.settle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::super::settle::SETTLE_DELAY;
    use super::*;

    fn controller() -> (DragDismiss, CaptureScope) {
        let scope = CaptureScope::new();
        let mut drag = DragDismiss::new(scope.clone());
        drag.sync_open(true, Instant::now());
        (drag, scope)
    }

    #[test]
    fn test_short_drag_snaps_back() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        assert!(scope.is_captured());
        drag.pointer_move(150);
        assert_eq!(drag.offset(), 50);
        assert!(drag.is_dragging());
        assert_eq!(drag.transition(), Transition::Immediate);
        let mut closes = 0;
        assert_eq!(drag.pointer_up(|| closes += 1), Release::SnappedBack);
        assert_eq!(closes, 0);
        assert_eq!(drag.offset(), 0);
        assert_eq!(drag.transition(), Transition::Eased);
        assert!(!drag.is_dragging());
        assert!(!scope.is_captured());
    }

    #[test]
    fn test_long_drag_dismisses_once() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(200);
        assert_eq!(drag.offset(), 100);
        let mut closes = 0;
        assert_eq!(drag.pointer_up(|| closes += 1), Release::Dismissed);
        assert_eq!(drag.pointer_up(|| closes += 1), Release::Ignored);
        assert_eq!(closes, 1);
        assert!(!scope.is_captured());
        // The offset is held until the host closes and the sheet settles
        assert_eq!(drag.offset(), 100);
    }

    #[test]
    fn test_exactly_threshold_does_not_dismiss() {
        let (mut drag, _scope) = controller();
        drag.pointer_down(0);
        drag.pointer_move(80);
        let mut closed = false;
        assert_eq!(drag.pointer_up(|| closed = true), Release::SnappedBack);
        assert!(!closed);
    }

    #[test]
    fn test_upward_motion_clamps_to_zero() {
        let (mut drag, _scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(40);
        assert_eq!(drag.offset(), 0);
        drag.pointer_move(130);
        assert_eq!(drag.offset(), 30);
        drag.pointer_move(99);
        assert_eq!(drag.offset(), 0);
        drag.pointer_move(i32::MIN);
        assert_eq!(drag.offset(), 0);
    }

    #[test]
    fn test_cancel_behaves_like_release() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(150);
        let mut closed = false;
        assert_eq!(drag.pointer_cancel(|| closed = true), Release::SnappedBack);
        assert!(!closed);
        assert!(!drag.is_dragging());
        assert!(!scope.is_captured());
        // Nothing is listening any more
        drag.pointer_move(400);
        assert_eq!(drag.offset(), 0);

        drag.pointer_down(100);
        drag.pointer_move(300);
        assert_eq!(drag.pointer_cancel(|| closed = true), Release::Dismissed);
        assert!(closed);
        assert!(!scope.is_captured());
    }

    #[test]
    fn test_second_pointer_down_restarts() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(160);
        drag.pointer_down(300);
        assert_eq!(drag.offset(), 0);
        drag.pointer_move(350);
        assert_eq!(drag.offset(), 50);
        assert_eq!(drag.pointer_up(|| ()), Release::SnappedBack);
        assert!(!scope.is_captured());
    }

    #[test]
    fn test_offset_resets_after_settle() {
        let (mut drag, _scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(250);
        let mut open = true;
        drag.pointer_up(|| open = false);
        assert!(!open);
        let t0 = Instant::now();
        drag.sync_open(open, t0);
        assert_eq!(drag.next_deadline(t0), Some(SETTLE_DELAY));
        drag.tick(t0 + Duration::from_millis(299));
        assert_eq!(drag.offset(), 150);
        drag.tick(t0 + SETTLE_DELAY);
        assert_eq!(drag.offset(), 0);
        assert_eq!(drag.next_deadline(t0), None);
    }

    #[test]
    fn test_reopen_cancels_pending_reset() {
        let (mut drag, _scope) = controller();
        let t0 = Instant::now();
        drag.sync_open(false, t0);
        drag.sync_open(true, t0 + Duration::from_millis(100));
        drag.pointer_down(100);
        drag.pointer_move(140);
        drag.tick(t0 + Duration::from_secs(1));
        assert_eq!(drag.offset(), 40);
    }

    #[test]
    fn test_reopen_while_settling_starts_at_rest() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.pointer_move(228);
        let mut open = true;
        assert_eq!(drag.pointer_up(|| open = false), Release::Dismissed);
        let t0 = Instant::now();
        drag.sync_open(open, t0);
        assert_eq!(drag.offset(), 128);
        drag.sync_open(true, t0 + Duration::from_millis(100));
        assert_eq!(drag.offset(), 0);
        assert_eq!(drag.transition(), Transition::Eased);
        assert_eq!(drag.next_deadline(t0), None);
        drag.tick(t0 + Duration::from_secs(5));
        assert_eq!(drag.offset(), 0);
        assert!(!scope.is_captured());
    }

    #[test]
    fn test_closing_mid_drag_releases_capture() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.sync_open(false, Instant::now());
        assert!(!drag.is_dragging());
        assert!(!scope.is_captured());
    }

    #[test]
    fn test_teardown_and_drop_release_capture() {
        let (mut drag, scope) = controller();
        drag.pointer_down(100);
        drag.teardown();
        assert!(!scope.is_captured());
        drag.pointer_down(100);
        assert!(scope.is_captured());
        drop(drag);
        assert!(!scope.is_captured());
    }
}
