use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::CellPos;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Reveal,
    ToggleFlag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub pos: CellPos,
    pub kind: ActionKind,
}

impl PlayerAction {
    pub const fn reveal(pos: CellPos) -> Self {
        Self {
            pos,
            kind: ActionKind::Reveal,
        }
    }

    pub const fn toggle_flag(pos: CellPos) -> Self {
        Self {
            pos,
            kind: ActionKind::ToggleFlag,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Raw pointer input. `pos` is `None` when the pointer is not over a cell, `buttons` is the set still held
/// after the event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        pos: Option<CellPos>,
        kind: PointerKind,
        buttons: MouseButtons,
    },
    Up {
        pos: Option<CellPos>,
        kind: PointerKind,
        buttons: MouseButtons,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct MousePress {
    pos: CellPos,
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingTap {
    pos: CellPos,
    deadline_ms: u64,
}

/// Turns pointer input into player actions.
///
/// Mouse: releasing the left button on the cell it was pressed on reveals, pressing the right button flags.
/// Touch: a tap waits `double_tap_window_ms` for a second tap on the same cell, which flags instead.
#[derive(Clone, Debug)]
pub struct GestureResolver {
    double_tap_window_ms: u64,
    mouse_press: Option<MousePress>,
    touch_down: Option<CellPos>,
    pending_tap: Option<PendingTap>,
    swallow_touch_up: bool,
}

impl GestureResolver {
    pub fn new(double_tap_window_ms: u64) -> Self {
        Self {
            double_tap_window_ms,
            mouse_press: None,
            touch_down: None,
            pending_tap: None,
            swallow_touch_up: false,
        }
    }

    pub fn double_tap_window_ms(&self) -> u64 {
        self.double_tap_window_ms
    }

    /// When the presentation should call [`Self::poll`] next.
    pub fn pending_deadline(&self) -> Option<u64> {
        self.pending_tap.map(|tap| tap.deadline_ms)
    }

    pub fn handle(&mut self, event: PointerEvent, now_ms: u64) -> Option<PlayerAction> {
        match event {
            PointerEvent::Down {
                pos,
                kind: PointerKind::Mouse,
                buttons,
            } => self.mouse_down(pos, buttons),
            PointerEvent::Up {
                pos,
                kind: PointerKind::Mouse,
                buttons,
            } => self.mouse_up(pos, buttons),
            PointerEvent::Down {
                pos,
                kind: PointerKind::Touch,
                ..
            } => self.touch_down(pos, now_ms),
            PointerEvent::Up {
                pos,
                kind: PointerKind::Touch,
                ..
            } => self.touch_up(pos, now_ms),
        }
    }

    /// Resolves a single tap once its double-tap window has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<PlayerAction> {
        match self.pending_tap {
            Some(tap) if now_ms >= tap.deadline_ms => {
                self.pending_tap = None;
                log::trace!("tap at {} resolved as reveal", tap.pos);
                Some(PlayerAction::reveal(tap.pos))
            }
            _ => None,
        }
    }

    /// Drops any half-finished gesture, e.g. when a new round starts.
    pub fn cancel(&mut self) {
        self.mouse_press = None;
        self.touch_down = None;
        self.pending_tap = None;
        self.swallow_touch_up = false;
    }

    fn mouse_down(&mut self, pos: Option<CellPos>, buttons: MouseButtons) -> Option<PlayerAction> {
        let Some(pos) = pos else {
            self.mouse_press = None;
            return None;
        };

        if buttons == MouseButtons::RIGHT {
            log::debug!("flag cell: {}", pos);
            self.mouse_press = None;
            return Some(PlayerAction::toggle_flag(pos));
        }

        let buttons = match self.mouse_press {
            Some(press) if press.pos == pos => press.buttons | buttons,
            _ => buttons,
        };
        self.mouse_press = Some(MousePress { pos, buttons });
        None
    }

    fn mouse_up(&mut self, pos: Option<CellPos>, buttons: MouseButtons) -> Option<PlayerAction> {
        if !buttons.is_empty() {
            // still holding something, wait for the final release
            return None;
        }

        match self.mouse_press.take() {
            Some(MousePress {
                pos: pressed,
                buttons: MouseButtons::LEFT,
            }) if Some(pressed) == pos => {
                log::debug!("open cell: {}", pressed);
                Some(PlayerAction::reveal(pressed))
            }
            // released elsewhere or a button combination, treat as cancel
            _ => None,
        }
    }

    fn touch_down(&mut self, pos: Option<CellPos>, now_ms: u64) -> Option<PlayerAction> {
        let pending = self.pending_tap.take();
        self.touch_down = pos;

        match (pending, pos) {
            (Some(tap), Some(pos)) if tap.pos == pos && now_ms < tap.deadline_ms => {
                log::debug!("double tap at {}, flagging", pos);
                self.touch_down = None;
                self.swallow_touch_up = true;
                Some(PlayerAction::toggle_flag(pos))
            }
            // a tap somewhere else settles the waiting one right away
            (Some(tap), _) => Some(PlayerAction::reveal(tap.pos)),
            (None, _) => None,
        }
    }

    fn touch_up(&mut self, pos: Option<CellPos>, now_ms: u64) -> Option<PlayerAction> {
        if self.swallow_touch_up {
            self.swallow_touch_up = false;
            return None;
        }

        match self.touch_down.take() {
            Some(down) if Some(down) == pos => {
                self.pending_tap = Some(PendingTap {
                    pos: down,
                    deadline_ms: now_ms + self.double_tap_window_ms,
                });
            }
            _ => {}
        }
        None
    }
}
