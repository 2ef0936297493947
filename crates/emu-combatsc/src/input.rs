//! Input ports.
//!
//! Three layers:
//! 1. `Button`: logical inputs mapped to port bits per board.
//! 2. `InputPorts`: live port state (buttons, trackball counters, DIPs).
//! 3. `InputQueue`: timed button events for scripted sequences.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{BoardKind, ControlKind};
use crate::dipswitch::DipBank;

/// The five 8-bit input ports the main CPU can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortId {
    In0,
    In1,
    Dsw1,
    Dsw2,
    /// Player 2 buttons share this port with SW3 on the Konami board.
    Dsw3,
}

impl PortId {
    pub const ALL: [Self; 5] = [Self::In0, Self::In1, Self::Dsw1, Self::Dsw2, Self::Dsw3];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::In0 => "in0",
            Self::In1 => "in1",
            Self::Dsw1 => "dsw1",
            Self::Dsw2 => "dsw2",
            Self::Dsw3 => "dsw3",
        }
    }
}

/// Logical button or switch on the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    P1Button1,
    P1Button2,
    P1Start,
    P1Up,
    P1Down,
    P1Left,
    P1Right,
    P2Button1,
    P2Button2,
    P2Start,
    P2Up,
    P2Down,
    P2Left,
    P2Right,
    Coin1,
    Coin2,
    Coin3,
}

impl Button {
    pub const ALL: [Self; 17] = [
        Self::P1Button1,
        Self::P1Button2,
        Self::P1Start,
        Self::P1Up,
        Self::P1Down,
        Self::P1Left,
        Self::P1Right,
        Self::P2Button1,
        Self::P2Button2,
        Self::P2Start,
        Self::P2Up,
        Self::P2Down,
        Self::P2Left,
        Self::P2Right,
        Self::Coin1,
        Self::Coin2,
        Self::Coin3,
    ];

    /// Name used by the CLI and MCP server.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P1Button1 => "p1_button1",
            Self::P1Button2 => "p1_button2",
            Self::P1Start => "p1_start",
            Self::P1Up => "p1_up",
            Self::P1Down => "p1_down",
            Self::P1Left => "p1_left",
            Self::P1Right => "p1_right",
            Self::P2Button1 => "p2_button1",
            Self::P2Button2 => "p2_button2",
            Self::P2Start => "p2_start",
            Self::P2Up => "p2_up",
            Self::P2Down => "p2_down",
            Self::P2Left => "p2_left",
            Self::P2Right => "p2_right",
            Self::Coin1 => "coin1",
            Self::Coin2 => "coin2",
            Self::Coin3 => "coin3",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(name))
    }

    /// Port and bit mask this button drives, if the board wires it.
    #[must_use]
    pub const fn location(self, board: BoardKind, controls: ControlKind) -> Option<(PortId, u8)> {
        // Joystick bits are the same on both boards; trackball cabinets have none.
        let joystick = match self {
            Self::P2Right => Some(0x01),
            Self::P2Left => Some(0x02),
            Self::P2Down => Some(0x04),
            Self::P2Up => Some(0x08),
            Self::P1Right => Some(0x10),
            Self::P1Left => Some(0x20),
            Self::P1Down => Some(0x40),
            Self::P1Up => Some(0x80),
            _ => None,
        };
        if let Some(mask) = joystick {
            return match controls {
                ControlKind::Joystick => Some((PortId::In1, mask)),
                ControlKind::Trackball => None,
            };
        }

        match (board, self) {
            (_, Self::P1Button1) => Some((PortId::In0, 0x01)),
            (_, Self::P1Button2) => Some((PortId::In0, 0x02)),
            (_, Self::P1Start) => Some((PortId::In0, 0x04)),
            (_, Self::Coin1) => Some((PortId::In0, 0x08)),
            (_, Self::Coin2) => Some((PortId::In0, 0x10)),
            (BoardKind::Konami, Self::Coin3) => Some((PortId::In0, 0x20)),
            (BoardKind::Konami, Self::P2Button1) => Some((PortId::Dsw3, 0x01)),
            (BoardKind::Konami, Self::P2Button2) => Some((PortId::Dsw3, 0x02)),
            (BoardKind::Konami, Self::P2Start) => Some((PortId::Dsw3, 0x04)),
            (BoardKind::Bootleg, Self::P2Button1) => Some((PortId::In0, 0x20)),
            (BoardKind::Bootleg, Self::P2Button2) => Some((PortId::In0, 0x40)),
            (BoardKind::Bootleg, Self::P2Start) => Some((PortId::In0, 0x80)),
            _ => None,
        }
    }
}

/// Trackball axis, in the order the board samples them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackballAxis {
    P1Y,
    P1X,
    P2Y,
    P2X,
}

impl TrackballAxis {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::P1Y => 0,
            Self::P1X => 1,
            Self::P2Y => 2,
            Self::P2X => 3,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "p1_y" => Some(Self::P1Y),
            "p1_x" => Some(Self::P1X),
            "p2_y" => Some(Self::P2Y),
            "p2_x" => Some(Self::P2X),
            _ => None,
        }
    }
}

/// Live state of every input the main CPU can see.
#[derive(Debug, Clone)]
pub struct InputPorts {
    board: BoardKind,
    controls: ControlKind,
    /// Active-high pressed bits per port, indexed like `PortId::ALL`.
    pressed: [u8; 5],
    trackball: [Option<u8>; 4],
    pub dips: DipBank,
}

impl InputPorts {
    #[must_use]
    pub fn new(board: BoardKind, controls: ControlKind) -> Self {
        let counter = match controls {
            ControlKind::Trackball => Some(0),
            ControlKind::Joystick => None,
        };
        Self {
            board,
            controls,
            pressed: [0; 5],
            trackball: [counter; 4],
            dips: DipBank::new(board),
        }
    }

    const fn slot(port: PortId) -> usize {
        match port {
            PortId::In0 => 0,
            PortId::In1 => 1,
            PortId::Dsw1 => 2,
            PortId::Dsw2 => 3,
            PortId::Dsw3 => 4,
        }
    }

    /// Press or release a button. Returns false when the board has no such input.
    pub fn set_button(&mut self, button: Button, pressed: bool) -> bool {
        let Some((port, mask)) = button.location(self.board, self.controls) else {
            return false;
        };
        let slot = &mut self.pressed[Self::slot(port)];
        if pressed {
            *slot |= mask;
        } else {
            *slot &= !mask;
        }
        true
    }

    /// Release every button.
    pub fn release_all(&mut self) {
        self.pressed = [0; 5];
    }

    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        button
            .location(self.board, self.controls)
            .is_some_and(|(port, mask)| self.pressed[Self::slot(port)] & mask != 0)
    }

    /// Port value as the CPU reads it (active low, DIPs overlaid).
    #[must_use]
    pub fn read(&self, port: PortId) -> u8 {
        let (dip_mask, dip_value) = self.dips.port_bits(port);
        let buttons = 0xFF & !self.pressed[Self::slot(port)];
        (buttons & !dip_mask) | dip_value
    }

    /// Set the absolute counter of one trackball axis.
    pub fn set_trackball(&mut self, axis: TrackballAxis, value: u8) {
        self.trackball[axis.index()] = Some(value);
    }

    /// Counter samples for the four axes; `None` where no trackball is fitted.
    #[must_use]
    pub fn trackball_samples(&self) -> [Option<u8>; 4] {
        self.trackball
    }
}

// ---------------------------------------------------------------------------
// Coin counters
// ---------------------------------------------------------------------------

/// Electromechanical coin counters driven from $0408.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCounters {
    pub(crate) latch: u8,
    pub counts: [u32; 2],
}

impl CoinCounters {
    /// Bit 0 drives counter 1, bit 1 counter 2; a counter advances on the
    /// rising edge.
    pub fn write(&mut self, value: u8) {
        let rising = value & !self.latch;
        for (bit, count) in self.counts.iter_mut().enumerate() {
            if rising & (1 << bit) != 0 {
                *count += 1;
            }
        }
        self.latch = value & 0x03;
    }
}

// ---------------------------------------------------------------------------
// Scripted input
// ---------------------------------------------------------------------------

/// A timed button event.
#[derive(Debug, Clone)]
pub struct InputEvent {
    /// Frame number at which this event fires.
    pub frame: u64,
    pub button: Button,
    /// True = press, false = release.
    pub pressed: bool,
}

/// Timed input queue for scripted button sequences.
///
/// Events are sorted by frame number and processed at the start of each frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a raw input event.
    pub fn push(&mut self, event: InputEvent) {
        let pos = self
            .events
            .iter()
            .position(|e| e.frame > event.frame)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Enqueue a button press and release.
    pub fn enqueue_button(&mut self, button: Button, at_frame: u64, hold_frames: u64) {
        self.push(InputEvent {
            frame: at_frame,
            button,
            pressed: true,
        });
        self.push(InputEvent {
            frame: at_frame + hold_frames,
            button,
            pressed: false,
        });
    }

    /// Apply all events due at or before `frame`.
    pub fn process(&mut self, frame: u64, ports: &mut InputPorts) {
        while self.events.front().is_some_and(|e| e.frame <= frame) {
            if let Some(event) = self.events.pop_front() {
                ports.set_button(event.button, event.pressed);
            }
        }
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ports_read_high() {
        let ports = InputPorts::new(BoardKind::Konami, ControlKind::Joystick);
        assert_eq!(ports.read(PortId::In0), 0xFF);
        assert_eq!(ports.read(PortId::In1), 0xFF);
        assert_eq!(ports.read(PortId::Dsw3), 0x5F);
    }

    #[test]
    fn konami_player_two_buttons_share_dsw3() {
        let mut ports = InputPorts::new(BoardKind::Konami, ControlKind::Trackball);
        assert!(ports.set_button(Button::P2Start, true));
        assert_eq!(ports.read(PortId::Dsw3), 0x5B);
        ports.dips.set("Service Mode", "On").unwrap();
        assert_eq!(ports.read(PortId::Dsw3), 0x1B);
    }

    #[test]
    fn bootleg_player_two_buttons_on_in0() {
        let mut ports = InputPorts::new(BoardKind::Bootleg, ControlKind::Joystick);
        ports.set_button(Button::P2Button1, true);
        ports.set_button(Button::P2Start, true);
        assert_eq!(ports.read(PortId::In0), 0x5F);
        assert!(!ports.set_button(Button::Coin3, true));
    }

    #[test]
    fn joystick_bits_absent_on_trackball_cabinets() {
        let mut ports = InputPorts::new(BoardKind::Konami, ControlKind::Trackball);
        assert!(!ports.set_button(Button::P1Up, true));
        assert_eq!(ports.trackball_samples(), [Some(0); 4]);

        let mut ports = InputPorts::new(BoardKind::Konami, ControlKind::Joystick);
        assert!(ports.set_button(Button::P1Up, true));
        assert_eq!(ports.read(PortId::In1), 0x7F);
        assert_eq!(ports.trackball_samples(), [None; 4]);
    }

    #[test]
    fn coin_counters_count_rising_edges() {
        let mut counters = CoinCounters::default();
        counters.write(0x01);
        counters.write(0x01);
        counters.write(0x03);
        counters.write(0x00);
        counters.write(0x02);
        assert_eq!(counters.counts, [1, 2]);
    }

    #[test]
    fn process_applies_events() {
        let mut queue = InputQueue::new();
        let mut ports = InputPorts::new(BoardKind::Konami, ControlKind::Joystick);

        queue.enqueue_button(Button::Coin1, 5, 3);
        assert_eq!(queue.len(), 2);

        queue.process(4, &mut ports);
        assert!(!ports.is_pressed(Button::Coin1));

        queue.process(5, &mut ports);
        assert_eq!(ports.read(PortId::In0), 0xF7);

        queue.process(8, &mut ports);
        assert!(!ports.is_pressed(Button::Coin1));
        assert!(queue.is_empty());
    }

    #[test]
    fn button_names_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::from_name(button.name()), Some(button));
        }
        assert_eq!(TrackballAxis::from_name("P2_X"), Some(TrackballAxis::P2X));
    }
}
