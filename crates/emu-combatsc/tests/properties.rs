//! Property-based tests for the board's register logic.
//!
//! Each property is checked through the main CPU bus so that decode and
//! handler agree.

use emu_combatsc::banking::decode;
use emu_combatsc::trackball::Trackball;
use emu_combatsc::video::Video;
use emu_combatsc::{Board, CombatSchoolConfig, LoadedRoms, Variant, VideoCircuit};
use emu_core::Bus;
use proptest::prelude::*;

fn board(variant: Variant) -> Board {
    Board::new(&CombatSchoolConfig::new(variant), LoadedRoms::blank(variant)).unwrap()
}

fn circuit_of(value: u8) -> VideoCircuit {
    if value & 0x40 != 0 {
        VideoCircuit::One
    } else {
        VideoCircuit::Zero
    }
}

proptest! {
    #[test]
    fn bank_index_formula(value in any::<u8>()) {
        let bank = decode(value).bank;
        prop_assert!(bank <= 9);
        if value & 0x10 != 0 {
            prop_assert_eq!(bank, (value >> 1) & 7);
        } else {
            prop_assert_eq!(bank, 8 + (value & 1));
        }
    }

    #[test]
    fn konami_bit6_binds_page_and_scroll(value in any::<u8>()) {
        let mut b = board(Variant::Combatsct);
        b.main_bus().write(0x0410, value);
        prop_assert_eq!(b.video.circuit(), circuit_of(value));
        prop_assert_eq!(b.video.scroll_circuit(), circuit_of(value));
        prop_assert_eq!(b.video.priority(), value & 0x20 != 0);
        prop_assert_eq!(b.bank.bank(), decode(value).bank);
    }

    #[test]
    fn bootleg_bank_write_moves_page_only(value in any::<u8>()) {
        let mut b = board(Variant::Combatscb);
        b.main_bus().write(0x0500, value);
        prop_assert_eq!(b.video.circuit(), circuit_of(value));
        prop_assert_eq!(b.video.scroll_circuit(), VideoCircuit::Zero);
        prop_assert!(!b.video.priority());
    }

    #[test]
    fn bootleg_window_follows_masked_value(first in any::<u8>(), second in any::<u8>()) {
        let mut b = board(Variant::Combatscb);
        let mut bus = b.main_bus();
        bus.write(0x0500, first);
        bus.write(0x0500, second);
        // Writes into the window only land when the I/O configuration is live.
        bus.write(0x4123, 0x5A);
        drop(bus);
        let io_window = second & 0x1F == 0x1F;
        prop_assert_eq!(b.io_ram()[0x123] == 0x5A, io_window);
        if io_window {
            prop_assert_eq!(b.bank.bank(), 9);
        } else {
            prop_assert_eq!(b.bank.bank(), decode(second & 0x1F).bank);
        }
    }

    #[test]
    fn protection_product(a in any::<u8>(), c in any::<u8>()) {
        let mut b = board(Variant::Combatsc);
        let mut bus = b.main_bus();
        bus.write(0x0200, a);
        bus.write(0x0201, c);
        let product = u16::from(a) * u16::from(c);
        prop_assert_eq!(bus.read(0x0200), product.to_le_bytes()[0]);
        prop_assert_eq!(bus.read(0x0201), product.to_le_bytes()[1]);
    }

    #[test]
    fn vreg_invalidation(first in any::<u8>(), second in any::<u8>()) {
        let mut v = Video::new();
        v.write_vreg(first);
        v.take_dirty();
        let inv = v.write_vreg(second);
        if first == second {
            prop_assert!(inv.is_none());
            prop_assert!(v.dirty().text.is_clean());
        } else {
            prop_assert!(inv.text);
            prop_assert_eq!(inv.tilemap0, first & 0x0F != second & 0x0F);
            prop_assert_eq!(inv.tilemap1, first >> 4 != second >> 4);
            prop_assert!(v.dirty().text.is_all_dirty());
        }
        prop_assert_eq!(v.vreg(), second);
    }

    #[test]
    fn trackball_port_encoding(samples in any::<[u8; 4]>()) {
        let mut tb = Trackball::new();
        tb.read(0, samples.map(Some));
        for (i, &s) in samples.iter().enumerate() {
            let port = tb.port(i);
            prop_assert_eq!(port & 0x7F, s & 0x7F);
            prop_assert_eq!(port & 0x80 != 0, tb.signs()[i]);
        }
    }

    #[test]
    fn trackball_diagonal_keeps_raw_signs(y in 1u8.., x in 1u8..) {
        let mut tb = Trackball::new();
        tb.read(0, [Some(y), Some(x), Some(0), Some(0)]);
        prop_assert_eq!(tb.signs()[0], y & 0x80 != 0);
        prop_assert_eq!(tb.signs()[1], x & 0x80 != 0);
    }

    #[test]
    fn trackball_orthogonal_correction(x in 1u8..) {
        let mut tb = Trackball::new();
        tb.read(0, [Some(0), Some(x), Some(0), Some(0)]);
        prop_assert_eq!(tb.signs()[1], x & 0x80 != 0);
        prop_assert_eq!(tb.signs()[0], !tb.signs()[1]);
    }
}
