//! Top-level Combat School machine.
//!
//! The main CPU (HD6309, 3 MHz) and the audio CPU (Z80, 3.579545 MHz) run
//! in alternating slices of 1/1200 s. Audio-CPU cycles per slice come from
//! a [`SliceClock`], which carries the fractional remainder so the two
//! clocks never drift apart.
//!
//! One frame is 50,688 main-CPU cycles on the Konami board (528 × 256
//! pixels at 8 MHz) and 50,000 on the bootleg (60 Hz). The vblank IRQ is
//! raised on the main CPU at the end of each frame and held until taken.

#![allow(clippy::cast_possible_truncation)]

use emu_core::{Cpu, Observable, SliceClock, Stateful, Ticks, Value};

use crate::board::Board;
use crate::config::{BoardKind, INTERLEAVE_HZ};
use crate::input::{Button, InputQueue, TrackballAxis};

/// Combat School system: board plus the two host-supplied CPU cores.
pub struct CombatSchool<M: Cpu, A: Cpu> {
    board: Board,
    main_cpu: M,
    audio_cpu: A,
    audio_clock: SliceClock,
    /// Main-CPU cycles per interleave slice.
    slice: Ticks,
    /// Main-CPU cycles per frame.
    frame_cycles: Ticks,
    /// Vblank IRQ raised but not yet taken.
    vblank_pending: bool,
    main_cycles: u64,
    audio_cycles: u64,
    /// Completed frame counter.
    frame_count: u64,
    /// Timed input event queue.
    input_queue: InputQueue,
}

impl<M: Cpu, A: Cpu> CombatSchool<M, A> {
    /// Wrap a board and two CPU cores. The cores are reset.
    pub fn new(board: Board, mut main_cpu: M, mut audio_cpu: A) -> Self {
        let kind = board.kind();
        main_cpu.reset();
        audio_cpu.reset();
        Self {
            board,
            main_cpu,
            audio_cpu,
            audio_clock: SliceClock::new(kind.main_clock(), kind.audio_clock()),
            slice: kind.main_clock().ticks_per_slice(INTERLEAVE_HZ),
            frame_cycles: kind.cycles_per_frame(),
            vblank_pending: false,
            main_cycles: 0,
            audio_cycles: 0,
            frame_count: 0,
            input_queue: InputQueue::new(),
        }
    }

    /// Run one complete frame.
    ///
    /// Processes any pending input queue events at the start of the frame,
    /// then interleaves the two CPUs for one frame's worth of main-CPU
    /// cycles. Returns the number of main-CPU cycles executed.
    pub fn run_frame(&mut self) -> u64 {
        self.input_queue
            .process(self.frame_count, &mut self.board.input);
        self.frame_count += 1;

        let mut remaining = self.frame_cycles;
        while remaining > Ticks::ZERO {
            let slice = remaining.min(self.slice);
            self.retry_vblank();
            self.run_main(slice);
            let audio = self.audio_clock.convert(slice);
            self.deliver_audio_interrupts();
            self.run_audio(audio);
            remaining = remaining - slice;
        }

        self.vblank_pending = !self.main_cpu.interrupt();
        self.frame_cycles.get()
    }

    fn run_main(&mut self, cycles: Ticks) {
        let mut bus = self.board.main_bus();
        for _ in 0..cycles.get() {
            self.main_cpu.tick(&mut bus);
        }
        self.main_cycles += cycles.get();
    }

    fn run_audio(&mut self, cycles: Ticks) {
        let mut bus = self.board.sound_bus();
        for _ in 0..cycles.get() {
            self.audio_cpu.tick(&mut bus);
        }
        self.audio_cycles += cycles.get();
    }

    fn retry_vblank(&mut self) {
        if self.vblank_pending && self.main_cpu.interrupt() {
            self.vblank_pending = false;
        }
    }

    /// Konami: the $0418 IRQ is held until the Z80 takes it. Bootleg: the
    /// MSM5205 line is level-driven and the latch raises NMI.
    fn deliver_audio_interrupts(&mut self) {
        let kind = self.board.kind();
        let sound = &mut self.board.sound;
        match kind {
            BoardKind::Konami => {
                if sound.irq_held() && self.audio_cpu.interrupt() {
                    sound.clear_held_irq();
                }
            }
            BoardKind::Bootleg => {
                self.audio_cpu.set_irq_line(sound.irq_line());
                if sound.take_nmi() {
                    self.audio_cpu.nmi();
                }
            }
        }
    }

    /// Reset board and both CPUs. Held buttons, DIPs and queued input
    /// survive.
    pub fn reset(&mut self) {
        self.board.reset();
        self.main_cpu.reset();
        self.audio_cpu.reset();
        self.audio_clock.reset();
        self.vblank_pending = false;
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn main_cpu(&self) -> &M {
        &self.main_cpu
    }

    pub fn main_cpu_mut(&mut self) -> &mut M {
        &mut self.main_cpu
    }

    #[must_use]
    pub fn audio_cpu(&self) -> &A {
        &self.audio_cpu
    }

    pub fn audio_cpu_mut(&mut self) -> &mut A {
        &mut self.audio_cpu
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Main-CPU cycles run since creation.
    #[must_use]
    pub fn main_cycles(&self) -> u64 {
        self.main_cycles
    }

    /// Audio-CPU cycles run since creation.
    #[must_use]
    pub fn audio_cycles(&self) -> u64 {
        self.audio_cycles
    }

    /// Mutable reference to the timed input queue.
    pub fn input_queue(&mut self) -> &mut InputQueue {
        &mut self.input_queue
    }

    /// Press a button immediately. Returns false if the set has no such
    /// input.
    pub fn press_button(&mut self, button: Button) -> bool {
        self.board.input.set_button(button, true)
    }

    pub fn release_button(&mut self, button: Button) -> bool {
        self.board.input.set_button(button, false)
    }

    pub fn release_all_buttons(&mut self) {
        self.board.input.release_all();
    }

    /// Set a trackball axis counter.
    pub fn set_trackball(&mut self, axis: TrackballAxis, value: u8) {
        self.board.input.set_trackball(axis, value);
    }
}

impl<M: Cpu, A: Cpu> Observable for CombatSchool<M, A> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "cpu.pc" => Some(self.main_cpu.pc().into()),
            "audio_cpu.pc" => Some(self.audio_cpu.pc().into()),
            "frame_count" => Some(self.frame_count.into()),
            "main_cycles" => Some(self.main_cycles.into()),
            "audio_cycles" => Some(self.audio_cycles.into()),
            "vblank_pending" => Some(self.vblank_pending.into()),
            _ => self.board.query(path),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.pc",
            "audio_cpu.pc",
            "frame_count",
            "main_cycles",
            "audio_cycles",
            "vblank_pending",
            "<board paths>",
        ]
    }
}
