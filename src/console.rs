use std::error::Error;
use std::fmt;

use slog::Logger;

use crate::bus::Bus;
use crate::controller::Button;
use crate::cpu::Cpu;
use crate::ines::{NesRom, RomError};
use crate::mapper::create_mapper;

/// Notifications pushed to registered observers.
pub enum Signal<'a> {
    /// A finished 256x240 RGBA frame, emitted at ~60 Hz while running.
    FrameReady(&'a [u8]),
    /// Emitted after ROM load and after an explicit reset.
    Reset,
}

impl<'a> Signal<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::FrameReady(_) => "frame-ready",
            Signal::Reset => "nes-reset",
        }
    }
}

pub trait Observer {
    fn notify(&mut self, signal: &Signal);
}

/// Returned when the host starts or steps the console before a ROM has
/// been loaded.
#[derive(Debug)]
pub struct NotLoaded;

impl fmt::Display for NotLoaded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no ROM loaded")
    }
}

impl Error for NotLoaded {}

struct Machine {
    cpu: Cpu,
    bus: Bus,
}

/// The console aggregate: owns the CPU, the bus and everything behind
/// it, and drives the master clock at one CPU tick to three PPU dots.
pub struct Console {
    machine: Option<Machine>,
    observers: Vec<Box<dyn Observer>>,
    running: bool,
    log: Logger,
}

impl Console {
    pub fn new(log: Logger) -> Console {
        Console {
            machine: None,
            observers: Vec::new(),
            running: false,
            log,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn load_rom_file(&mut self, path: &str) -> Result<(), RomError> {
        let rom = NesRom::from_file(path)?;
        self.install(rom)
    }

    pub fn load_rom_bytes(&mut self, bytes: &[u8]) -> Result<(), RomError> {
        let rom = NesRom::from_bytes(bytes)?;
        self.install(rom)
    }

    fn install(&mut self, rom: NesRom) -> Result<(), RomError> {
        info!(self.log, "ROM loaded";
              "mapper" => rom.mapper_number(),
              "prg_bytes" => rom.prg_rom_size_bytes(),
              "chr_bytes" => rom.chr_rom().len(),
              "mirroring" => format!("{:?}", rom.mirroring()));

        let mapper = create_mapper(rom)?;
        let mut bus = Bus::with_mapper(mapper);
        let mut cpu = Cpu::new(self.log.new(o!("component" => "cpu")));
        cpu.reset(&mut bus);
        debug!(self.log, "reset vector"; "pc" => format!("{:#06X}", cpu.pc));

        self.machine = Some(Machine { cpu, bus });
        self.emit(&Signal::Reset);
        Ok(())
    }

    /// Re-run the power-on sequence of the loaded machine.
    pub fn reset(&mut self) {
        if let Some(machine) = self.machine.as_mut() {
            machine.bus.ppu.reset();
            machine.bus.apu.reset();
            machine.cpu.reset(&mut machine.bus);
            self.emit(&Signal::Reset);
        }
    }

    pub fn start(&mut self) -> Result<(), NotLoaded> {
        if self.machine.is_none() {
            return Err(NotLoaded);
        }
        self.running = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Interleave CPU and PPU until the PPU finishes a frame, then hand
    /// the framebuffer to the observers.
    pub fn step_frame(&mut self) -> Result<(), NotLoaded> {
        {
            let machine = self.machine.as_mut().ok_or(NotLoaded)?;
            loop {
                let cycles = machine.cpu.tick(&mut machine.bus);
                for _ in 0..3 * cycles {
                    machine.bus.ppu.tick();
                    if machine.bus.ppu.take_nmi() {
                        machine.cpu.trigger_nmi();
                    }
                }
                if machine.bus.ppu.take_frame() {
                    break;
                }
            }
        }

        let machine = self.machine.as_ref().unwrap();
        let frame = machine.bus.ppu.framebuffer();
        for observer in self.observers.iter_mut() {
            observer.notify(&Signal::FrameReady(frame));
        }
        Ok(())
    }

    /// Pump up to `count` frames; stops early if the host called
    /// `stop()` from an observer.
    pub fn run_frames(&mut self, count: u64) -> Result<(), NotLoaded> {
        for _ in 0..count {
            if !self.running {
                break;
            }
            self.step_frame()?;
        }
        Ok(())
    }

    pub fn set_buttons(&mut self, mask: u8) {
        if let Some(machine) = self.machine.as_mut() {
            machine.bus.controller.set_buttons(mask);
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if let Some(machine) = self.machine.as_mut() {
            machine.bus.controller.set_button(button, pressed);
        }
    }

    pub fn framebuffer(&self) -> Option<&[u8]> {
        self.machine.as_ref().map(|m| m.bus.ppu.framebuffer())
    }

    pub fn cpu(&self) -> Option<&Cpu> {
        self.machine.as_ref().map(|m| &m.cpu)
    }

    fn emit(&mut self, signal: &Signal) {
        for observer in self.observers.iter_mut() {
            observer.notify(signal);
        }
    }
}
