#[macro_use]
extern crate slog;

pub mod ines;
pub mod mapper;
pub mod cpu;
pub mod bus;
pub mod ppu;
pub mod apu;
pub mod controller;
pub mod console;

pub use crate::console::{Console, Observer, Signal};
pub use crate::controller::Button;
pub use crate::ines::{NesRom, RomError};
