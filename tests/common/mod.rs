#![allow(dead_code)]

use crimson::bus::Bus;
use crimson::cpu::Cpu;
use crimson::ines::NesRom;
use crimson::mapper::create_mapper;

/// Synthetic NROM-128 image with CHR RAM: `program` lands at `reset`,
/// vectors point at `reset`/`nmi`, everything else is NOP sleds.
pub fn rom_with_vectors(program: &[u8], reset: u16, nmi: u16) -> Vec<u8> {
    let mut prg = vec![0xEAu8; 16 * 1024];
    let offset = (reset as usize - 0x8000) & 0x3FFF;
    prg[offset..offset + program.len()].copy_from_slice(program);
    prg[0x3FFA] = nmi as u8;
    prg[0x3FFB] = (nmi >> 8) as u8;
    prg[0x3FFC] = reset as u8;
    prg[0x3FFD] = (reset >> 8) as u8;
    prg[0x3FFE] = reset as u8;
    prg[0x3FFF] = (reset >> 8) as u8;

    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 1, 0, 0, 0];
    image.extend_from_slice(&[0u8; 8]);
    image.extend_from_slice(&prg);
    image
}

pub fn rom_with_program(program: &[u8]) -> Vec<u8> {
    rom_with_vectors(program, 0x8000, 0x9000)
}

/// CPU + bus wired to the given image, reset and ready to tick.
pub fn machine(image: &[u8]) -> (Cpu, Bus) {
    let rom = NesRom::from_bytes(image).unwrap();
    let mapper = create_mapper(rom).unwrap();
    let mut bus = Bus::with_mapper(mapper);
    let mut cpu = Cpu::new(slog::Logger::root(slog::Discard, slog::o!()));
    cpu.reset(&mut bus);
    (cpu, bus)
}
