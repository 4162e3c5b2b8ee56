use std::cell::RefCell;
use std::rc::Rc;

use crate::apu::Apu;
use crate::controller::Controller;
use crate::mapper::Mapper;
use crate::ppu::Ppu;

/// 2 KiB of work RAM, mirrored four times across $0000-$1FFF.
pub struct Ram {
    bytes: [u8; 0x800],
}

impl Ram {
    pub fn new() -> Ram {
        Ram { bytes: [0; 0x800] }
    }

    pub fn get_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % 0x800]
    }

    pub fn set_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % 0x800] = value;
    }
}

/// The CPU-visible memory map. Routes every read and write to RAM, the
/// PPU registers, the APU stub, the controller port, or the mapper.
///
/// $0000-$1FFF  RAM (2 KiB, mirrored)
/// $2000-$3FFF  PPU registers (8, mirrored every 8 bytes)
/// $4014        OAM DMA
/// $4015        APU status
/// $4016        controller 1
/// $4017        controller 2 / APU frame counter (reads 0 here)
/// $4000-$4013, $4018-$5FFF  stubs: read 0, writes dropped
/// $6000-$FFFF  mapper
pub struct Bus {
    ram: Ram,
    pub ppu: Ppu,
    pub apu: Apu,
    pub controller: Controller,
    mapper: Rc<RefCell<dyn Mapper>>,
}

impl Bus {
    pub fn with_mapper(mapper: Rc<RefCell<dyn Mapper>>) -> Bus {
        Bus {
            ram: Ram::new(),
            ppu: Ppu::with_mapper(mapper.clone()),
            apu: Apu::new(),
            controller: Controller::new(),
            mapper,
        }
    }

    pub fn get_byte(&mut self, addr: u16) -> u8 {
        if addr < 0x2000 {
            self.ram.get_byte(addr)
        }
        else if addr < 0x4000 {
            self.ppu.read_reg(0x2000 | (addr & 0x0007))
        }
        else if addr == 0x4015 {
            self.apu.read_status()
        }
        else if addr == 0x4016 {
            self.controller.read()
        }
        else if addr < 0x6000 {
            // $4014 reads back nothing; $4017 and the expansion window read 0
            0
        }
        else {
            self.mapper.borrow().get_byte(addr)
        }
    }

    pub fn set_byte(&mut self, addr: u16, value: u8) {
        if addr < 0x2000 {
            self.ram.set_byte(addr, value);
        }
        else if addr < 0x4000 {
            self.ppu.write_reg(0x2000 | (addr & 0x0007), value);
        }
        else if addr == 0x4014 {
            self.oam_dma(value);
        }
        else if addr == 0x4016 {
            self.controller.write_strobe(value);
        }
        else if addr < 0x4014 || addr == 0x4015 {
            self.apu.write_reg(addr, value);
        }
        else if addr < 0x6000 {
            // $4017 frame counter and the expansion window swallow writes
        }
        else {
            self.mapper.borrow_mut().set_byte(addr, value);
        }
    }

    /// Little-endian word read with no page wrap.
    pub fn get_word(&mut self, addr: u16) -> u16 {
        let lo = self.get_byte(addr) as u16;
        let hi = self.get_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Copy the named 256-byte page into PPU OAM. The caller is expected
    /// to park the CPU for the transfer.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for i in 0..256u16 {
            let value = self.get_byte(base + i);
            self.ppu.dma_oam_write(value);
        }
    }
}
