use bitflags::bitflags;
use slog::Logger;

use crate::bus::Bus;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

const STACK_BASE: u16 = 0x0100;

bitflags! {
    pub struct Flags: u8 {
        const CARRY             = 0x01;
        const ZERO              = 0x02;
        const INTERRUPT_DISABLE = 0x04;
        const DECIMAL           = 0x08; // present but inert on the 2A03
        const BREAK             = 0x10;
        const UNUSED            = 0x20;
        const OVERFLOW          = 0x40;
        const NEGATIVE          = 0x80;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Irq,
}

/// The thirteen addressing modes of the 6502.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Imp,
    Acc,
    Imm,
    Zp,
    ZpX,
    ZpY,
    Abs,
    AbsX,
    AbsY,
    Ind,
    IndX,
    IndY,
    Rel,
}

/// The 56 official mnemonics, plus `Xxx` for the tolerant decode of
/// anything unmapped (1 byte, 2 cycles, no effect).
#[rustfmt::skip]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    Xxx,
}

/// One row of the dispatch table: mnemonic, mode, size in bytes, base
/// cycle cost. Page-cross and branch penalties are added at retirement.
#[derive(Copy, Clone)]
pub struct Instruction(pub Mnemonic, pub Mode, pub u8, pub u8);

use self::Mnemonic::*;
use self::Mode::*;

// 16x16 opcode matrix, bit-exact to the published 6502 reference.
// Unmapped slots decode as Xxx.
#[rustfmt::skip]
pub static INSTRUCTIONS: [Instruction; 256] = [
    Instruction(Brk, Imp, 1, 7), Instruction(Ora, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ora, Zp, 2, 3), Instruction(Asl, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Php, Imp, 1, 3), Instruction(Ora, Imm, 2, 2), Instruction(Asl, Acc, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ora, Abs, 3, 4), Instruction(Asl, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bpl, Rel, 2, 2), Instruction(Ora, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ora, ZpX, 2, 4), Instruction(Asl, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Clc, Imp, 1, 2), Instruction(Ora, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ora, AbsX, 3, 4), Instruction(Asl, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
    Instruction(Jsr, Abs, 3, 6), Instruction(And, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Bit, Zp, 2, 3), Instruction(And, Zp, 2, 3), Instruction(Rol, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Plp, Imp, 1, 4), Instruction(And, Imm, 2, 2), Instruction(Rol, Acc, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Bit, Abs, 3, 4), Instruction(And, Abs, 3, 4), Instruction(Rol, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bmi, Rel, 2, 2), Instruction(And, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(And, ZpX, 2, 4), Instruction(Rol, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Sec, Imp, 1, 2), Instruction(And, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(And, AbsX, 3, 4), Instruction(Rol, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
    Instruction(Rti, Imp, 1, 6), Instruction(Eor, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Eor, Zp, 2, 3), Instruction(Lsr, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Pha, Imp, 1, 3), Instruction(Eor, Imm, 2, 2), Instruction(Lsr, Acc, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Jmp, Abs, 3, 3), Instruction(Eor, Abs, 3, 4), Instruction(Lsr, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bvc, Rel, 2, 2), Instruction(Eor, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Eor, ZpX, 2, 4), Instruction(Lsr, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Cli, Imp, 1, 2), Instruction(Eor, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Eor, AbsX, 3, 4), Instruction(Lsr, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
    Instruction(Rts, Imp, 1, 6), Instruction(Adc, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Adc, Zp, 2, 3), Instruction(Ror, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Pla, Imp, 1, 4), Instruction(Adc, Imm, 2, 2), Instruction(Ror, Acc, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Jmp, Ind, 3, 5), Instruction(Adc, Abs, 3, 4), Instruction(Ror, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bvs, Rel, 2, 2), Instruction(Adc, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Adc, ZpX, 2, 4), Instruction(Ror, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Sei, Imp, 1, 2), Instruction(Adc, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Adc, AbsX, 3, 4), Instruction(Ror, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
    Instruction(Xxx, Imp, 1, 2), Instruction(Sta, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sty, Zp, 2, 3), Instruction(Sta, Zp, 2, 3), Instruction(Stx, Zp, 2, 3), Instruction(Xxx, Imp, 1, 2), Instruction(Dey, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Txa, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sty, Abs, 3, 4), Instruction(Sta, Abs, 3, 4), Instruction(Stx, Abs, 3, 4), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bcc, Rel, 2, 2), Instruction(Sta, IndY, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sty, ZpX, 2, 4), Instruction(Sta, ZpX, 2, 4), Instruction(Stx, ZpY, 2, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Tya, Imp, 1, 2), Instruction(Sta, AbsY, 3, 5), Instruction(Txs, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sta, AbsX, 3, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2),
    Instruction(Ldy, Imm, 2, 2), Instruction(Lda, IndX, 2, 6), Instruction(Ldx, Imm, 2, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ldy, Zp, 2, 3), Instruction(Lda, Zp, 2, 3), Instruction(Ldx, Zp, 2, 3), Instruction(Xxx, Imp, 1, 2), Instruction(Tay, Imp, 1, 2), Instruction(Lda, Imm, 2, 2), Instruction(Tax, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ldy, Abs, 3, 4), Instruction(Lda, Abs, 3, 4), Instruction(Ldx, Abs, 3, 4), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bcs, Rel, 2, 2), Instruction(Lda, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ldy, ZpX, 2, 4), Instruction(Lda, ZpX, 2, 4), Instruction(Ldx, ZpY, 2, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Clv, Imp, 1, 2), Instruction(Lda, AbsY, 3, 4), Instruction(Tsx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Ldy, AbsX, 3, 4), Instruction(Lda, AbsX, 3, 4), Instruction(Ldx, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2),
    Instruction(Cpy, Imm, 2, 2), Instruction(Cmp, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cpy, Zp, 2, 3), Instruction(Cmp, Zp, 2, 3), Instruction(Dec, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Iny, Imp, 1, 2), Instruction(Cmp, Imm, 2, 2), Instruction(Dex, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cpy, Abs, 3, 4), Instruction(Cmp, Abs, 3, 4), Instruction(Dec, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Bne, Rel, 2, 2), Instruction(Cmp, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cmp, ZpX, 2, 4), Instruction(Dec, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Cld, Imp, 1, 2), Instruction(Cmp, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cmp, AbsX, 3, 4), Instruction(Dec, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
    Instruction(Cpx, Imm, 2, 2), Instruction(Sbc, IndX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cpx, Zp, 2, 3), Instruction(Sbc, Zp, 2, 3), Instruction(Inc, Zp, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Inx, Imp, 1, 2), Instruction(Sbc, Imm, 2, 2), Instruction(Nop, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Cpx, Abs, 3, 4), Instruction(Sbc, Abs, 3, 4), Instruction(Inc, Abs, 3, 6), Instruction(Xxx, Imp, 1, 2),
    Instruction(Beq, Rel, 2, 2), Instruction(Sbc, IndY, 2, 5), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sbc, ZpX, 2, 4), Instruction(Inc, ZpX, 2, 6), Instruction(Xxx, Imp, 1, 2), Instruction(Sed, Imp, 1, 2), Instruction(Sbc, AbsY, 3, 4), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Xxx, Imp, 1, 2), Instruction(Sbc, AbsX, 3, 4), Instruction(Inc, AbsX, 3, 7), Instruction(Xxx, Imp, 1, 2),
];

pub struct Cpu {
    pub pc: u16,
    pub sp: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    flags: Flags,
    pub cycles: u64,
    stall: u16,
    pending_interrupt: Option<Interrupt>,
    // set by address resolution when the effective address crossed a page;
    // consumed by branches and the read opcodes that pay for the crossing
    page_crossed: bool,
    warned_opcodes: [bool; 256],
    log: Logger,
}

impl Cpu {
    pub fn new(log: Logger) -> Cpu {
        Cpu {
            pc: 0,
            sp: 0xFD,
            a: 0,
            x: 0,
            y: 0,
            flags: Flags::from_bits_truncate(0x24),
            cycles: 0,
            stall: 0,
            pending_interrupt: None,
            page_crossed: false,
            warned_opcodes: [false; 256],
            log,
        }
    }

    /// Power/reset sequence: SP to $FD, I and U set, PC from the reset
    /// vector. The vector read traverses the mapper like any other read.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.set_flags(0x24);
        self.cycles = 0;
        self.stall = 0;
        self.pending_interrupt = None;
        self.page_crossed = false;
        self.pc = bus.get_word(RESET_VECTOR);
    }

    pub fn trigger_nmi(&mut self) {
        self.pending_interrupt = Some(Interrupt::Nmi);
    }

    pub fn trigger_irq(&mut self) {
        // reserved; nothing raises this yet
        self.pending_interrupt = Some(Interrupt::Irq);
    }

    /// OAM DMA parks the CPU for 513 cycles, 514 when triggered on an odd
    /// cycle.
    pub fn stall_for_dma(&mut self) {
        self.stall += 513 + (self.cycles & 1) as u16;
    }

    pub fn stall_remaining(&self) -> u16 {
        self.stall
    }

    /// Flags packed into the architectural byte: B reads as 0, U as 1.
    pub fn get_flags(&self) -> u8 {
        (self.flags.bits() & 0xCF) | 0x20
    }

    /// Restore flags from a byte: all six restorable bits are assigned
    /// from the input, B is dropped, U forced to 1.
    pub fn set_flags(&mut self, value: u8) {
        self.flags = Flags::from_bits_truncate((value & 0xCF) | 0x20);
    }

    pub fn flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Execute one instruction (or one stall cycle, or an interrupt
    /// entry) and return the number of CPU cycles it consumed.
    pub fn tick(&mut self, bus: &mut Bus) -> u64 {
        if self.stall > 0 {
            // report the skipped cycle so the PPU keeps its 3:1 pace
            self.stall -= 1;
            self.cycles += 1;
            return 1;
        }

        if let Some(interrupt) = self.pending_interrupt.take() {
            match interrupt {
                Interrupt::Nmi => return self.interrupt(bus, NMI_VECTOR),
                Interrupt::Irq => {
                    if !self.flags.contains(Flags::INTERRUPT_DISABLE) {
                        return self.interrupt(bus, IRQ_VECTOR);
                    }
                }
            }
        }

        let start = self.cycles;
        let opcode = bus.get_byte(self.pc);
        let Instruction(mnemonic, mode, size, base_cycles) = INSTRUCTIONS[opcode as usize];

        self.pc = self.pc.wrapping_add(1);
        self.page_crossed = false;
        let addr = self.resolve(bus, mode);
        self.pc = self.pc.wrapping_add(size as u16 - 1);
        self.cycles += base_cycles as u64;

        self.execute(bus, opcode, mnemonic, mode, addr);

        self.cycles - start
    }

    /// Interrupt entry: 7 cycles, pushes PC then flags with B clear.
    fn interrupt(&mut self, bus: &mut Bus, vector: u16) -> u64 {
        self.push_word(bus, self.pc);
        self.push(bus, self.get_flags());
        self.flags.insert(Flags::INTERRUPT_DISABLE);
        self.pc = bus.get_word(vector);
        self.cycles += 7;
        7
    }

    // --- addressing ---

    fn pages_differ(a: u16, b: u16) -> bool {
        (a & 0xFF00) != (b & 0xFF00)
    }

    /// Word read reproducing the 6502 indirect page-wrap bug: the high
    /// byte of a pointer at $xxFF comes from $xx00.
    fn get_word_bug(bus: &mut Bus, addr: u16) -> u16 {
        let lo = bus.get_byte(addr) as u16;
        let hi = bus.get_byte((addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF)) as u16;
        (hi << 8) | lo
    }

    /// Compute the effective operand address for `mode`, with `pc`
    /// pointing at the byte after the opcode. Sets `page_crossed` for the
    /// indexed modes (and the taken-branch target) that leave the base
    /// page.
    fn resolve(&mut self, bus: &mut Bus, mode: Mode) -> u16 {
        match mode {
            Imp | Acc => 0,
            Imm => self.pc,
            Zp => bus.get_byte(self.pc) as u16,
            ZpX => bus.get_byte(self.pc).wrapping_add(self.x) as u16,
            ZpY => bus.get_byte(self.pc).wrapping_add(self.y) as u16,
            Abs => bus.get_word(self.pc),
            AbsX => {
                let base = bus.get_word(self.pc);
                let eff = base.wrapping_add(self.x as u16);
                self.page_crossed = Cpu::pages_differ(base, eff);
                eff
            }
            AbsY => {
                let base = bus.get_word(self.pc);
                let eff = base.wrapping_add(self.y as u16);
                self.page_crossed = Cpu::pages_differ(base, eff);
                eff
            }
            Ind => {
                let ptr = bus.get_word(self.pc);
                Cpu::get_word_bug(bus, ptr)
            }
            IndX => {
                let ptr = bus.get_byte(self.pc).wrapping_add(self.x) as u16;
                Cpu::get_word_bug(bus, ptr)
            }
            IndY => {
                let ptr = bus.get_byte(self.pc) as u16;
                let base = Cpu::get_word_bug(bus, ptr);
                let eff = base.wrapping_add(self.y as u16);
                self.page_crossed = Cpu::pages_differ(base, eff);
                eff
            }
            Rel => {
                let offset = bus.get_byte(self.pc) as i8;
                let base = self.pc.wrapping_add(1);
                let eff = base.wrapping_add(offset as u16);
                self.page_crossed = Cpu::pages_differ(base, eff);
                eff
            }
        }
    }

    // --- stack ---

    fn push(&mut self, bus: &mut Bus, value: u8) {
        bus.set_byte(STACK_BASE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.get_byte(STACK_BASE | self.sp as u16)
    }

    fn push_word(&mut self, bus: &mut Bus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull_word(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    // --- flag helpers ---

    fn set_zn(&mut self, value: u8) {
        self.flags.set(Flags::ZERO, value == 0);
        self.flags.set(Flags::NEGATIVE, value & 0x80 != 0);
    }

    fn take_page_penalty(&mut self) {
        if self.page_crossed {
            self.cycles += 1;
        }
    }

    // --- shared opcode bodies ---

    fn adc(&mut self, operand: u8) {
        let a = self.a as u16;
        let m = operand as u16;
        let c = self.flags.contains(Flags::CARRY) as u16;
        let sum = a + m + c;
        let result = sum as u8;

        self.flags.set(Flags::CARRY, sum > 0xFF);
        self.flags
            .set(Flags::OVERFLOW, (a ^ sum) & (m ^ sum) & 0x80 != 0);
        self.a = result;
        self.set_zn(result);
    }

    fn compare(&mut self, reg: u8, operand: u8) {
        self.flags.set(Flags::CARRY, reg >= operand);
        self.set_zn(reg.wrapping_sub(operand));
    }

    fn branch(&mut self, addr: u16, condition: bool) {
        if condition {
            self.cycles += 1;
            self.take_page_penalty();
            self.pc = addr;
        }
    }

    /// CPU-side write; a store into $4014 additionally parks the CPU for
    /// the DMA transfer the bus just performed.
    fn write_byte(&mut self, bus: &mut Bus, addr: u16, value: u8) {
        bus.set_byte(addr, value);
        if addr == 0x4014 {
            self.stall_for_dma();
        }
    }

    /// Read-modify-write helper for the memory forms of the shifts and
    /// INC/DEC.
    fn modify<F>(&mut self, bus: &mut Bus, mode: Mode, addr: u16, f: F)
    where
        F: FnOnce(&mut Cpu, u8) -> u8,
    {
        if mode == Acc {
            let value = self.a;
            let result = f(&mut *self, value);
            self.a = result;
            self.set_zn(result);
        }
        else {
            let value = bus.get_byte(addr);
            let result = f(&mut *self, value);
            self.write_byte(bus, addr, result);
            self.set_zn(result);
        }
    }

    fn execute(&mut self, bus: &mut Bus, opcode: u8, mnemonic: Mnemonic, mode: Mode, addr: u16) {
        match mnemonic {
            // loads and stores
            Lda => {
                self.a = bus.get_byte(addr);
                self.set_zn(self.a);
                self.take_page_penalty();
            }
            Ldx => {
                self.x = bus.get_byte(addr);
                self.set_zn(self.x);
                self.take_page_penalty();
            }
            Ldy => {
                self.y = bus.get_byte(addr);
                self.set_zn(self.y);
                self.take_page_penalty();
            }
            Sta => self.write_byte(bus, addr, self.a),
            Stx => self.write_byte(bus, addr, self.x),
            Sty => self.write_byte(bus, addr, self.y),

            // transfers
            Tax => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            Tay => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            Txa => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            Tya => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            Tsx => {
                self.x = self.sp;
                self.set_zn(self.x);
            }
            Txs => self.sp = self.x,

            // stack
            Pha => self.push(bus, self.a),
            Php => {
                let flags = self.get_flags() | Flags::BREAK.bits();
                self.push(bus, flags);
            }
            Pla => {
                self.a = self.pull(bus);
                self.set_zn(self.a);
            }
            Plp => {
                let flags = self.pull(bus);
                self.set_flags(flags);
            }

            // logical
            And => {
                self.a &= bus.get_byte(addr);
                self.set_zn(self.a);
                self.take_page_penalty();
            }
            Ora => {
                self.a |= bus.get_byte(addr);
                self.set_zn(self.a);
                self.take_page_penalty();
            }
            Eor => {
                self.a ^= bus.get_byte(addr);
                self.set_zn(self.a);
                self.take_page_penalty();
            }

            // arithmetic; SBC is ADC of the one's complement
            Adc => {
                let operand = bus.get_byte(addr);
                self.adc(operand);
                self.take_page_penalty();
            }
            Sbc => {
                let operand = bus.get_byte(addr);
                self.adc(!operand);
                self.take_page_penalty();
            }

            // compares
            Cmp => {
                let operand = bus.get_byte(addr);
                self.compare(self.a, operand);
                self.take_page_penalty();
            }
            Cpx => {
                let operand = bus.get_byte(addr);
                self.compare(self.x, operand);
            }
            Cpy => {
                let operand = bus.get_byte(addr);
                self.compare(self.y, operand);
            }

            // increments and decrements
            Inc => self.modify(bus, mode, addr, |_, v| v.wrapping_add(1)),
            Dec => self.modify(bus, mode, addr, |_, v| v.wrapping_sub(1)),
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }

            // shifts and rotates
            Asl => self.modify(bus, mode, addr, |cpu, v| {
                cpu.flags.set(Flags::CARRY, v & 0x80 != 0);
                v << 1
            }),
            Lsr => self.modify(bus, mode, addr, |cpu, v| {
                cpu.flags.set(Flags::CARRY, v & 0x01 != 0);
                v >> 1
            }),
            Rol => self.modify(bus, mode, addr, |cpu, v| {
                let carry_in = cpu.flags.contains(Flags::CARRY) as u8;
                cpu.flags.set(Flags::CARRY, v & 0x80 != 0);
                (v << 1) | carry_in
            }),
            Ror => self.modify(bus, mode, addr, |cpu, v| {
                let carry_in = cpu.flags.contains(Flags::CARRY) as u8;
                cpu.flags.set(Flags::CARRY, v & 0x01 != 0);
                (v >> 1) | (carry_in << 7)
            }),

            // branches
            Bcc => self.branch(addr, !self.flags.contains(Flags::CARRY)),
            Bcs => self.branch(addr, self.flags.contains(Flags::CARRY)),
            Beq => self.branch(addr, self.flags.contains(Flags::ZERO)),
            Bne => self.branch(addr, !self.flags.contains(Flags::ZERO)),
            Bmi => self.branch(addr, self.flags.contains(Flags::NEGATIVE)),
            Bpl => self.branch(addr, !self.flags.contains(Flags::NEGATIVE)),
            Bvc => self.branch(addr, !self.flags.contains(Flags::OVERFLOW)),
            Bvs => self.branch(addr, self.flags.contains(Flags::OVERFLOW)),

            // jumps and subroutines
            Jmp => self.pc = addr,
            Jsr => {
                let ret = self.pc.wrapping_sub(1);
                self.push_word(bus, ret);
                self.pc = addr;
            }
            Rts => {
                let ret = self.pull_word(bus);
                self.pc = ret.wrapping_add(1);
            }
            Rti => {
                let flags = self.pull(bus);
                self.set_flags(flags);
                self.pc = self.pull_word(bus);
            }

            // flags
            Clc => self.flags.remove(Flags::CARRY),
            Sec => self.flags.insert(Flags::CARRY),
            Cli => self.flags.remove(Flags::INTERRUPT_DISABLE),
            Sei => self.flags.insert(Flags::INTERRUPT_DISABLE),
            Cld => self.flags.remove(Flags::DECIMAL),
            Sed => self.flags.insert(Flags::DECIMAL),
            Clv => self.flags.remove(Flags::OVERFLOW),

            // misc
            Bit => {
                let value = bus.get_byte(addr);
                self.flags.set(Flags::ZERO, self.a & value == 0);
                self.flags.set(Flags::OVERFLOW, value & 0x40 != 0);
                self.flags.set(Flags::NEGATIVE, value & 0x80 != 0);
            }
            Brk => {
                self.push_word(bus, self.pc.wrapping_add(1));
                let flags = self.get_flags() | Flags::BREAK.bits();
                self.push(bus, flags);
                self.flags.insert(Flags::INTERRUPT_DISABLE);
                self.pc = bus.get_word(IRQ_VECTOR);
            }
            Nop => {}
            Xxx => {
                if !self.warned_opcodes[opcode as usize] {
                    self.warned_opcodes[opcode as usize] = true;
                    warn!(self.log, "unmapped opcode, decoding as NOP";
                          "opcode" => format!("{:#04X}", opcode),
                          "pc" => format!("{:#06X}", self.pc.wrapping_sub(1)));
                }
            }
        }
    }
}
