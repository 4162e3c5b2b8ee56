use std::convert::TryInto;
use std::error::Error;
use std::fmt;
use std::fs::read;
use std::io;

/// Errors surfaced by the ROM loader. No console state is touched when
/// loading fails.
#[derive(Debug)]
pub enum RomError {
    Io(io::Error),
    TooShort,
    BadMagic,
    Ines2Unsupported,
    Truncated,
    UnsupportedMapper(u8),
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RomError::Io(e) => write!(f, "failed to read ROM: {}", e),
            RomError::TooShort => write!(f, "file too short for an iNES header"),
            RomError::BadMagic => write!(f, "missing iNES magic (expected NES<1A>)"),
            RomError::Ines2Unsupported => write!(f, "NES 2.0 images are not supported"),
            RomError::Truncated => write!(f, "file ends before the PRG/CHR data it declares"),
            RomError::UnsupportedMapper(n) => write!(f, "unsupported mapper number {}", n),
        }
    }
}

impl Error for RomError {}

impl From<io::Error> for RomError {
    fn from(e: io::Error) -> RomError {
        RomError::Io(e)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

#[derive(Debug)]
pub struct NesRom {
    header: INesHeader,
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    chr_is_ram: bool,
}

impl NesRom {
    pub fn from_file(path: &str) -> Result<NesRom, RomError> {
        let contents = read(path)?;

        NesRom::from_bytes(&contents)
    }

    pub fn from_bytes(contents: &[u8]) -> Result<NesRom, RomError> {
        if contents.len() < 16 {
            return Err(RomError::TooShort);
        }
        let header = INesHeader::from_bytes(&contents[..16])?;
        let mut ptr = 16;

        if header.has_trainer() {
            // 512 bytes between header and PRG; nothing in it we need
            ptr += 512;
        }

        let prg_end = ptr + header.prg_rom_size_bytes();
        if contents.len() < prg_end {
            return Err(RomError::Truncated);
        }
        let prg_rom: Vec<u8> = contents[ptr..prg_end].to_vec();
        ptr = prg_end;

        // CHR size 0 means the board carries 8 KiB of CHR RAM instead
        let chr_is_ram = header.chr_rom_size_bytes() == 0;
        let chr_rom: Vec<u8> = if chr_is_ram {
            vec![0; 8 * 1024]
        }
        else {
            let chr_end = ptr + header.chr_rom_size_bytes();
            if contents.len() < chr_end {
                return Err(RomError::Truncated);
            }
            contents[ptr..chr_end].to_vec()
        };

        Ok(NesRom {
            header,
            prg_rom,
            chr_rom,
            chr_is_ram,
        })
    }

    pub fn prg_rom(&self) -> &[u8] {
        &self.prg_rom
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }

    pub fn mapper_number(&self) -> u8 {
        self.header.mapper_number()
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.header.mirrored_vertical() {
            Mirroring::Vertical
        }
        else {
            Mirroring::Horizontal
        }
    }

    pub fn prg_rom_size_bytes(&self) -> usize {
        self.header.prg_rom_size_bytes()
    }

    pub fn prg_ram_size_bytes(&self) -> usize {
        self.header.prg_ram_size_bytes()
    }

    pub fn has_persistent_memory(&self) -> bool {
        self.header.has_persistent_memory()
    }
}

#[derive(Debug)]
struct INesHeader {
    magic: [u8; 4],
    prg_size: u8,
    chr_size: u8,
    flags_6: u8,
    flags_7: u8,
    flags_8: u8,
    flags_9: u8,
    flags_10: u8,
    zeroes: [u8; 5],
}

impl INesHeader {
    fn from_bytes(input: &[u8]) -> Result<INesHeader, RomError> {
        assert!(input.len() >= 16);

        let result = INesHeader {
            magic: input[..4].try_into().unwrap(),
            prg_size: input[4],
            chr_size: input[5],
            flags_6: input[6],
            flags_7: input[7],
            flags_8: input[8],
            flags_9: input[9],
            flags_10: input[10],
            zeroes: input[11..16].try_into().unwrap(),
        };

        if result.magic != [0x4E, 0x45, 0x53, 0x1A] {
            return Err(RomError::BadMagic);
        }
        if result.is_ines_2() {
            return Err(RomError::Ines2Unsupported);
        }
        Ok(result)
    }

    fn prg_rom_size_bytes(&self) -> usize {
        self.prg_size as usize * 16 * 1024
    }

    fn chr_rom_size_bytes(&self) -> usize {
        self.chr_size as usize * 8 * 1024
    }

    fn mirrored_vertical(&self) -> bool {
        (self.flags_6 & 1) == 1
    }

    fn has_persistent_memory(&self) -> bool {
        (self.flags_6 & 2) != 0
    }

    fn has_trainer(&self) -> bool {
        (self.flags_6 & 4) != 0
    }

    fn is_ines_2(&self) -> bool {
        (self.flags_7 & 0xC) == 0x8
    }

    fn mapper_number(&self) -> u8 {
        // Archaic dumps carry garbage in bytes 11-15; trust only the low
        // nibble when the tail is dirty.
        if self.zeroes.iter().filter(|&&x| x != 0u8).count() > 1 {
            self.flags_6 >> 4
        }
        else {
            (self.flags_6 >> 4) | (self.flags_7 & 0xF0)
        }
    }

    fn prg_ram_size_bytes(&self) -> usize {
        if self.flags_8 == 0 {
            8 * 1024
        }
        else {
            self.flags_8 as usize * 8 * 1024
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(prg: u8, chr: u8, flags_6: u8, flags_7: u8) -> Vec<u8> {
        let mut v = vec![0x4E, 0x45, 0x53, 0x1A, prg, chr, flags_6, flags_7];
        v.extend_from_slice(&[0u8; 8]);
        v
    }

    #[test]
    fn parses_minimal_image() {
        let mut image = header(1, 1, 0x01, 0);
        image.extend(std::iter::repeat(0xEA).take(16 * 1024));
        image.extend(std::iter::repeat(0x55).take(8 * 1024));

        let rom = NesRom::from_bytes(&image).unwrap();
        assert_eq!(rom.mapper_number(), 0);
        assert_eq!(rom.mirroring(), Mirroring::Vertical);
        assert_eq!(rom.prg_rom().len(), 16 * 1024);
        assert_eq!(rom.chr_rom().len(), 8 * 1024);
        assert!(!rom.chr_is_ram());
    }

    #[test]
    fn trainer_shifts_prg() {
        let mut image = header(1, 0, 0x04, 0);
        image.extend(std::iter::repeat(0xFF).take(512));
        image.extend(std::iter::repeat(0xA9).take(16 * 1024));

        let rom = NesRom::from_bytes(&image).unwrap();
        assert_eq!(rom.prg_rom()[0], 0xA9);
    }

    #[test]
    fn chr_size_zero_allocates_ram() {
        let mut image = header(1, 0, 0, 0);
        image.extend(std::iter::repeat(0xEA).take(16 * 1024));

        let rom = NesRom::from_bytes(&image).unwrap();
        assert!(rom.chr_is_ram());
        assert_eq!(rom.chr_rom().len(), 8 * 1024);
    }

    #[test]
    fn rejects_bad_magic() {
        let image = vec![0u8; 32];
        match NesRom::from_bytes(&image) {
            Err(RomError::BadMagic) => {}
            other => panic!("expected BadMagic, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rejects_truncated_prg() {
        let mut image = header(2, 1, 0, 0);
        image.extend(std::iter::repeat(0).take(1024));
        match NesRom::from_bytes(&image) {
            Err(RomError::Truncated) => {}
            other => panic!("expected Truncated, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rejects_ines2() {
        let image = {
            let mut v = header(1, 1, 0, 0x08);
            v.extend(std::iter::repeat(0).take(24 * 1024));
            v
        };
        match NesRom::from_bytes(&image) {
            Err(RomError::Ines2Unsupported) => {}
            other => panic!("expected Ines2Unsupported, got {:?}", other.map(|_| ())),
        }
    }
}
