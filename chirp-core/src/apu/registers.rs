pub const REGISTERS_START: u16 = 0xFF10;
pub const REGISTERS_END: u16 = 0xFF3F;
pub const WAVE_RAM_START: u16 = 0xFF30;
// NR10 to NR52 plus the unused gap, wave RAM is kept apart
pub const REGISTER_COUNT: usize = 0x20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Nr10,
    Nr11,
    Nr12,
    Nr13,
    Nr14,
    Nr21,
    Nr22,
    Nr23,
    Nr24,
    Nr30,
    Nr31,
    Nr32,
    Nr33,
    Nr34,
    Nr41,
    Nr42,
    Nr43,
    Nr44,
    Nr50,
    Nr51,
    Nr52,
    Unused(u16),
    WaveRam(u8),
}

impl Register {
    #[must_use]
    #[inline]
    pub const fn decode(address: u16) -> Option<Self> {
        use Register::{
            Nr10, Nr11, Nr12, Nr13, Nr14, Nr21, Nr22, Nr23, Nr24, Nr30, Nr31, Nr32, Nr33, Nr34,
            Nr41, Nr42, Nr43, Nr44, Nr50, Nr51, Nr52, Unused, WaveRam,
        };

        let reg = match address {
            0xFF10 => Nr10,
            0xFF11 => Nr11,
            0xFF12 => Nr12,
            0xFF13 => Nr13,
            0xFF14 => Nr14,
            0xFF16 => Nr21,
            0xFF17 => Nr22,
            0xFF18 => Nr23,
            0xFF19 => Nr24,
            0xFF1A => Nr30,
            0xFF1B => Nr31,
            0xFF1C => Nr32,
            0xFF1D => Nr33,
            0xFF1E => Nr34,
            0xFF20 => Nr41,
            0xFF21 => Nr42,
            0xFF22 => Nr43,
            0xFF23 => Nr44,
            0xFF24 => Nr50,
            0xFF25 => Nr51,
            0xFF26 => Nr52,
            0xFF15 | 0xFF1F | 0xFF27..=0xFF2F => Unused(address),
            #[expect(clippy::cast_possible_truncation)]
            WAVE_RAM_START..=REGISTERS_END => WaveRam((address - WAVE_RAM_START) as u8),
            _ => return None,
        };

        Some(reg)
    }

    // Index into the register array, `None` for wave RAM.
    #[must_use]
    #[inline]
    pub const fn index(address: u16) -> Option<usize> {
        if address >= REGISTERS_START && address < WAVE_RAM_START {
            Some((address - REGISTERS_START) as usize)
        } else {
            None
        }
    }

    /// Channel the register belongs to, `None` for global registers.
    #[must_use]
    #[inline]
    pub const fn channel(self) -> Option<usize> {
        use Register::{
            Nr10, Nr11, Nr12, Nr13, Nr14, Nr21, Nr22, Nr23, Nr24, Nr30, Nr31, Nr32, Nr33, Nr34,
            Nr41, Nr42, Nr43, Nr44, WaveRam,
        };

        match self {
            Nr10 | Nr11 | Nr12 | Nr13 | Nr14 => Some(0),
            Nr21 | Nr22 | Nr23 | Nr24 => Some(1),
            Nr30 | Nr31 | Nr32 | Nr33 | Nr34 | WaveRam(_) => Some(2),
            Nr41 | Nr42 | Nr43 | Nr44 => Some(3),
            _ => None,
        }
    }

    /// Bits that always read back as one.
    #[must_use]
    #[inline]
    pub const fn read_mask(self) -> u8 {
        use Register::{
            Nr10, Nr11, Nr12, Nr13, Nr14, Nr21, Nr22, Nr23, Nr24, Nr30, Nr31, Nr32, Nr33, Nr34,
            Nr41, Nr42, Nr43, Nr44, Nr50, Nr51, Nr52, Unused, WaveRam,
        };

        match self {
            Nr10 => 0x80,
            Nr11 | Nr21 => 0x3F,
            Nr12 | Nr22 | Nr42 | Nr43 | Nr50 | Nr51 | WaveRam(_) => 0x00,
            Nr13 | Nr23 | Nr31 | Nr33 | Nr41 | Unused(_) => 0xFF,
            Nr14 | Nr24 | Nr34 | Nr44 => 0xBF,
            Nr30 => 0x7F,
            Nr32 => 0x9F,
            Nr52 => 0x70,
        }
    }
}

// Post-boot values for NR10 to NR51, written in order without trigger bits.
pub const POWER_ON: [(u16, u8); 20] = [
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF13, 0xFF),
    (0xFF14, 0x3F),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF18, 0xFF),
    (0xFF19, 0x3F),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1D, 0xFF),
    (0xFF1E, 0x3F),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0x3F),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
];

pub const WAVE_PATTERN: [u8; 16] = [
    0xAC, 0xDD, 0xDA, 0x48, 0x36, 0x02, 0xCF, 0x16, 0x2C, 0x04, 0xE5, 0x2C, 0xAC, 0xDD, 0xDA,
    0x48,
];
