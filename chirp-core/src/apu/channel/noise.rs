const LFSR_SEED: u16 = 0x7FFF;
// clock shifts 14 and 15 stop the generator
const MAX_CLOCK_SHIFT: u16 = 13;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Noise {
    divisor_code: u8, // 3 bits
    // linear feedback shift register
    lfsr: u16,
    narrow: bool,
}

impl Default for Noise {
    fn default() -> Self {
        Self {
            divisor_code: 0,
            lfsr: LFSR_SEED,
            narrow: false,
        }
    }
}

impl Noise {
    pub const fn advance(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 14);

        if self.narrow {
            self.lfsr = (self.lfsr & !(1 << 6)) | (bit << 6);
        }
    }

    pub const fn divisor(&self) -> u32 {
        match self.divisor_code {
            0 => 8,
            code => 16 * code as u32,
        }
    }

    pub const fn divisor_code(&self) -> u8 {
        self.divisor_code
    }

    pub const fn from_raw(lfsr: u16, narrow: bool, divisor_code: u8) -> Self {
        Self {
            divisor_code: divisor_code & 7,
            lfsr: lfsr & LFSR_SEED,
            narrow,
        }
    }

    pub const fn high(&self) -> bool {
        self.lfsr & 1 == 0
    }

    pub const fn lfsr(&self) -> u16 {
        self.lfsr
    }

    pub const fn narrow(&self) -> bool {
        self.narrow
    }

    pub const fn period_cycles(&self, clock_shift: u16) -> u32 {
        if clock_shift > MAX_CLOCK_SHIFT {
            0
        } else {
            self.divisor() << clock_shift
        }
    }

    pub const fn reset(&mut self) {
        self.lfsr = LFSR_SEED;
    }

    pub const fn write(&mut self, val: u8) {
        self.narrow = val & 8 != 0;
        self.divisor_code = val & 7;
    }
}
