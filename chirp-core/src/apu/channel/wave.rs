pub const WAVE_RAM_SIZE: usize = 16;
pub const WAVE_SAMPLES: u8 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Wave {
    index: u8,  // 0 to 31
    sample: u8, // last nibble read
}

impl Wave {
    pub const fn advance(&mut self, ram: &[u8; WAVE_RAM_SIZE]) {
        self.index = (self.index + 1) % WAVE_SAMPLES;
        self.sample = Self::nibble(ram, self.index);
    }

    // Output level 0 mutes, 1 is full volume, 2 half and 3 a quarter.
    pub const fn amplitude(&self, level: u8) -> i16 {
        let shift = match level & 3 {
            0 => 4,
            l => l - 1,
        };

        2 * (self.sample >> shift) as i16 - (15 >> shift)
    }

    pub const fn from_raw(index: u8, sample: u8) -> Self {
        Self {
            index: index % WAVE_SAMPLES,
            sample: sample & 0xF,
        }
    }

    pub const fn index(&self) -> u8 {
        self.index
    }

    // high nibble first
    pub const fn nibble(ram: &[u8; WAVE_RAM_SIZE], index: u8) -> u8 {
        let byte = ram[(index as usize / 2) % WAVE_RAM_SIZE];
        if index & 1 == 0 { byte >> 4 } else { byte & 0xF }
    }

    pub const fn period_cycles(freq: u16) -> u32 {
        2 * (2048 - (freq & 0x7FF) as u32)
    }

    pub const fn reset(&mut self, ram: &[u8; WAVE_RAM_SIZE]) {
        self.index = 0;
        self.sample = Self::nibble(ram, 0);
    }

    pub const fn sample(&self) -> u8 {
        self.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAMP: [u8; WAVE_RAM_SIZE] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
        0x32, 0x10,
    ];

    #[test]
    fn test_reads_high_nibble_first() {
        let mut wave = Wave::default();
        wave.reset(&RAMP);
        assert_eq!(wave.sample(), 0x0);

        wave.advance(&RAMP);
        assert_eq!(wave.sample(), 0x1);
        wave.advance(&RAMP);
        assert_eq!(wave.sample(), 0x2);
    }

    #[test]
    fn test_index_wraps() {
        let mut wave = Wave::default();
        wave.reset(&RAMP);

        for _ in 0..WAVE_SAMPLES {
            wave.advance(&RAMP);
        }

        assert_eq!(wave.index(), 0);
        assert_eq!(wave.sample(), 0x0);
    }

    #[test]
    fn test_output_levels() {
        let wave = Wave::from_raw(0, 0xF);

        assert_eq!(wave.amplitude(0), 0);
        assert_eq!(wave.amplitude(1), 15);
        assert_eq!(wave.amplitude(2), 7);
        assert_eq!(wave.amplitude(3), 3);

        let low = Wave::from_raw(0, 0);
        assert_eq!(low.amplitude(1), -15);
        assert_eq!(low.amplitude(2), -7);
    }
}
