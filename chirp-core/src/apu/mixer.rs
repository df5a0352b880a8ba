use super::channel::Channel;

/// Scale of one unit of channel amplitude before master volume.
pub const AMPLITUDE_UNIT: i32 = 546;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MasterVolume {
    left_vin: bool,
    left_volume: u8,
    right_vin: bool,
    right_volume: u8,
}

impl MasterVolume {
    #[must_use]
    pub const fn from_nr50(val: u8) -> Self {
        let mut master = Self {
            left_vin: false,
            left_volume: 0,
            right_vin: false,
            right_volume: 0,
        };
        master.write_nr50(val);
        master
    }

    pub const fn left_volume(&self) -> u8 {
        self.left_volume
    }

    #[must_use]
    pub fn read_nr50(&self) -> u8 {
        self.right_volume
            | (u8::from(self.right_vin) << 3)
            | (self.left_volume << 4)
            | (u8::from(self.left_vin) << 7)
    }

    pub const fn right_volume(&self) -> u8 {
        self.right_volume
    }

    pub const fn write_nr50(&mut self, val: u8) {
        self.right_volume = val & 7;
        self.right_vin = val & 8 != 0;
        self.left_volume = (val >> 4) & 7;
        self.left_vin = val & 0x80 != 0;
    }
}

#[expect(clippy::cast_possible_truncation)]
fn mix_side(channels: &[Channel], volume: u8, routed: impl Fn(&Channel) -> bool) -> i16 {
    let sum: i32 = channels
        .iter()
        .filter(|&c| routed(c) && !c.muted() && c.active())
        .map(|c| i32::from(c.val()))
        .sum();

    // NR50 volumes are 0-7, so full master volume is half scale. The other
    // half is headroom.
    let scaled = sum * AMPLITUDE_UNIT * (i32::from(volume) + 1) / 16;
    scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Mixes the channels into one `(left, right)` pair.
#[must_use]
pub fn mix(channels: &[Channel], master: MasterVolume) -> (i16, i16) {
    let left = mix_side(channels, master.left_volume(), Channel::on_left);
    let right = mix_side(channels, master.right_volume(), Channel::on_right);
    (left, right)
}
