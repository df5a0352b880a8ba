use super::sweep::Sweep;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Duty {
    #[default]
    Eighth = 0,
    Quarter = 1,
    Half = 2,
    ThreeQuarters = 3,
}

impl Duty {
    // one bit per duty step, read from bit 0 upwards
    const fn pattern(self) -> u8 {
        match self {
            Self::Eighth => 0b0000_0001,
            Self::Quarter => 0b1000_0001,
            Self::Half => 0b1000_0111,
            Self::ThreeQuarters => 0b0111_1110,
        }
    }
}

impl From<u8> for Duty {
    fn from(val: u8) -> Self {
        match (val >> 6) & 3 {
            0 => Self::Eighth,
            1 => Self::Quarter,
            2 => Self::Half,
            _ => Self::ThreeQuarters,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Square {
    duty: Duty,
    phase: u8, // 0 to 7
    sweep: Option<Sweep>,
}

impl Square {
    pub const fn advance(&mut self) {
        self.phase = (self.phase + 1) & 7;
    }

    pub const fn duty(&self) -> Duty {
        self.duty
    }

    pub const fn from_raw(duty: Duty, phase: u8, sweep: Option<Sweep>) -> Self {
        Self {
            duty,
            phase: phase & 7,
            sweep,
        }
    }

    pub const fn high(&self) -> bool {
        self.duty.pattern() & (1 << self.phase) != 0
    }

    pub fn new(with_sweep: bool) -> Self {
        Self {
            duty: Duty::default(),
            phase: 0,
            sweep: with_sweep.then(Sweep::default),
        }
    }

    pub const fn period_cycles(freq: u16) -> u32 {
        4 * (2048 - (freq & 0x7FF) as u32)
    }

    pub const fn phase(&self) -> u8 {
        self.phase
    }

    pub const fn reset_phase(&mut self) {
        self.phase = 0;
    }

    pub const fn set_duty(&mut self, duty: Duty) {
        self.duty = duty;
    }

    pub const fn sweep(&self) -> Option<&Sweep> {
        self.sweep.as_ref()
    }

    pub const fn sweep_mut(&mut self) -> Option<&mut Sweep> {
        self.sweep.as_mut()
    }
}
