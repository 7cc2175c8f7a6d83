//! Output channel descriptors.
//!
//! A [`Channel`] names one physical output and remembers its last logical
//! level. Writing goes through [`Outputs`](crate::outputs::Outputs), which
//! owns the bus and the shift register buffers.

/// Maximum duty of a binary channel.
const BINARY_FULL_SCALE: u16 = 1;

/// Number of bits in one shift register.
pub const SHIFT_REGISTER_BITS: u8 = 8;

/// Physical addressing of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// GPIO pin, observable on write
    Digital { pin: u8 },
    /// One bit of a shift register, observable after the register is flushed
    ShiftRegisterBit { register: u8, bit: u8 },
    /// PWM capable pin, observable on write
    Pwm { pin: u8, max_duty: u16 },
}

/// Mapping between logical "on" and the physical level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    ActiveHigh,
    /// LED wired to the supply rail, lit while the pin is low
    ActiveLow,
}

/// One addressable output and its current logical level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    kind: ChannelKind,
    polarity: Polarity,
    level: u16,
}

impl Channel {
    pub const fn digital(pin: u8) -> Self {
        Self::with_kind(ChannelKind::Digital { pin })
    }

    pub const fn shift_register_bit(register: u8, bit: u8) -> Self {
        Self::with_kind(ChannelKind::ShiftRegisterBit { register, bit })
    }

    pub const fn pwm(pin: u8, max_duty: u16) -> Self {
        Self::with_kind(ChannelKind::Pwm { pin, max_duty })
    }

    const fn with_kind(kind: ChannelKind) -> Self {
        Self {
            kind,
            polarity: Polarity::ActiveHigh,
            level: 0,
        }
    }

    /// Mark the channel as lit by a low level
    #[must_use]
    pub const fn active_low(mut self) -> Self {
        self.polarity = Polarity::ActiveLow;
        self
    }

    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub const fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Last logical level written, in `0..=full_scale()`
    pub const fn level(&self) -> u16 {
        self.level
    }

    pub const fn is_on(&self) -> bool {
        self.level > 0
    }

    /// Highest logical level: 1 for binary outputs, max duty for PWM
    pub const fn full_scale(&self) -> u16 {
        match self.kind {
            ChannelKind::Pwm { max_duty, .. } => max_duty,
            ChannelKind::Digital { .. } | ChannelKind::ShiftRegisterBit { .. } => {
                BINARY_FULL_SCALE
            }
        }
    }

    pub const fn is_buffered(&self) -> bool {
        matches!(self.kind, ChannelKind::ShiftRegisterBit { .. })
    }

    /// Clamp and store a logical level, returning the stored value
    pub(crate) fn store(&mut self, level: u16) -> u16 {
        self.level = level.min(self.full_scale());
        self.level
    }

    /// Physical value for the current logical level
    pub(crate) const fn physical_level(&self) -> u16 {
        match self.polarity {
            Polarity::ActiveHigh => self.level,
            Polarity::ActiveLow => self.full_scale() - self.level,
        }
    }
}
