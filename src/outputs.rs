//! Channel writes and shift register buffering.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::channel::{Channel, ChannelKind, SHIFT_REGISTER_BITS};

/// Physical output capability
///
/// Implement this trait to bridge the engine to GPIO, PWM and shift
/// register peripherals. The engine is generic over this trait.
pub trait OutputBus {
    /// Drive a GPIO pin
    fn write_pin(&mut self, pin: u8, high: bool);

    /// Set PWM duty on a pin
    fn write_duty(&mut self, pin: u8, duty: u16);

    /// Shift a full byte into a register and latch it
    fn shift_out(&mut self, register: u8, bits: u8);
}

/// Output stage: the bus plus one buffered byte per shift register.
///
/// Digital and PWM writes reach the bus immediately. Shift register bits are
/// collected in the buffer and become visible on [`Outputs::flush`].
pub struct Outputs<B: OutputBus, const REGISTERS: usize> {
    bus: B,
    registers: [u8; REGISTERS],
    pending: [bool; REGISTERS],
}

impl<B: OutputBus, const REGISTERS: usize> Outputs<B, REGISTERS> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            registers: [0; REGISTERS],
            pending: [false; REGISTERS],
        }
    }

    /// Write a logical level, clamped to the channel's full scale
    pub fn write(&mut self, channel: &mut Channel, level: u16) {
        channel.store(level);
        let physical = channel.physical_level();
        match channel.kind() {
            ChannelKind::Digital { pin } => self.bus.write_pin(pin, physical > 0),
            ChannelKind::Pwm { pin, .. } => self.bus.write_duty(pin, physical),
            ChannelKind::ShiftRegisterBit { register, bit } => {
                self.buffer_bit(register, bit, physical > 0);
            }
        }
    }

    /// Write and latch at once, even when the channel is a shift register bit
    pub fn write_through(&mut self, channel: &mut Channel, level: u16) {
        self.write(channel, level);
        if channel.is_buffered() {
            self.flush();
        }
    }

    /// Drive a channel fully on or off
    pub fn set_on(&mut self, channel: &mut Channel, on: bool) {
        let level = if on { channel.full_scale() } else { 0 };
        self.write(channel, level);
    }

    /// Invert a channel between off and full scale
    pub fn toggle(&mut self, channel: &mut Channel) {
        let on = !channel.is_on();
        self.set_on(channel, on);
    }

    /// Latch every register with unflushed bits
    pub fn flush(&mut self) {
        for (index, pending) in self.pending.iter_mut().enumerate() {
            if !*pending {
                continue;
            }
            *pending = false;
            #[allow(clippy::cast_possible_truncation)]
            self.bus.shift_out(index as u8, self.registers[index]);
        }
    }

    /// Buffered byte of one register, including unflushed bits
    pub fn register(&self, register: u8) -> Option<u8> {
        self.registers.get(usize::from(register)).copied()
    }

    /// Whether any register holds bits that were not latched yet
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|pending| *pending)
    }

    pub const fn bus(&self) -> &B {
        &self.bus
    }

    fn buffer_bit(&mut self, register: u8, bit: u8, high: bool) {
        let index = usize::from(register);
        if index >= REGISTERS || bit >= SHIFT_REGISTER_BITS {
            #[cfg(feature = "esp32-log")]
            println!(
                "[Outputs.write] dropping write to register {} bit {}",
                register, bit
            );
            return;
        }
        let mask = 1u8 << bit;
        let byte = &mut self.registers[index];
        let updated = if high { *byte | mask } else { *byte & !mask };
        if updated != *byte {
            *byte = updated;
            self.pending[index] = true;
        }
    }
}
