#![allow(dead_code)]

use std::collections::HashMap;

use myrtio_light_effects::{
    Channel, ChannelMap, Duration, Engine, EngineConfig, FireConfig, ManualClock, OutputBus,
    RandomSource, SplitMix64, TickResult,
};

/// Everything the engine pushed to the hardware, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Pin(u8, bool),
    Duty(u8, u16),
    Shift(u8, u8),
}

#[derive(Debug, Default)]
pub struct MockBus {
    pub events: Vec<BusEvent>,
    pins: HashMap<u8, bool>,
    duties: HashMap<u8, u16>,
    registers: HashMap<u8, u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self, pin: u8) -> Option<bool> {
        self.pins.get(&pin).copied()
    }

    pub fn duty(&self, pin: u8) -> Option<u16> {
        self.duties.get(&pin).copied()
    }

    /// Latched byte of a shift register
    pub fn register(&self, register: u8) -> Option<u8> {
        self.registers.get(&register).copied()
    }

    pub fn shift_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, BusEvent::Shift(..)))
            .count()
    }
}

impl OutputBus for MockBus {
    fn write_pin(&mut self, pin: u8, high: bool) {
        self.pins.insert(pin, high);
        self.events.push(BusEvent::Pin(pin, high));
    }

    fn write_duty(&mut self, pin: u8, duty: u16) {
        self.duties.insert(pin, duty);
        self.events.push(BusEvent::Duty(pin, duty));
    }

    fn shift_out(&mut self, register: u8, bits: u8) {
        self.registers.insert(register, bits);
        self.events.push(BusEvent::Shift(register, bits));
    }
}

/// Random source replaying fixed percentages (results of `below(100)`)
pub struct ScriptedRng {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedRng {
    pub fn percents(percents: &[u32]) -> Self {
        let values = percents
            .iter()
            .map(|&percent| {
                // Smallest raw value whose multiply-high reduction yields `percent`
                let raw = (u64::from(percent) << 32).div_ceil(100);
                u32::try_from(raw).unwrap()
            })
            .collect();
        Self { values, next: 0 }
    }
}

impl RandomSource for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

pub const BLINK_PINS: [u8; 3] = [4, 5, 12];
pub const PULSE_PIN: u8 = 13;
pub const FIRE_PIN: u8 = 14;
pub const STATUS_PIN: u8 = 2;
pub const MAX_DUTY: u16 = 1000;

pub fn channel_map() -> ChannelMap<3> {
    ChannelMap {
        blink: BLINK_PINS.map(Channel::digital),
        pulse: Channel::pwm(PULSE_PIN, MAX_DUTY),
        fire: Channel::pwm(FIRE_PIN, MAX_DUTY),
        status: Channel::digital(STATUS_PIN),
    }
}

pub fn engine_config() -> EngineConfig<3> {
    let mut config = EngineConfig::new(channel_map());
    config.fire = FireConfig {
        duration: Duration::from_millis(1000),
        refresh: Duration::from_millis(20),
        ..FireConfig::DEFAULT
    };
    config
}

pub type TestEngine<'a> = Engine<MockBus, &'a ManualClock, SplitMix64, 3, 1>;

pub fn engine(clock: &ManualClock) -> TestEngine<'_> {
    engine_with(clock, engine_config())
}

pub fn engine_with(clock: &ManualClock, config: EngineConfig<3>) -> TestEngine<'_> {
    Engine::new(MockBus::new(), clock, SplitMix64::new(0xdecade), &config)
}

/// Advance the clock by `by_ms` and tick at the new time
pub fn step(engine: &mut TestEngine<'_>, clock: &ManualClock, by_ms: u64) -> TickResult {
    let now = clock.advance(Duration::from_millis(by_ms));
    engine.tick(now)
}

/// Tick every `every_ms` until `total_ms` have passed
pub fn run_for(engine: &mut TestEngine<'_>, clock: &ManualClock, total_ms: u64, every_ms: u64) {
    let mut elapsed = 0;
    while elapsed < total_ms {
        step(engine, clock, every_ms);
        elapsed += every_ms;
    }
}
