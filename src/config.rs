//! Engine configuration and defaults.

use embassy_time::Duration;

use crate::channel::Channel;
use crate::effect::DecayCurve;

/// PWM range of the ESP8266 `analogWrite` (10 bit)
pub const DEFAULT_MAX_DUTY: u16 = 1023;

/// Shortest accepted timer interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Randomized blink across binary channels
#[derive(Debug, Clone, Copy)]
pub struct BlinkConfig {
    /// Delay between two blink ticks
    pub interval: Duration,
    /// Chance (0-100) that a channel flips on a tick
    pub chance_percent: u8,
}

impl BlinkConfig {
    pub const DEFAULT: Self = Self {
        interval: Duration::from_millis(200),
        chance_percent: 50,
    };
}

/// Triangle-wave breathing on a PWM channel
#[derive(Debug, Clone, Copy)]
pub struct PulseConfig {
    /// Delay between two duty steps
    pub interval: Duration,
    /// Duty change per step; the sign selects the initial direction
    pub fade_step: i32,
}

impl PulseConfig {
    pub const DEFAULT: Self = Self {
        interval: Duration::from_millis(30),
        fade_step: 5,
    };
}

/// One-shot decay on a PWM channel
#[derive(Debug, Clone, Copy)]
pub struct FireConfig {
    /// Time from peak duty to zero
    pub duration: Duration,
    /// Refresh cadence while decaying
    pub refresh: Duration,
    pub curve: DecayCurve,
}

impl FireConfig {
    pub const DEFAULT: Self = Self {
        duration: Duration::from_millis(1000),
        refresh: Duration::from_millis(20),
        curve: DecayCurve::Linear,
    };
}

/// Unattended demo orchestration
#[derive(Debug, Clone, Copy)]
pub struct DemoConfig {
    /// Cadence of the randomization step
    pub period: Duration,
    /// Chance (0-100) of a fire trigger per step
    pub fire_chance_percent: u8,
}

impl DemoConfig {
    pub const DEFAULT: Self = Self {
        period: Duration::from_millis(1000),
        fire_chance_percent: 10,
    };
}

/// Connectivity indicator
#[derive(Debug, Clone, Copy)]
pub struct StatusConfig {
    /// Blink half-period while no peer is connected
    pub period: Duration,
}

impl StatusConfig {
    pub const DEFAULT: Self = Self {
        period: Duration::from_millis(500),
    };
}

/// Channel bindings, fixed for the lifetime of the engine
#[derive(Debug, Clone, Copy)]
pub struct ChannelMap<const CHANNELS: usize> {
    pub blink: [Channel; CHANNELS],
    pub pulse: Channel,
    pub fire: Channel,
    pub status: Channel,
}

/// Configuration for the effects engine
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig<const CHANNELS: usize> {
    pub channels: ChannelMap<CHANNELS>,
    pub blink: BlinkConfig,
    pub pulse: PulseConfig,
    pub fire: FireConfig,
    pub demo: DemoConfig,
    pub status: StatusConfig,
}

impl<const CHANNELS: usize> EngineConfig<CHANNELS> {
    /// Default tunables for the given channel bindings
    pub const fn new(channels: ChannelMap<CHANNELS>) -> Self {
        Self {
            channels,
            blink: BlinkConfig::DEFAULT,
            pulse: PulseConfig::DEFAULT,
            fire: FireConfig::DEFAULT,
            demo: DemoConfig::DEFAULT,
            status: StatusConfig::DEFAULT,
        }
    }
}

pub(crate) const fn clamp_interval(interval: Duration) -> Duration {
    if interval.as_millis() < MIN_INTERVAL.as_millis() {
        MIN_INTERVAL
    } else {
        interval
    }
}

pub(crate) fn clamp_percent(percent: u32) -> u8 {
    u8::try_from(percent.min(100)).unwrap_or(100)
}
