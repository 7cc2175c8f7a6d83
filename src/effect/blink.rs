//! Randomized multi-channel blink
//!
//! On every tick each channel independently flips with probability
//! `chance_percent`. Shift register channels are latched together once per
//! tick, so a tick is a single visual update.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{EffectScheduler, TimerTask, cancel_task, schedule_task};
use crate::{
    channel::Channel,
    config::{BlinkConfig, clamp_interval, clamp_percent},
    outputs::{OutputBus, Outputs},
    random::RandomSource,
    scheduler::ScheduleHandle,
};

#[derive(Debug, Clone)]
pub struct BlinkEffect<const N: usize> {
    channels: [Channel; N],
    config: BlinkConfig,
    enabled: bool,
    handle: Option<ScheduleHandle>,
}

impl<const N: usize> BlinkEffect<N> {
    pub fn new(channels: [Channel; N], config: BlinkConfig) -> Self {
        Self {
            channels,
            config: BlinkConfig {
                interval: clamp_interval(config.interval),
                chance_percent: clamp_percent(u32::from(config.chance_percent)),
            },
            enabled: false,
            handle: None,
        }
    }

    /// Enable blinking. Restarting a running effect replaces its timer.
    pub fn start(&mut self, scheduler: &mut EffectScheduler, now: Instant) {
        #[cfg(feature = "esp32-log")]
        println!(
            "[BlinkEffect.start] every {}ms, {}% chance",
            self.config.interval.as_millis(),
            self.config.chance_percent
        );
        self.enabled = true;
        self.handle = schedule_task(scheduler, TimerTask::Blink, self.config.interval, now);
    }

    /// Disable blinking and switch every channel off
    pub fn stop<B: OutputBus, const R: usize>(
        &mut self,
        scheduler: &mut EffectScheduler,
        outputs: &mut Outputs<B, R>,
    ) {
        #[cfg(feature = "esp32-log")]
        println!("[BlinkEffect.stop]");
        self.enabled = false;
        cancel_task(scheduler, &mut self.handle);
        for channel in &mut self.channels {
            outputs.set_on(channel, false);
        }
        outputs.flush();
    }

    /// Change the tick interval.
    ///
    /// A running timer is re-armed at once, so the new interval applies to
    /// the very next tick.
    pub fn set_interval(
        &mut self,
        interval: Duration,
        scheduler: &mut EffectScheduler,
        now: Instant,
    ) {
        self.config.interval = clamp_interval(interval);
        if !self.enabled {
            return;
        }
        let interval = self.config.interval;
        self.handle = self
            .handle
            .and_then(|handle| scheduler.retime(handle, interval))
            .or_else(|| schedule_task(scheduler, TimerTask::Blink, interval, now));
    }

    /// Change the flip probability, clamped to 0-100
    pub fn set_chance(&mut self, percent: u32) {
        self.config.chance_percent = clamp_percent(percent);
    }

    /// Flip each channel with the configured probability
    pub fn tick<B: OutputBus, Rng: RandomSource, const R: usize>(
        &mut self,
        outputs: &mut Outputs<B, R>,
        rng: &mut Rng,
    ) {
        let chance = u32::from(self.config.chance_percent);
        for channel in &mut self.channels {
            if rng.below(100) < chance {
                outputs.toggle(channel);
            }
        }
        outputs.flush();
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn interval(&self) -> Duration {
        self.config.interval
    }

    pub const fn chance_percent(&self) -> u8 {
        self.config.chance_percent
    }

    pub const fn channels(&self) -> &[Channel; N] {
        &self.channels
    }

    pub const fn handle(&self) -> Option<ScheduleHandle> {
        self.handle
    }
}
