//! Connectivity indicator
//!
//! Steady on while a peer is connected, blinking otherwise.

use embassy_time::Instant;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{EffectScheduler, TimerTask, schedule_task};
use crate::{
    channel::Channel,
    config::{StatusConfig, clamp_interval},
    outputs::{OutputBus, Outputs},
    scheduler::ScheduleHandle,
};

#[derive(Debug, Clone)]
pub struct StatusIndicator {
    channel: Channel,
    config: StatusConfig,
    peer_connected: bool,
    handle: Option<ScheduleHandle>,
}

impl StatusIndicator {
    pub fn new(channel: Channel, config: StatusConfig) -> Self {
        Self {
            channel,
            config: StatusConfig {
                period: clamp_interval(config.period),
            },
            peer_connected: false,
            handle: None,
        }
    }

    pub fn start(&mut self, scheduler: &mut EffectScheduler, now: Instant) {
        self.handle = schedule_task(scheduler, TimerTask::Status, self.config.period, now);
    }

    /// Record the connectivity signal; the channel follows on the next tick
    pub fn set_peer_connected(&mut self, connected: bool) {
        #[cfg(feature = "esp32-log")]
        if connected != self.peer_connected {
            println!("[StatusIndicator] peer connected: {}", connected);
        }
        self.peer_connected = connected;
    }

    pub fn tick<B: OutputBus, const R: usize>(&mut self, outputs: &mut Outputs<B, R>) {
        let level = if self.peer_connected || !self.channel.is_on() {
            self.channel.full_scale()
        } else {
            0
        };
        outputs.write_through(&mut self.channel, level);
    }

    /// Force the channel off until the next tick
    pub fn switch_off<B: OutputBus, const R: usize>(&mut self, outputs: &mut Outputs<B, R>) {
        outputs.write_through(&mut self.channel, 0);
    }

    pub const fn peer_connected(&self) -> bool {
        self.peer_connected
    }

    pub const fn channel(&self) -> &Channel {
        &self.channel
    }

    pub const fn handle(&self) -> Option<ScheduleHandle> {
        self.handle
    }
}
