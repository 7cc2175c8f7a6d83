#![no_std]

pub mod channel;
pub mod clock;
pub mod config;
pub mod control;
pub mod effect;
pub mod engine;
pub mod mailbox;
pub mod outputs;
pub mod random;
pub mod scheduler;

pub use channel::{Channel, ChannelKind, Polarity};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    BlinkConfig, ChannelMap, DemoConfig, EngineConfig, FireConfig, PulseConfig, StatusConfig,
};
pub use control::{
    Command, CommandMailbox, CommandReceiver, CommandSender, ControlError, Status, StatusBoard,
};
pub use effect::{
    BlinkEffect, DecayCurve, DemoOrchestrator, Direction, EffectScheduler, FireEffect, FireState,
    PulseEffect, StatusIndicator, TimerTask,
};
pub use engine::{Engine, TickResult};
pub use mailbox::{Mailbox, Receiver, Sender, TryReceiveError, TrySendError};
pub use outputs::{OutputBus, Outputs};
pub use random::{RandomSource, SplitMix64};
pub use scheduler::{ScheduleHandle, ScheduleKind, Scheduler, SchedulerFull};

pub use embassy_time::{Duration, Instant};
