//! Control-plane commands and status reporting.
//!
//! Transports decode a request into a [`Command`] with [`Command::parse`]
//! and either apply it on the engine thread directly or queue it through a
//! [`CommandMailbox`]. Engine state is mirrored into a [`StatusBoard`] for
//! readers running in other contexts.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

use crate::mailbox::{Mailbox, Receiver, Sender};

const OP_START_BLINK: &str = "start_blink";
const OP_STOP_BLINK: &str = "stop_blink";
const OP_FADE: &str = "fade";
const OP_INTERVAL: &str = "interval";
const OP_CHANCE: &str = "chance";
const OP_FADE_STEP: &str = "fade_step";
const OP_START_PULSE: &str = "start_pulse";
const OP_STOP_PULSE: &str = "stop_pulse";
const OP_FIRE: &str = "fire";
const OP_START_DEMO: &str = "start_demo";
const OP_STOP_DEMO: &str = "stop_demo";
const OP_STATUS: &str = "status";
const OP_PEER: &str = "peer";

/// Operation requested by the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartBlink,
    StopBlink,
    /// Direct duty override of the pulse channel
    SetFade(u32),
    /// Blink interval in milliseconds
    SetInterval(u32),
    /// Blink flip chance in percent
    SetChance(u32),
    SetFadeStep(i32),
    StartPulse,
    StopPulse,
    Fire,
    StartDemo,
    StopDemo,
    GetStatus,
    PeerConnected(bool),
}

/// Why a request could not be turned into a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// The operation needs an argument and none was given
    MissingParameter,
    /// The argument is not a number (or not a boolean)
    InvalidParameter,
    UnknownOperation,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter => f.write_str("missing parameter"),
            Self::InvalidParameter => f.write_str("invalid parameter"),
            Self::UnknownOperation => f.write_str("unknown operation"),
        }
    }
}

impl Command {
    /// Decode a logical operation name and its optional argument
    pub fn parse(operation: &str, argument: Option<&str>) -> Result<Self, ControlError> {
        let argument = argument.map(str::trim);
        Ok(match operation {
            OP_START_BLINK => Self::StartBlink,
            OP_STOP_BLINK => Self::StopBlink,
            OP_FADE => Self::SetFade(parse_number(argument)?),
            OP_INTERVAL => Self::SetInterval(parse_number(argument)?),
            OP_CHANCE => Self::SetChance(parse_number(argument)?),
            OP_FADE_STEP => Self::SetFadeStep(parse_number(argument)?),
            OP_START_PULSE => Self::StartPulse,
            OP_STOP_PULSE => Self::StopPulse,
            OP_FIRE => Self::Fire,
            OP_START_DEMO => Self::StartDemo,
            OP_STOP_DEMO => Self::StopDemo,
            OP_STATUS => Self::GetStatus,
            OP_PEER => Self::PeerConnected(parse_bool(argument)?),
            _ => return Err(ControlError::UnknownOperation),
        })
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartBlink => OP_START_BLINK,
            Self::StopBlink => OP_STOP_BLINK,
            Self::SetFade(_) => OP_FADE,
            Self::SetInterval(_) => OP_INTERVAL,
            Self::SetChance(_) => OP_CHANCE,
            Self::SetFadeStep(_) => OP_FADE_STEP,
            Self::StartPulse => OP_START_PULSE,
            Self::StopPulse => OP_STOP_PULSE,
            Self::Fire => OP_FIRE,
            Self::StartDemo => OP_START_DEMO,
            Self::StopDemo => OP_STOP_DEMO,
            Self::GetStatus => OP_STATUS,
            Self::PeerConnected(_) => OP_PEER,
        }
    }
}

fn parse_number<N: core::str::FromStr>(argument: Option<&str>) -> Result<N, ControlError> {
    match argument {
        None | Some("") => Err(ControlError::MissingParameter),
        Some(value) => value.parse().map_err(|_| ControlError::InvalidParameter),
    }
}

fn parse_bool(argument: Option<&str>) -> Result<bool, ControlError> {
    match argument {
        None | Some("") => Err(ControlError::MissingParameter),
        Some("1" | "true" | "on") => Ok(true),
        Some("0" | "false" | "off") => Ok(false),
        Some(_) => Err(ControlError::InvalidParameter),
    }
}

/// Snapshot of the engine as reported to the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub blinking: bool,
    /// Current duty of the pulse channel
    pub duty: u16,
    pub interval_ms: u64,
    pub chance_percent: u8,
    pub pulsing: bool,
    pub fire_active: bool,
    pub demo_active: bool,
    pub peer_connected: bool,
}

impl Status {
    const IDLE: Self = Self {
        blinking: false,
        duty: 0,
        interval_ms: 0,
        chance_percent: 0,
        pulsing: false,
        fire_active: false,
        demo_active: false,
        peer_connected: false,
    };
}

/// Latest [`Status`], shared between the engine and other contexts.
pub struct StatusBoard {
    inner: Mutex<Cell<Status>>,
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(Status::IDLE)),
        }
    }

    pub fn publish(&self, status: Status) {
        critical_section::with(|cs| self.inner.borrow(cs).set(status));
    }

    pub fn snapshot(&self) -> Status {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue of commands for the engine thread
pub type CommandMailbox<const SIZE: usize> = Mailbox<Command, SIZE>;

pub type CommandSender<'a, const SIZE: usize> = Sender<'a, Command, SIZE>;

pub type CommandReceiver<'a, const SIZE: usize> = Receiver<'a, Command, SIZE>;
