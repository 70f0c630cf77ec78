//! Command processing root.
//!
//! Wire protocol types, the opcode registry and the dispatch path that
//! routes decoded command frames to their handlers.
//!
//! ## Module Structure
//!
//! - `handlers`: one handler function per registered opcode
//!
//! A command frame is a single-letter opcode plus zero or more signed
//! 16-bit arguments and an optional string payload. Every frame
//! produces exactly one bracketed reply line: `[0]` or `[0,...]` on
//! success, `[code,"message"]` on failure. Frames the transport cannot
//! route (unknown opcode, too few arguments, missing string payload)
//! are answered with [`ERR_TRANSPORT`] replies and never reach a
//! handler.

pub mod handlers;

use crate::controller::{ActuatorController, ControlError};
use core::fmt::{self, Write as _};
use romi_common::consts::{ERR_TRANSPORT, MAX_ERROR_LEN, MAX_REPLY_LEN};
use std::collections::HashMap;
use tracing::trace;

/// Decoded command frame handed to a handler. Arity and string
/// presence are validated by the dispatcher, so a handler may index
/// `args` up to its registered minimum and unwrap `text` when its
/// entry declares `expects_string`.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Signed 16-bit arguments in wire order.
    pub args: &'a [i16],
    /// Quoted string payload, when the frame carried one.
    pub text: Option<&'a str>,
}

/// Handler signature: consume a validated request, mutate the actuator,
/// produce exactly one reply.
pub type HandlerFn = fn(&mut ActuatorController, &Request) -> Reply;

/// One row of the opcode table.
#[derive(Debug, Clone, Copy)]
pub struct CommandEntry {
    /// Single-letter opcode.
    pub opcode: u8,
    /// Minimum number of arguments the handler requires.
    pub min_args: usize,
    /// Whether the handler requires a quoted string payload.
    pub expects_string: bool,
    /// Handler invoked once arity is validated.
    pub handler: HandlerFn,
}

/// Reply to a single command frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Success without payload: `[0]`.
    Ok,
    /// Success with numeric payload: `[0,v1,...]`.
    Values(heapless::Vec<i64, 4>),
    /// Firmware identity: `[0,"name","version","stamp"]`.
    Info {
        /// Firmware name.
        name: &'static str,
        /// Firmware version.
        version: &'static str,
        /// Build stamp.
        stamp: &'static str,
    },
    /// Failure: `[code,"message"]`.
    Error {
        /// Wire error code.
        code: u8,
        /// Human-readable message, truncated to the wire limit.
        message: heapless::String<MAX_ERROR_LEN>,
    },
}

impl Reply {
    /// Success reply with a numeric payload. Values beyond the payload
    /// capacity are dropped.
    pub fn values(items: &[i64]) -> Self {
        let mut payload = heapless::Vec::new();
        for item in items {
            if payload.push(*item).is_err() {
                break;
            }
        }
        Self::Values(payload)
    }

    /// Failure reply. The message is truncated to [`MAX_ERROR_LEN`].
    pub fn error(code: u8, message: &str) -> Self {
        let mut text = heapless::String::new();
        for ch in message.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }
        Self::Error {
            code,
            message: text,
        }
    }

    /// Failure reply for a controller error, carrying its wire code and
    /// display text.
    pub fn failure(err: &ControlError) -> Self {
        Self::error(err.code(), &err.to_string())
    }

    /// Whether this reply reports success (code 0).
    pub const fn is_ok(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Render as one bracketed reply line. Replies fit the buffer by
    /// construction; should a render ever overflow it degrades to a
    /// bare transport error code.
    pub fn render(&self) -> heapless::String<MAX_REPLY_LEN> {
        let mut line = heapless::String::new();
        if write!(line, "{self}").is_err() {
            line.clear();
            let _ = write!(line, "[{ERR_TRANSPORT}]");
        }
        line
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "[0]"),
            Self::Values(values) => {
                write!(f, "[0")?;
                for value in values {
                    write!(f, ",{value}")?;
                }
                write!(f, "]")
            }
            Self::Info {
                name,
                version,
                stamp,
            } => write!(f, "[0,\"{name}\",\"{version}\",\"{stamp}\"]"),
            Self::Error { code, message } => write!(f, "[{code},\"{message}\"]"),
        }
    }
}

/// Routing result for one frame. Transport rejects carry enough detail
/// for the transport to phrase its own reply.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A handler ran and produced this reply.
    Replied(Reply),
    /// No handler registered for the opcode.
    UnknownOpcode(u8),
    /// Too few arguments for the registered handler.
    MissingArgs {
        /// Arguments the handler requires.
        expected: usize,
        /// Arguments the frame carried.
        got: usize,
    },
    /// The handler requires a string payload the frame did not carry.
    MissingString,
}

impl DispatchOutcome {
    /// Collapse into the reply the transport writes back. Routing
    /// failures become [`ERR_TRANSPORT`] replies here, keeping that
    /// code out of every handler.
    pub fn into_reply(self) -> Reply {
        match self {
            Self::Replied(reply) => reply,
            Self::UnknownOpcode(opcode) => Reply::error(
                ERR_TRANSPORT,
                &format!("Unknown command '{}'", char::from(opcode)),
            ),
            Self::MissingArgs { expected, got } => Reply::error(
                ERR_TRANSPORT,
                &format!("Expected {expected} arguments, got {got}"),
            ),
            Self::MissingString => Reply::error(ERR_TRANSPORT, "Expected string payload"),
        }
    }
}

/// A transport feeds command frames into the dispatcher and carries the
/// replies back. Exactly one transport is drained per control cycle.
pub trait Transport {
    /// Dispatch every frame that arrived since the last call, replying
    /// through the same channel. Returns the number of frames handled.
    fn dispatch_pending(&mut self, controller: &mut ActuatorController) -> usize;
}

/// The opcode table every transport routes through.
const BUILTIN_COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        opcode: b'?',
        min_args: 0,
        expects_string: false,
        handler: handlers::send_info,
    },
    CommandEntry {
        opcode: b'P',
        min_args: 0,
        expects_string: false,
        handler: handlers::send_position,
    },
    CommandEntry {
        opcode: b'C',
        min_args: 0,
        expects_string: false,
        handler: handlers::run_configure,
    },
    CommandEntry {
        opcode: b'K',
        min_args: 0,
        expects_string: false,
        handler: handlers::run_calibrate,
    },
    CommandEntry {
        opcode: b'E',
        min_args: 1,
        expects_string: false,
        handler: handlers::set_enabled,
    },
    CommandEntry {
        opcode: b'm',
        min_args: 2,
        expects_string: false,
        handler: handlers::queue_moveto,
    },
    // Velocity mode is registered but not supported by this firmware.
    CommandEntry {
        opcode: b'v',
        min_args: 2,
        expects_string: false,
        handler: handlers::queue_moveat,
    },
    CommandEntry {
        opcode: b'X',
        min_args: 0,
        expects_string: false,
        handler: handlers::run_stop,
    },
];

/// Registry of command handlers keyed by opcode.
pub struct CommandRegistry {
    entries: HashMap<u8, CommandEntry>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry with the full builtin opcode table.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for entry in BUILTIN_COMMANDS {
            registry.register(*entry);
        }
        registry
    }

    /// Register a command entry.
    ///
    /// # Panics
    ///
    /// Panics if the opcode is already registered.
    pub fn register(&mut self, entry: CommandEntry) {
        let opcode = entry.opcode;
        if self.entries.insert(opcode, entry).is_some() {
            panic!(
                "Command '{}' is already registered",
                char::from(opcode)
            );
        }
    }

    /// Look up the entry for an opcode.
    pub fn get(&self, opcode: u8) -> Option<&CommandEntry> {
        self.entries.get(&opcode)
    }

    /// List registered opcodes, sorted.
    pub fn list_opcodes(&self) -> Vec<u8> {
        let mut opcodes: Vec<u8> = self.entries.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }

    /// Route one decoded frame. Arity and string presence are validated
    /// here so handlers can take their inputs without checks. A string
    /// payload on a frame that does not need one is tolerated, like
    /// extra arguments.
    pub fn dispatch(
        &self,
        controller: &mut ActuatorController,
        opcode: u8,
        args: &[i16],
        text: Option<&str>,
    ) -> DispatchOutcome {
        let Some(entry) = self.get(opcode) else {
            trace!(opcode = %char::from(opcode), "unknown opcode");
            return DispatchOutcome::UnknownOpcode(opcode);
        };
        if args.len() < entry.min_args {
            return DispatchOutcome::MissingArgs {
                expected: entry.min_args,
                got: args.len(),
            };
        }
        if entry.expects_string && text.is_none() {
            return DispatchOutcome::MissingString;
        }
        trace!(opcode = %char::from(opcode), args = args.len(), "dispatching command");
        let request = Request { args, text };
        DispatchOutcome::Replied((entry.handler)(controller, &request))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
