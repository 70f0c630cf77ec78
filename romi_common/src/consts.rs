//! System-wide constants for the Romi actuator workspace.
//!
//! Single source of truth for identity strings, wire error codes and
//! buffer limits. Imported by all crates — no duplication permitted.

/// Firmware identity reported by the `?` command.
pub const FIRMWARE_NAME: &str = "RomiBLDCController";

/// Firmware version reported by the `?` command.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build stamp reported by the `?` command. Overridden by setting the
/// `BUILD_STAMP` environment variable at compile time.
pub const BUILD_STAMP: &str = match option_env!("BUILD_STAMP") {
    Some(stamp) => stamp,
    None => "dev",
};

/// Wire error code: command valid but actuator not in a permitting state.
pub const ERR_BAD_STATE: u8 = 1;

/// Wire error code: command recognized but not supported by this firmware.
pub const ERR_NOT_IMPLEMENTED: u8 = 2;

/// Wire error code: numeric argument outside the encodable range.
pub const ERR_OUT_OF_RANGE: u8 = 3;

/// Wire error code: drive adapter fault surfaced on the command path.
pub const ERR_DRIVE: u8 = 4;

/// Wire error code reserved for transport-level rejects (unknown opcode,
/// too few arguments). Never emitted by command handlers.
pub const ERR_TRANSPORT: u8 = 255;

/// Maximum number of numeric arguments a command frame may carry.
pub const MAX_COMMAND_ARGS: usize = 8;

/// Maximum rendered reply length in bytes, matching the fixed reply
/// buffer of the wire protocol.
pub const MAX_REPLY_LEN: usize = 96;

/// Maximum error message length in bytes. Longer messages are truncated
/// so an error reply always fits the reply buffer.
pub const MAX_ERROR_LEN: usize = 64;

/// Default control cycle time in microseconds (1 kHz = 1000 µs).
pub const CYCLE_TIME_US: u32 = 1000;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/controller.toml";
