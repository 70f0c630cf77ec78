//! Line-oriented console transport.
//!
//! A background thread reads stdin line by line and hands complete
//! lines to the cycle thread over a channel, so the control loop never
//! blocks on input. One line is one command frame: a single-letter
//! opcode followed by whitespace-separated signed 16-bit arguments and
//! an optional trailing quoted string, e.g. `m -1 -200`.
//!
//! Replies go to stdout, one bracketed line per frame. Frames that
//! cannot be parsed or routed are answered with [`ERR_TRANSPORT`]
//! replies. EOF just ends the command stream; the cycle loop keeps
//! running until a signal stops it.

use crate::command::{CommandRegistry, Reply, Transport};
use crate::controller::ActuatorController;
use romi_common::consts::{ERR_TRANSPORT, MAX_COMMAND_ARGS};
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use thiserror::Error;
use tracing::{debug, warn};

/// Frame-level parse failures. Rendered into the transport reject
/// reply, so the messages are wire text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Line with no opcode.
    #[error("Empty frame")]
    Empty,

    /// Opcode outside the printable ASCII range.
    #[error("Unprintable opcode")]
    BadOpcode,

    /// Argument token that is not a signed 16-bit integer.
    #[error("Bad argument '{0}'")]
    BadArgument(String),

    /// More arguments than a frame may carry.
    #[error("Too many arguments")]
    TooManyArgs,

    /// String payload opened but never closed.
    #[error("Unterminated string")]
    UnterminatedString,
}

/// One decoded console line. Borrows the string payload from the line
/// it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFrame<'a> {
    /// Single-letter opcode.
    pub opcode: u8,
    /// Signed 16-bit arguments in wire order.
    pub args: heapless::Vec<i16, MAX_COMMAND_ARGS>,
    /// Quoted string payload, quotes stripped.
    pub text: Option<&'a str>,
}

/// Decode one console line into a command frame.
pub fn parse_line(line: &str) -> Result<CommandFrame<'_>, ParseError> {
    let (head, text) = split_text_payload(line)?;
    let mut tokens = head.split_whitespace();
    let opcode_token = tokens.next().ok_or(ParseError::Empty)?;

    let mut chars = opcode_token.chars();
    let opcode = match chars.next() {
        Some(c) if c.is_ascii_graphic() => c as u8,
        _ => return Err(ParseError::BadOpcode),
    };
    // An opcode is exactly one letter; a longer first token is garbage.
    if chars.next().is_some() {
        return Err(ParseError::BadArgument(opcode_token.to_string()));
    }

    let mut args = heapless::Vec::new();
    for token in tokens {
        let value: i16 = token
            .parse()
            .map_err(|_| ParseError::BadArgument(token.to_string()))?;
        if args.push(value).is_err() {
            return Err(ParseError::TooManyArgs);
        }
    }

    Ok(CommandFrame { opcode, args, text })
}

/// Split a trailing quoted payload off a console line. The first `"`
/// opens the payload, the last one closes it; everything between is
/// taken verbatim and anything after the closing quote is rejected.
fn split_text_payload(line: &str) -> Result<(&str, Option<&str>), ParseError> {
    match line.find('"') {
        None => Ok((line, None)),
        Some(start) => {
            let body = &line[start + 1..];
            let end = body.rfind('"').ok_or(ParseError::UnterminatedString)?;
            let trailing = body[end + 1..].trim();
            if !trailing.is_empty() {
                return Err(ParseError::BadArgument(trailing.to_string()));
            }
            Ok((&line[..start], Some(&body[..end])))
        }
    }
}

/// Console transport: stdin reader thread plus the opcode registry.
pub struct ConsoleTransport {
    registry: CommandRegistry,
    lines: Receiver<String>,
}

impl ConsoleTransport {
    /// Spawn the stdin reader thread and connect it to this transport.
    pub fn start(registry: CommandRegistry) -> io::Result<Self> {
        let (tx, lines) = mpsc::channel();
        thread::Builder::new()
            .name("console-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    match line {
                        // Send fails only when the cycle loop is gone.
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(%err, "console read failed");
                            break;
                        }
                    }
                }
                debug!("console input closed");
            })?;
        Ok(Self { registry, lines })
    }
}

impl Transport for ConsoleTransport {
    fn dispatch_pending(&mut self, controller: &mut ActuatorController) -> usize {
        let mut handled = 0;
        while let Ok(line) = self.lines.try_recv() {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match parse_line(&line) {
                Ok(frame) => self
                    .registry
                    .dispatch(controller, frame.opcode, &frame.args, frame.text)
                    .into_reply(),
                Err(err) => {
                    debug!(%err, line, "rejected frame");
                    Reply::error(ERR_TRANSPORT, &err.to_string())
                }
            };
            println!("{}", reply.render());
            handled += 1;
        }
        handled
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
