//! One handler per registered opcode.
//!
//! Handlers translate between the wire protocol and controller
//! operations: decode arguments, invoke the operation, phrase the
//! reply. No lifecycle rules live here; the controller enforces them
//! and handlers only report the outcome.

use crate::command::{Reply, Request};
use crate::controller::{ActuatorController, ControlError};
use romi_common::angle::{WireAngle, milliradians};
use romi_common::consts::{BUILD_STAMP, FIRMWARE_NAME, FIRMWARE_VERSION};

/// `?` — report firmware identity.
pub fn send_info(_controller: &mut ActuatorController, _request: &Request) -> Reply {
    Reply::Info {
        name: FIRMWARE_NAME,
        version: FIRMWARE_VERSION,
        stamp: BUILD_STAMP,
    }
}

/// `P` — report the cached position sample as whole milliradians plus
/// its capture timestamp. Never blocks on the sensor.
pub fn send_position(controller: &mut ActuatorController, _request: &Request) -> Reply {
    let sample = controller.get_position();
    Reply::values(&[
        i64::from(milliradians(sample.radians)),
        i64::from(sample.timestamp),
    ])
}

/// `C` — apply tuning constants to the drive.
pub fn run_configure(controller: &mut ActuatorController, _request: &Request) -> Reply {
    match controller.configure() {
        Ok(()) => Reply::Ok,
        Err(err) => Reply::failure(&err),
    }
}

/// `K` — run origin alignment.
pub fn run_calibrate(controller: &mut ActuatorController, _request: &Request) -> Reply {
    match controller.calibrate() {
        Ok(()) => Reply::Ok,
        Err(err) => Reply::failure(&err),
    }
}

/// `E` — arg 0 disables the power stage, anything else enables it.
pub fn set_enabled(controller: &mut ActuatorController, request: &Request) -> Reply {
    let result = if request.args[0] == 0 {
        controller.disable()
    } else {
        controller.enable()
    };
    match result {
        Ok(()) => Reply::Ok,
        Err(err) => Reply::failure(&err),
    }
}

/// `m` — queue an absolute position target from a whole/thousandths
/// radian pair. Accepted in any state.
pub fn queue_moveto(controller: &mut ActuatorController, request: &Request) -> Reply {
    let wire = WireAngle::from_args(request.args[0], request.args[1]);
    controller.moveto(wire.decode());
    Reply::Ok
}

/// `v` — velocity mode, registered but unsupported.
pub fn queue_moveat(_controller: &mut ActuatorController, _request: &Request) -> Reply {
    Reply::failure(&ControlError::NotImplemented)
}

/// `X` — halt by holding the last sampled position.
pub fn run_stop(controller: &mut ActuatorController, _request: &Request) -> Reply {
    controller.stop();
    Reply::Ok
}

// ─── Tests ──────────────────────────────────────────────────────────
