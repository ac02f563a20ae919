//! C ABI entry points. Each call parses, propagates and returns; nothing is
//! kept between calls.
//!
//! Status codes are `0` for success, [`Error::code`] for library failures and
//! [`STATUS_NULL_POINTER`] when a required pointer is null.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Once;

use log::{debug, error, warn};

use crate::datetime::datetime_from_fields;
use crate::error::{Error, Result};
use crate::propagator::Propagator;
use crate::state::StateVector;
use crate::tle::Tle;

pub const STATUS_OK: i32 = 0;
pub const STATUS_NULL_POINTER: i32 = -8;

static INIT_LOGGER: Once = Once::new();

fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("warn");
        let _ = env_logger::Builder::from_env(env).try_init();
    });
}

/// Broken-down UTC request as it crosses the boundary.
#[derive(Debug, Clone, Copy)]
struct Timestamp {
    year: f64,
    month: i32,
    day: i32,
    hour: i32,
    min: i32,
    sec: f64,
}

fn calendar_field(value: i32, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidTimestamp(format!("{what} {value}")))
}

/// The year crosses the boundary as a double; only whole years are dates.
fn calendar_year(year: f64) -> Result<i32> {
    if !year.is_finite() || year.fract() != 0.0 || year.abs() > f64::from(i32::MAX) {
        return Err(Error::InvalidTimestamp(format!("year {year}")));
    }
    Ok(year as i32)
}

fn state_at(line1: &str, line2: &str, when: Timestamp) -> Result<StateVector> {
    let tle = Tle::parse(line1, line2)?;
    let when = datetime_from_fields(
        calendar_year(when.year)?,
        calendar_field(when.month, "month")?,
        calendar_field(when.day, "day")?,
        calendar_field(when.hour, "hour")?,
        calendar_field(when.min, "minute")?,
        when.sec,
    )?;
    let propagator = Propagator::new(&tle.elements)?;
    let minutes = propagator.minutes_since_epoch(&when);
    debug!(
        "propagating {:05} to {} ({:.6} min since epoch)",
        tle.elements.catalog_number, when, minutes
    );
    propagator.propagate(minutes)
}

/// Reads both lines and runs the propagation.
///
/// # Safety
/// `line1` and `line2` must be null or point to NUL-terminated strings that
/// stay valid for the duration of the call.
unsafe fn run(
    line1: *const c_char,
    line2: *const c_char,
    when: Timestamp,
) -> std::result::Result<StateVector, i32> {
    if line1.is_null() || line2.is_null() {
        error!("propagate_satellite: null TLE line pointer");
        return Err(STATUS_NULL_POINTER);
    }
    let line1 = CStr::from_ptr(line1).to_string_lossy();
    let line2 = CStr::from_ptr(line2).to_string_lossy();

    state_at(&line1, &line2, when).map_err(|e| {
        match e {
            Error::MalformedElementSet(_) | Error::InvalidOrbit(_) | Error::InvalidTimestamp(_) => {
                error!("propagate_satellite: {e}")
            }
            _ => warn!("propagate_satellite: {e}"),
        }
        e.code()
    })
}

/// Position (TEME, km) of the satellite described by `line1`/`line2` at the
/// given UTC instant, written to `xyz_out[0..3]`.
///
/// # Safety
/// `line1` and `line2` must be null or valid NUL-terminated strings.
/// `xyz_out` must be null or point to at least three writable doubles.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn propagate_satellite(
    line1: *const c_char,
    line2: *const c_char,
    year: f64,
    month: i32,
    day: i32,
    hour: i32,
    min: i32,
    sec: f64,
    xyz_out: *mut f64,
) -> i32 {
    init_logger();
    if xyz_out.is_null() {
        error!("propagate_satellite: null output buffer");
        return STATUS_NULL_POINTER;
    }
    let when = Timestamp { year, month, day, hour, min, sec };
    match run(line1, line2, when) {
        Ok(state) => {
            let out = std::slice::from_raw_parts_mut(xyz_out, 3);
            out.copy_from_slice(&state.position);
            STATUS_OK
        }
        Err(code) => code,
    }
}

/// Like [`propagate_satellite`], also writing velocity (km/s) to
/// `vel_out[0..3]`.
///
/// # Safety
/// Same as [`propagate_satellite`]; `pos_out` and `vel_out` must each point
/// to three writable doubles and must not overlap.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn propagate_satellite_state(
    line1: *const c_char,
    line2: *const c_char,
    year: f64,
    month: i32,
    day: i32,
    hour: i32,
    min: i32,
    sec: f64,
    pos_out: *mut f64,
    vel_out: *mut f64,
) -> i32 {
    init_logger();
    if pos_out.is_null() || vel_out.is_null() {
        error!("propagate_satellite_state: null output buffer");
        return STATUS_NULL_POINTER;
    }
    let when = Timestamp { year, month, day, hour, min, sec };
    match run(line1, line2, when) {
        Ok(state) => {
            std::slice::from_raw_parts_mut(pos_out, 3).copy_from_slice(&state.position);
            std::slice::from_raw_parts_mut(vel_out, 3).copy_from_slice(&state.velocity);
            STATUS_OK
        }
        Err(code) => code,
    }
}
