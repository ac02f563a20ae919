//! Calendar, Julian date and sidereal time routines.
//!
//! Julian dates are carried as a split pair `(jd, fr)`: `jd` is the date at
//! the preceding midnight (always ending in .5) and `fr` the fraction of the
//! day. Keeping the two apart preserves sub-millisecond resolution that a
//! single f64 near 2.4e6 cannot hold.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::{Error, Result};

pub const TWOPI: f64 = 2.0 * std::f64::consts::PI;
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Julian date of 1950 January 0.0, the origin of SGP4's internal epoch.
pub const JD_1950: f64 = 2_433_281.5;

/// Julian date as `(midnight, fraction)` for a calendar instant.
///
/// ```text
/// jday(2020, 2, 11, 13, 57, 0.0) == (2458890.5, 0.58125)
/// ```
pub fn jday(year: i32, mon: i32, day: i32, hr: i32, minute: i32, sec: f64) -> (f64, f64) {
    let year_f = year as f64;
    let m = ((mon as f64 + 9.0) / 12.0).floor();
    let jd = 367.0 * year_f - (7.0 * (year_f + m) * 0.25).floor()
        + (275.0 * mon as f64 / 9.0).floor()
        + day as f64
        + 1_721_013.5;
    let fr = (sec + minute as f64 * 60.0 + hr as f64 * 3600.0) / 86400.0;
    (jd, fr)
}

/// Calendar date for a Julian date: `(year, month, day, hour, minute, second)`.
pub fn invjday(jd: f64, fr: f64) -> (i32, i32, i32, i32, i32, f64) {
    let mut jd = jd;
    let mut fr = fr;
    // normalise so that jd sits on a midnight
    let shift = (jd - 0.5).fract();
    jd -= shift;
    fr += shift;
    let whole = fr.floor();
    jd += whole;
    fr -= whole;

    let temp = jd - 2_415_019.5;
    let tu = temp / 365.25;
    let mut year = 1900 + tu.floor() as i32;
    let mut leapyrs = ((year - 1901) as f64 * 0.25).floor();
    let mut days = temp - ((year - 1900) as f64 * 365.0 + leapyrs);
    if days < 1.0 {
        year -= 1;
        leapyrs = ((year - 1901) as f64 * 0.25).floor();
        days = temp - ((year - 1900) as f64 * 365.0 + leapyrs);
    }

    let (mon, day, hr, minute, sec) = days2mdhms(year, days + fr, true);
    (year, mon, day, hr, minute, sec)
}

/// Split a fractional day of year (1.0 = Jan 1 00:00) into
/// `(month, day, hour, minute, second)`.
///
/// Seconds are rounded to the nearest microsecond when asked, which is the
/// resolution of a TLE epoch.
pub fn days2mdhms(year: i32, days: f64, round_to_microsecond: bool) -> (i32, i32, i32, i32, f64) {
    let mut second = days * 86400.0;
    if round_to_microsecond {
        second = (second * 1.0e6).round() / 1.0e6;
    }

    let minute_f = (second / 60.0).floor();
    second -= minute_f * 60.0;
    if round_to_microsecond {
        second = (second * 1.0e6).round() / 1.0e6;
    }

    let mut minute = minute_f as i32;
    let mut hour = minute / 60;
    minute %= 60;
    let day_of_year = hour / 24;
    hour %= 24;

    let (mut month, mut day) = day_of_year_to_month_day(day_of_year, is_leap_year(year));
    if month == 13 {
        month = 12;
        day += 31;
    }

    (month, day, hour, minute, second)
}

/// `(month, day)` for a 1-based day of year.
pub fn day_of_year_to_month_day(day_of_year: i32, is_leap: bool) -> (i32, i32) {
    let leap = i32::from(is_leap);
    let february_bump = (2 - leap) * i32::from(day_of_year >= 60 + leap);
    let august = i32::from(day_of_year >= 215);

    let num = 2 * (day_of_year - 1 + 30 * august + february_bump);
    let month = num / 61 + 1 - august;
    let day = (num % 61) / 2 + 1;
    (month, day)
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 4 == 0 && year % 100 != 0)
}

/// Four-digit year for a two-digit TLE year (1957..=2056).
pub fn tle_year(two_digit: i32) -> i32 {
    if two_digit < 57 {
        two_digit + 2000
    } else {
        two_digit + 1900
    }
}

/// Greenwich mean sidereal time (IAU-82) in radians for a UT1 Julian date.
pub fn gstime(jdut1: f64) -> f64 {
    let tut1 = (jdut1 - 2_451_545.0) / 36_525.0;
    let temp = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093_104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * tut1
        + 67_310.548_41;
    // seconds of time -> degrees -> radians
    let mut temp = (temp * DEG2RAD / 240.0) % TWOPI;
    if temp < 0.0 {
        temp += TWOPI;
    }
    temp
}

/// Sidereal time the legacy AFSPC way, referenced to 1970 January 0.0.
///
/// `epoch` is days since 1950 January 0.0.
pub fn gstime_afspc(epoch: f64) -> f64 {
    let ts70 = epoch - 7305.0;
    let ds70 = (ts70 + 1.0e-8).floor();
    let tfrac = ts70 - ds70;
    let c1 = 1.720_279_169_407_036_39e-2;
    let thgr70 = 1.732_134_385_650_937_4;
    let fk5r = 5.075_514_194_322_694_42e-15;
    let c1p2p = c1 + TWOPI;
    let mut gsto = (thgr70 + c1 * ds70 + c1p2p * tfrac + ts70 * ts70 * fk5r) % TWOPI;
    if gsto < 0.0 {
        gsto += TWOPI;
    }
    gsto
}

/// Split Julian date of a UTC instant.
pub fn julian_from_datetime(t: &DateTime<Utc>) -> (f64, f64) {
    let sec = t.second() as f64 + t.nanosecond() as f64 * 1.0e-9;
    jday(
        t.year(),
        t.month() as i32,
        t.day() as i32,
        t.hour() as i32,
        t.minute() as i32,
        sec,
    )
}

/// UTC instant for a TLE epoch given as year and fractional day of year.
pub fn datetime_from_year_day(year: i32, day_of_year: f64) -> Result<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidTimestamp(format!("year {year}")))?;
    let micros = ((day_of_year - 1.0) * 86_400.0e6).round() as i64;
    Ok(start + Duration::microseconds(micros))
}

/// UTC instant from broken-down calendar fields; seconds may carry a fraction.
pub fn datetime_from_fields(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
) -> Result<DateTime<Utc>> {
    let invalid = || {
        Error::InvalidTimestamp(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second}"
        ))
    };
    if !second.is_finite() || !(0.0..61.0).contains(&second) {
        return Err(invalid());
    }
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)?;
    let nanos = (second * 1.0e9).round() as i64;
    Ok((naive + Duration::nanoseconds(nanos)).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        let diff = (a - b).abs();
        assert!(diff <= tol, "expected {b:.15e}, got {a:.15e}, diff={diff:.3e}");
    }

    #[test]
    fn jday_matches_vallado_example() {
        let (jd, fr) = jday(2020, 2, 11, 13, 57, 0.0);
        approx_eq(jd, 2_458_890.5, 1.0e-9);
        approx_eq(fr, 0.58125, 1.0e-12);

        let (jd, fr) = jday(2019, 10, 9, 16, 57, 15.0);
        approx_eq(jd, 2_458_765.5, 1.0e-9);
        approx_eq(fr, 0.706_423_611_111_111_1, 1.0e-12);
    }

    #[test]
    fn invjday_recovers_calendar_fields() {
        let (jd, fr) = jday(2020, 2, 29, 23, 59, 30.5);
        let (year, mon, day, hr, min, sec) = invjday(jd, fr);
        assert_eq!((year, mon, day, hr, min), (2020, 2, 29, 23, 59));
        approx_eq(sec, 30.5, 1.0e-5);
    }

    #[test]
    fn days2mdhms_handles_leap_years() {
        assert_eq!(days2mdhms(2000, 1.0, true).0, 1);
        let (m, d, h, min, s) = days2mdhms(2020, 133.35625, true);
        assert_eq!((m, d, h, min), (5, 12, 8, 33));
        approx_eq(s, 0.0, 1.0e-9);
        let (m, d, ..) = days2mdhms(2000, 366.0, true);
        assert_eq!((m, d), (12, 31));
        assert_eq!(days2mdhms(2001, 60.0, true).0, 3);
        assert_eq!(days2mdhms(2000, 60.0, true).0, 2);
    }

    #[test]
    fn every_day_of_year_maps_to_its_month() {
        let lengths = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for leap in [false, true] {
            let mut doy = 1;
            for (month, &len) in lengths.iter().enumerate() {
                let len = if leap && month == 1 { 29 } else { len };
                for day in 1..=len {
                    assert_eq!(
                        day_of_year_to_month_day(doy, leap),
                        (month as i32 + 1, day),
                        "doy {doy} leap {leap}"
                    );
                    doy += 1;
                }
            }
        }
    }

    #[test]
    fn two_digit_years_pivot_at_57() {
        assert_eq!(tle_year(0), 2000);
        assert_eq!(tle_year(56), 2056);
        assert_eq!(tle_year(57), 1957);
        assert_eq!(tle_year(99), 1999);
    }

    #[test]
    fn gstime_at_j2000() {
        // GMST at 2000-01-01 12:00 UT1 is 280.46061837 degrees
        approx_eq(gstime(2_451_545.0), 280.460_618_37 * DEG2RAD, 1.0e-9);
    }

    #[test]
    fn afspc_sidereal_time_tracks_iau_82() {
        // 2000-06-27 18:50:19.733 UTC, epoch of catalog object 00005
        let epoch = 2_451_722.5 + 0.784_950_62 - JD_1950;
        approx_eq(gstime_afspc(epoch), gstime(epoch + JD_1950), 1.0e-6);
    }

    #[test]
    fn tle_epoch_to_chrono() {
        let t = datetime_from_year_day(2000, 179.784_950_62).unwrap();
        assert_eq!(t.to_string(), "2000-06-27 18:50:19.733568");
    }

    #[test]
    fn calendar_fields_validate() {
        let t = datetime_from_fields(2024, 2, 29, 12, 30, 15.25).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-02-29T12:30:15.250+00:00");
        assert!(datetime_from_fields(2023, 2, 29, 0, 0, 0.0).is_err());
        assert!(datetime_from_fields(2023, 1, 1, 0, 0, f64::NAN).is_err());
    }
}
