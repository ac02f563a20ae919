//! Two-line element set parsing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alpha5::from_alpha5;
use crate::datetime::{tle_year, DEG2RAD};
use crate::elements::OrbitalElementSet;
use crate::error::{Error, Result, TleError};

const LINE1_FMT: &str = "1 NNNNNC NNNNNAAA NNNNN.NNNNNNNN +.NNNNNNNN +NNNNN-N +NNNNN-N N NNNNN";
const LINE2_FMT: &str = "2 NNNNN NNN.NNNN NNN.NNNN NNNNNNN NNN.NNNN NNN.NNNN NN.NNNNNNNNNNNNNN";

/// Columns in a TLE data line, checksum included.
pub const LINE_LENGTH: usize = 69;

/// A parsed TLE: the raw lines and the element set they describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tle {
    pub line1: String,
    pub line2: String,
    pub elements: OrbitalElementSet,
}

impl Tle {
    pub fn parse(line1: &str, line2: &str) -> Result<Tle> {
        Self::parse_with_name(None, line1, line2)
    }

    /// Parse with an optional title line. A leading `0 ` on the title, as
    /// some catalogs write it, is dropped.
    pub fn parse_with_name(name: Option<&str>, line1: &str, line2: &str) -> Result<Tle> {
        let line1 = line1.trim_end_matches(&['\r', '\n'][..]);
        let line2 = line2.trim_end_matches(&['\r', '\n'][..]);
        let mut elements = parse_elements(line1, line2)?;
        elements.name = name
            .map(|n| n.trim())
            .map(|n| n.strip_prefix("0 ").unwrap_or(n).trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Tle {
            line1: line1.to_string(),
            line2: line2.to_string(),
            elements,
        })
    }

    /// Parse two or three non-blank lines of text.
    pub fn parse_lines(text: &str) -> Result<Tle> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        match lines.as_slice() {
            [line1, line2] => Self::parse(line1, line2),
            [name, line1, line2] => Self::parse_with_name(Some(name), line1, line2),
            other => Err(TleError::LineCount(other.len()).into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.elements.name.as_deref()
    }
}

impl FromStr for Tle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Tle> {
        Tle::parse_lines(s)
    }
}

/// Element set from two TLE lines.
pub fn parse(line1: &str, line2: &str) -> Result<OrbitalElementSet> {
    Ok(Tle::parse(line1, line2)?.elements)
}

fn layout_error(line: u8, given: &str) -> TleError {
    let fmt = if line == 1 { LINE1_FMT } else { LINE2_FMT };
    TleError::Layout {
        line,
        given: format!("{fmt}\n{given}"),
    }
}

fn has_bytes(line: &str, expected: &[(usize, u8)]) -> bool {
    let bytes = line.as_bytes();
    expected.iter().all(|&(i, b)| bytes.get(i) == Some(&b))
}

fn field<T: FromStr>(line: &str, range: std::ops::Range<usize>, name: &'static str) -> std::result::Result<T, TleError> {
    let text = &line[range];
    text.trim().parse().map_err(|_| TleError::Field {
        field: name,
        text: text.to_string(),
    })
}

/// Integer field that may be left blank.
fn optional_u32(line: &str, range: std::ops::Range<usize>, name: &'static str) -> std::result::Result<u32, TleError> {
    if line[range.clone()].trim().is_empty() {
        Ok(0)
    } else {
        field(line, range, name)
    }
}

/// Decode an eight-column "implied decimal" field such as ` 28098-4`
/// (0.28098e-4) or `-11606-4`.
fn implied_decimal(text: &str, name: &'static str) -> std::result::Result<f64, TleError> {
    let bad = || TleError::Field {
        field: name,
        text: text.to_string(),
    };
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    if text.len() != 8 {
        return Err(bad());
    }
    let sign = match &text[0..1] {
        "-" => -1.0,
        " " | "+" => 1.0,
        _ => return Err(bad()),
    };
    let digits = text[1..6].replace(' ', "0");
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let mantissa: f64 = format!("0.{digits}").parse().map_err(|_| bad())?;
    let exponent: i32 = text[6..8].trim().parse().map_err(|_| bad())?;
    Ok(sign * mantissa * 10f64.powi(exponent))
}

fn parse_elements(line1: &str, line2: &str) -> std::result::Result<OrbitalElementSet, TleError> {
    if !line1.is_ascii() || !line2.is_ascii() {
        return Err(TleError::NonAscii);
    }
    for (n, line) in [(1, line1), (2, line2)] {
        if line.len() < LINE_LENGTH {
            return Err(TleError::TooShort {
                line: n,
                expected: LINE_LENGTH,
                got: line.len(),
            });
        }
    }

    if !(line1.starts_with("1 ")
        && has_bytes(
            line1,
            &[(8, b' '), (23, b'.'), (32, b' '), (34, b'.'), (43, b' '), (52, b' '), (61, b' '), (63, b' ')],
        ))
    {
        return Err(layout_error(1, line1));
    }
    if !(line2.starts_with("2 ")
        && has_bytes(
            line2,
            &[(7, b' '), (11, b'.'), (16, b' '), (20, b'.'), (25, b' '), (33, b' '), (37, b'.'), (42, b' '), (46, b'.'), (51, b' ')],
        ))
    {
        return Err(layout_error(2, line2));
    }

    verify_checksum(line1, 1)?;
    verify_checksum(line2, 2)?;

    let sat1 = line1[2..7].trim();
    let sat2 = line2[2..7].trim();
    if sat1 != sat2 {
        return Err(TleError::CatalogMismatch(sat1.to_string(), sat2.to_string()));
    }
    let catalog_number = from_alpha5(sat1)?;

    let two_digit_year: i32 = field(line1, 18..20, "epoch year")?;
    let epoch_day: f64 = field(line1, 20..32, "epoch day")?;
    let ephemeris_type = match line1.as_bytes()[62] {
        b' ' => 0,
        b @ b'0'..=b'9' => b - b'0',
        _ => {
            return Err(TleError::Field {
                field: "ephemeris type",
                text: line1[62..63].to_string(),
            })
        }
    };

    let eccentricity_digits = line2[26..33].replace(' ', "0");
    let eccentricity: f64 =
        format!("0.{eccentricity_digits}")
            .parse()
            .map_err(|_| TleError::Field {
                field: "eccentricity",
                text: line2[26..33].to_string(),
            })?;

    let inclination: f64 = field(line2, 8..16, "inclination")?;
    let right_ascension: f64 = field(line2, 17..25, "right ascension")?;
    let argument_of_perigee: f64 = field(line2, 34..42, "argument of perigee")?;
    let mean_anomaly: f64 = field(line2, 43..51, "mean anomaly")?;

    Ok(OrbitalElementSet {
        name: None,
        catalog_number,
        classification: line1.as_bytes()[7] as char,
        international_designator: line1[9..17].trim().to_string(),
        epoch_year: tle_year(two_digit_year),
        epoch_day,
        mean_motion_dot: field(line1, 33..43, "mean motion dot")?,
        mean_motion_ddot: implied_decimal(&line1[44..52], "mean motion ddot")?,
        bstar: implied_decimal(&line1[53..61], "bstar")?,
        ephemeris_type,
        element_set_number: optional_u32(line1, 64..68, "element set number")?,
        inclination: inclination * DEG2RAD,
        right_ascension: right_ascension * DEG2RAD,
        eccentricity,
        argument_of_perigee: argument_of_perigee * DEG2RAD,
        mean_anomaly: mean_anomaly * DEG2RAD,
        mean_motion: field(line2, 52..63, "mean motion")?,
        revolution_number: optional_u32(line2, 63..68, "revolution number")?,
    })
}

/// Checksum of the first 68 columns: digits count their value, minus signs
/// count one, modulo 10.
pub fn compute_checksum(line: &str) -> u32 {
    line.chars()
        .take(68)
        .map(|c| match c {
            '0'..='9' => c as u32 - '0' as u32,
            '-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// The line padded or cut to 68 columns with the correct checksum appended.
pub fn fix_checksum(line: &str) -> String {
    let body: String = line.chars().take(68).collect();
    let body = format!("{body:<68}");
    let checksum = compute_checksum(&body);
    format!("{body}{checksum}")
}

/// Check column 69 of one line against its computed checksum.
pub fn verify_checksum(line: &str, line_number: u8) -> std::result::Result<(), TleError> {
    let given = line
        .chars()
        .nth(68)
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| TleError::Field {
            field: "checksum",
            text: line.chars().skip(68).collect(),
        })?;
    let computed = compute_checksum(line);
    if given != computed {
        return Err(TleError::Checksum {
            line: line_number,
            given,
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE1: &str = "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753";
    const LINE2: &str = "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667";
    const BAD2: &str = "2 00007  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413669";

    fn approx(expected: f64, got: f64, tol: f64) {
        let diff = (expected - got).abs();
        assert!(diff <= tol, "expected {expected}, got {got} (|Δ| = {diff})");
    }

    #[test]
    fn parses_vanguard() {
        let tle = Tle::parse(LINE1, LINE2).unwrap();
        let e = &tle.elements;
        assert_eq!(e.catalog_number, 5);
        assert_eq!(e.classification, 'U');
        assert_eq!(e.international_designator, "58002B");
        assert_eq!(e.epoch_year, 2000);
        approx(179.784_950_62, e.epoch_day, 1e-12);
        approx(2.3e-7, e.mean_motion_dot, 1e-15);
        assert_eq!(e.mean_motion_ddot, 0.0);
        approx(2.8098e-5, e.bstar, 1e-15);
        assert_eq!(e.ephemeris_type, 0);
        assert_eq!(e.element_set_number, 475);
        approx(34.2682_f64.to_radians(), e.inclination, 1e-12);
        approx(348.7242_f64.to_radians(), e.right_ascension, 1e-12);
        approx(0.185_966_7, e.eccentricity, 1e-12);
        approx(331.7664_f64.to_radians(), e.argument_of_perigee, 1e-12);
        approx(19.3264_f64.to_radians(), e.mean_anomaly, 1e-12);
        approx(10.824_191_57, e.mean_motion, 1e-12);
        assert_eq!(e.revolution_number, 41366);
        assert_eq!(tle.name(), None);
    }

    #[test]
    fn implied_decimal_fields() {
        approx(0.28098e-4, implied_decimal(" 28098-4", "bstar").unwrap(), 1e-18);
        approx(-0.11606e-4, implied_decimal("-11606-4", "bstar").unwrap(), 1e-18);
        approx(0.30362e-3, implied_decimal(" 30362-3", "bstar").unwrap(), 1e-18);
        assert_eq!(implied_decimal(" 00000+0", "bstar").unwrap(), 0.0);
        assert_eq!(implied_decimal("        ", "bstar").unwrap(), 0.0);
        assert!(implied_decimal(" 2x098-4", "bstar").is_err());
    }

    #[test]
    fn three_line_format_keeps_the_name() {
        let text = format!("0 VANGUARD 1\n{LINE1}\n{LINE2}\n");
        let tle: Tle = text.parse().unwrap();
        assert_eq!(tle.name(), Some("VANGUARD 1"));
        assert_eq!(tle.elements.catalog_number, 5);

        let text = format!("{LINE1}\r\n{LINE2}\r\n");
        assert_eq!(Tle::parse_lines(&text).unwrap().name(), None);

        assert!(matches!(
            Tle::parse_lines(LINE1),
            Err(Error::MalformedElementSet(TleError::LineCount(1)))
        ));
    }

    #[test]
    fn alpha5_catalog_numbers() {
        let line1 = "1 B1234U 24001A   24001.50000000  .00000000  00000-0  00000-0 0  9999";
        let line2 = "2 B1234  98.0000 100.0000 0010000  90.0000 270.0000 14.20000000    17";
        let e = parse(line1, line2).unwrap();
        assert_eq!(e.catalog_number, 111_234);
        assert_eq!(e.revolution_number, 1);
    }

    #[test]
    fn checksum_helpers() {
        for line in [LINE1, LINE2] {
            let given = line.chars().last().unwrap().to_digit(10).unwrap();
            assert_eq!(compute_checksum(line), given);
            assert_eq!(fix_checksum(&line[..68]), line);
        }
        let broken = format!("{}9", &LINE1[..68]);
        assert_eq!(
            verify_checksum(&broken, 1),
            Err(TleError::Checksum { line: 1, given: 9, computed: 3 })
        );
        assert!(verify_checksum(&fix_checksum(&broken), 1).is_ok());
    }

    #[test]
    fn corrupted_lines_are_rejected() {
        assert!(matches!(
            Tle::parse(LINE1, BAD2),
            Err(Error::MalformedElementSet(TleError::CatalogMismatch(..)))
        ));

        let corrupted = LINE1.replace(".00000023", ".90000023");
        assert!(matches!(
            Tle::parse(&corrupted, LINE2),
            Err(Error::MalformedElementSet(TleError::Checksum { line: 1, .. }))
        ));

        let nbsp = LINE2.replace(" 34", "\u{a0}34");
        assert!(matches!(
            Tle::parse(LINE1, &nbsp),
            Err(Error::MalformedElementSet(TleError::NonAscii))
        ));

        assert!(matches!(
            Tle::parse(&LINE1[..60], LINE2),
            Err(Error::MalformedElementSet(TleError::TooShort { line: 1, .. }))
        ));

        let shifted = fix_checksum(&LINE1[..68].replacen("B   0", "B  0", 1));
        assert!(matches!(
            Tle::parse(&shifted, LINE2),
            Err(Error::MalformedElementSet(TleError::Layout { line: 1, .. }))
        ));
    }
}
