//! Alpha-5 catalog numbers.
//!
//! Five TLE columns hold the catalog number. Numbers above 99999 replace the
//! leading digit with a letter (A=10 .. Z=33, skipping I and O), so the
//! largest encodable number is 339999 ("Z9999").

use thiserror::Error;

/// Largest number that fits the five catalog columns.
pub const MAX_CATALOG_NUMBER: u32 = 339_999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Alpha5Error {
    #[error("catalog number {0} exceeds 339999, whose Alpha-5 encoding is 'Z9999'")]
    TooLarge(u32),

    #[error("catalog number field is empty")]
    Empty,

    #[error("catalog number field {0:?} is not Alpha-5")]
    Malformed(String),
}

/// Encode a catalog number into the five TLE columns.
pub fn to_alpha5(n: u32) -> Result<String, Alpha5Error> {
    if n < 100_000 {
        return Ok(format!("{n:05}"));
    }
    if n > MAX_CATALOG_NUMBER {
        return Err(Alpha5Error::TooLarge(n));
    }

    let mut code = (n / 10_000) as u8 + b'A' - 10;
    if code >= b'I' {
        code += 1;
    }
    if code >= b'O' {
        code += 1;
    }
    Ok(format!("{}{:04}", code as char, n % 10_000))
}

/// Decode the catalog columns of a TLE line.
///
/// Blank padding is tolerated on the left ("  123" is 123).
pub fn from_alpha5(field: &str) -> Result<u32, Alpha5Error> {
    let s = field.trim();
    let first = s.chars().next().ok_or(Alpha5Error::Empty)?;
    let malformed = || Alpha5Error::Malformed(field.to_string());

    if !first.is_ascii_alphabetic() {
        return s.parse::<u32>().map_err(|_| malformed());
    }

    let letter = first.to_ascii_uppercase();
    if letter == 'I' || letter == 'O' || s.len() != 5 {
        return Err(malformed());
    }
    let mut prefix = (letter as u8 - b'A') as u32 + 10;
    if letter > 'I' {
        prefix -= 1;
    }
    if letter > 'O' {
        prefix -= 1;
    }
    let rest: u32 = s[1..].parse().map_err(|_| malformed())?;
    Ok(prefix * 10_000 + rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_are_zero_padded() {
        assert_eq!(to_alpha5(5).unwrap(), "00005");
        assert_eq!(to_alpha5(99_999).unwrap(), "99999");
        assert_eq!(from_alpha5("00005").unwrap(), 5);
        assert_eq!(from_alpha5("   42").unwrap(), 42);
    }

    #[test]
    fn letters_skip_i_and_o() {
        assert_eq!(to_alpha5(100_000).unwrap(), "A0000");
        assert_eq!(to_alpha5(180_000).unwrap(), "J0000");
        assert_eq!(to_alpha5(230_000).unwrap(), "P0000");
        assert_eq!(to_alpha5(339_999).unwrap(), "Z9999");
        assert_eq!(from_alpha5("J0000").unwrap(), 180_000);
        assert_eq!(from_alpha5("P0000").unwrap(), 230_000);
        assert_eq!(from_alpha5("Z9999").unwrap(), 339_999);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(to_alpha5(340_000), Err(Alpha5Error::TooLarge(340_000)));
        assert_eq!(from_alpha5("     "), Err(Alpha5Error::Empty));
        assert!(matches!(from_alpha5("I0000"), Err(Alpha5Error::Malformed(_))));
        assert!(matches!(from_alpha5("A00x0"), Err(Alpha5Error::Malformed(_))));
    }
}
