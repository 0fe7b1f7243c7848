//! One-time passcodes that gate the start of a ride.
//!
//! The code is generated server-side when a ride is created, relayed to the
//! rider when a captain confirms, and must be presented by the captain to
//! start the ride. Client input never sets it.

use rand::Rng;

/// Number of decimal digits in a ride OTP.
pub const OTP_LENGTH: u32 = 6;

/// Generate a fresh `OTP_LENGTH`-digit numeric code with no leading zero.
///
/// `rand::rng()` is a cryptographically secure, OS-seeded generator.
pub fn generate_otp() -> String {
    let low = 10u32.pow(OTP_LENGTH - 1);
    let high = 10u32.pow(OTP_LENGTH);
    rand::rng().random_range(low..high).to_string()
}

/// Whether `candidate` has the shape of a ride OTP.
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == OTP_LENGTH as usize && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Compare a supplied code against the stored one without short-circuiting
/// on the first differing byte.
pub fn otp_matches(expected: &str, supplied: &str) -> bool {
    if expected.len() != supplied.len() {
        return false;
    }
    expected
        .bytes()
        .zip(supplied.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
