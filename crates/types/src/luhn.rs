//! Luhn (mod 10) checksum used for the optional trailing ICCID check digit.

/// Returns true when `digits` is a non-empty ASCII digit string whose Luhn
/// sum is a multiple of 10.
///
/// The digit at 0-based index `i` is doubled when `i % 2 == len % 2`, which
/// doubles every second digit counting leftwards from the check digit.
pub fn is_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let parity = digits.len() % 2;
    let sum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let mut d = u32::from(b - b'0');
            if i % 2 == parity {
                d *= 2;
                if d > 9 {
                    d -= 9;
                }
            }
            d
        })
        .sum();

    sum % 10 == 0
}

/// Computes the check digit that makes `payload ++ digit` Luhn-valid.
pub fn check_digit(payload: &str) -> Option<u8> {
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    (0u8..=9).find(|d| is_valid(&format!("{payload}{d}")))
}
