//! Number rendering for canonical JSON
//!
//! Every JSON number is treated as an IEEE-754 double and rendered the way
//! ECMAScript `Number.prototype.toString` does:
//!
//! - Shortest digit string that round-trips to the same double
//! - Plain decimal notation when `1e-6 <= |x| < 1e21`
//! - Exponent notation `d[.ddd]e±n` otherwise, with an explicit `+` for
//!   positive exponents and no leading zeros in the exponent
//!
//! This is also what the deployed ledger's Go encoder emits for `float64`,
//! which keeps digests computed here interchangeable with existing records.

use super::errors::{CanonicalError, CanonicalResult};

/// Render a double in canonical form.
///
/// # Errors
///
/// NaN and infinities have no JSON form and fail with `InvalidPayload`.
pub fn format_number(value: f64) -> CanonicalResult<String> {
    if !value.is_finite() {
        return Err(CanonicalError::invalid_payload(format!(
            "number {} is not finite",
            value
        )));
    }

    if value == 0.0 {
        // Go keeps the sign of negative zero
        return Ok(if value.is_sign_negative() {
            "-0".to_string()
        } else {
            "0".to_string()
        });
    }

    let (digits, point) = shortest_digits(value.abs());
    let mut out = String::with_capacity(digits.len() + 8);
    if value < 0.0 {
        out.push('-');
    }

    let k = digits.len() as i32;
    let n = point;

    if k <= n && n <= 21 {
        // Integer: digits followed by n-k zeros
        out.push_str(&digits);
        for _ in 0..(n - k) {
            out.push('0');
        }
    } else if 0 < n && n <= 21 {
        // Decimal point inside the digit string
        let (int_part, frac_part) = digits.split_at(n as usize);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else if -6 < n && n <= 0 {
        // Leading "0." and -n zeros
        out.push_str("0.");
        for _ in 0..(-n) {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        let exp = n - 1;
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exp >= 0 { '+' } else { '-' });
        out.push_str(&exp.abs().to_string());
    }

    Ok(out)
}

/// Decompose a positive finite double into its shortest round-trip digit
/// string and decimal point position.
///
/// The value equals `0.<digits> * 10^point`.
fn shortest_digits(value: f64) -> (String, i32) {
    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.2345e3"
    let rendered = format!("{:e}", value);
    let (mantissa, exponent) = match rendered.split_once('e') {
        Some(parts) => parts,
        None => (rendered.as_str(), "0"),
    };

    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    (digits, exponent + 1)
}
