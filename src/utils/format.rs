/// Render a float in shortest round-trip form with a mandatory fractional part.
///
/// Magnitudes at or above 1e16, or below 1e-4, switch to scientific notation
/// with a signed, two-digit minimum exponent.
///
/// # Examples
/// ```
/// use station_temps::utils::format_decimal;
///
/// assert_eq!(format_decimal(2000.542), "2000.542");
/// assert_eq!(format_decimal(2000.0), "2000.0");
/// assert_eq!(format_decimal(1e16), "1e+16");
/// ```
pub fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if !(1e-4..1e16).contains(&magnitude) {
        return format_scientific(value);
    }

    let rendered = value.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

fn format_scientific(value: f64) -> String {
    // `{:e}` yields e.g. "1.5e-5" or "1e16"
    let rendered = format!("{:e}", value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}
