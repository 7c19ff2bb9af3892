use rust_decimal::Decimal;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    group(&cents, negative)
}

/// Same as [`money`], without the float round trip.
pub fn money_decimal(val: Decimal) -> String {
    let cents = format!("{:.2}", val.abs().round_dp(2));
    group(&cents, val.is_sign_negative() && !val.is_zero())
}

fn group(cents: &str, negative: bool) -> String {
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}
