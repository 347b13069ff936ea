//! Built-in [`TextDecode`] implementations.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DecodeError;
use crate::value::TextDecode;

macro_rules! from_str_decode {
    ($($ty:ty),+) => {$(
        impl TextDecode for $ty {
            const KIND: &'static str = stringify!($ty);

            fn from_text(text: &str) -> Result<Self, DecodeError> {
                text.parse::<$ty>()
                    .map_err(|_| DecodeError::invalid(Self::KIND, text))
            }

            fn to_text(&self) -> Option<String> {
                Some(self.to_string())
            }
        }
    )+};
}

from_str_decode!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, char, IpAddr, Ipv4Addr, Ipv6Addr,
    SocketAddr
);

macro_rules! float_decode {
    ($($ty:ty),+) => {$(
        impl TextDecode for $ty {
            const KIND: &'static str = stringify!($ty);

            fn from_text(text: &str) -> Result<Self, DecodeError> {
                let value = text
                    .parse::<$ty>()
                    .map_err(|_| DecodeError::invalid(Self::KIND, text))?;
                // Out-of-range literals parse to infinity instead of failing.
                if value.is_infinite() && !names_infinity(text) {
                    return Err(DecodeError::invalid(Self::KIND, text));
                }
                Ok(value)
            }

            fn to_text(&self) -> Option<String> {
                Some(self.to_string())
            }
        }
    )+};
}

float_decode!(f32, f64);

fn names_infinity(text: &str) -> bool {
    text.trim_start_matches(['+', '-'])
        .get(..3)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("inf"))
}

impl TextDecode for bool {
    const KIND: &'static str = "bool";

    fn from_text(text: &str) -> Result<Self, DecodeError> {
        match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(DecodeError::invalid(Self::KIND, text)),
        }
    }

    fn to_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl TextDecode for String {
    const KIND: &'static str = "String";

    fn from_text(text: &str) -> Result<Self, DecodeError> {
        Ok(text.to_string())
    }

    fn to_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl TextDecode for PathBuf {
    const KIND: &'static str = "PathBuf";

    fn from_text(text: &str) -> Result<Self, DecodeError> {
        Ok(PathBuf::from(text))
    }

    fn to_text(&self) -> Option<String> {
        self.to_str().map(str::to_string)
    }
}

impl TextDecode for Duration {
    const KIND: &'static str = "Duration";

    fn from_text(text: &str) -> Result<Self, DecodeError> {
        parse_duration(text).ok_or_else(|| DecodeError::invalid(Self::KIND, text))
    }

    fn to_text(&self) -> Option<String> {
        Some(format_duration(*self))
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    Some(match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    })
}

/// Parse a duration such as `1h30m`, `1.5s` or `250ms`. A bare `0` is
/// accepted; negative durations are not.
fn parse_duration(text: &str) -> Option<Duration> {
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_len);

        let (frac_part, after) = match after.strip_prefix('.') {
            Some(after) => {
                let len = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
                after.split_at(len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = unit_nanos(unit)?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let mut component = whole.checked_mul(scale)?;

        // Digits past nanosecond precision cannot change the result.
        let frac_digits = &frac_part[..frac_part.len().min(18)];
        if !frac_digits.is_empty() {
            let numerator: u128 = frac_digits.parse().ok()?;
            let denominator = 10u128.pow(frac_digits.len() as u32);
            component = component.checked_add(numerator * scale / denominator)?;
        }

        total = total.checked_add(component)?;
        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    Some(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Inverse of [`parse_duration`]: `1h30m0s`, `1.5s`, `250ms`.
fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < NANOS_PER_SEC {
        let (unit, scale) = if nanos < 1_000 {
            ("ns", 1)
        } else if nanos < 1_000_000 {
            ("µs", 1_000)
        } else {
            ("ms", 1_000_000)
        };
        return format!("{}{unit}", decimal(nanos, scale));
    }

    let secs = nanos / NANOS_PER_SEC;
    let hours = secs / 3_600;
    let minutes = secs % 3_600 / 60;
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    let rem = nanos % (60 * NANOS_PER_SEC);
    out.push_str(&decimal(rem, NANOS_PER_SEC));
    out.push('s');
    out
}

fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
