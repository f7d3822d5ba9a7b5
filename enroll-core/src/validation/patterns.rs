use std::sync::LazyLock;

use regex::Regex;

/// Indian mobile number: 10 digits, leading digit 6-9.
pub(crate) static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("mobile pattern compiles"));

/// Indian postal index number: exactly 6 digits.
pub(crate) static PIN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("PIN pattern compiles"));

pub(crate) static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_requires_leading_six_to_nine() {
        assert!(MOBILE.is_match("9812345678"));
        assert!(MOBILE.is_match("6000000000"));
        assert!(!MOBILE.is_match("5812345678"));
        assert!(!MOBILE.is_match("981234567"));
        assert!(!MOBILE.is_match("98123456789"));
    }

    #[test]
    fn pin_code_is_six_digits() {
        assert!(PIN_CODE.is_match("110001"));
        assert!(!PIN_CODE.is_match("11000"));
        assert!(!PIN_CODE.is_match("11000a"));
    }

    #[test]
    fn email_shapes() {
        assert!(EMAIL.is_match("asha@example.com"));
        assert!(EMAIL.is_match("r.rao+school@mail.example.co.in"));
        assert!(!EMAIL.is_match("asha@example"));
        assert!(!EMAIL.is_match("asha example.com"));
        assert!(!EMAIL.is_match("@example.com"));
    }
}
