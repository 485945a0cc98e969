//! Phone number heuristic for free-text input.

/// Check whether free text looks like a Russian phone number.
///
/// Accepts 11 digits starting with `+7`, `7` or `8`, or any 10 digits
/// (number without country code). Separators are ignored.
pub fn looks_like_phone(input: &str) -> bool {
    let s = input.trim();
    if s.is_empty() {
        return false;
    }

    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();

    if s.starts_with("+7") && digits == 11 {
        return true;
    }
    if (s.starts_with('7') || s.starts_with('8')) && digits == 11 {
        return true;
    }
    digits == 10
}
