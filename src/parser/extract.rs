use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "in 2.3s"; digits must sit directly against the unit suffix.
    static ref SECONDS: Regex = Regex::new(r"(\d+(?:\.\d+)?)s\b").unwrap();
    // "in 850 ms" / "in 1337ms"
    static ref MILLIS: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*ms\b").unwrap();
    static ref MODULES: Regex = Regex::new(r"(\d+)\s+modules\b").unwrap();
}

/// Pull a duration out of free text, normalized to milliseconds.
///
/// The seconds form is checked first and wins when both unit suffixes are
/// textually present. Text with no recognizable duration yields `None`;
/// malformed numbers are not an error.
pub fn extract_duration_ms(text: &str) -> Option<f64> {
    if let Some(caps) = SECONDS.captures(text) {
        if let Ok(seconds) = caps[1].parse::<f64>() {
            return Some(seconds * 1000.0);
        }
    }
    if let Some(caps) = MILLIS.captures(text) {
        if let Ok(millis) = caps[1].parse::<f64>() {
            return Some(millis);
        }
    }
    None
}

/// Pull a "<n> modules" count out of free text.
pub fn extract_module_count(text: &str) -> Option<u64> {
    MODULES
        .captures(text)
        .and_then(|caps| caps[1].parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_normalized_to_millis() {
        assert_eq!(
            extract_duration_ms("compiled client and server successfully in 2.3s"),
            Some(2300.0)
        );
        assert_eq!(extract_duration_ms("done in 1s"), Some(1000.0));
    }

    #[test]
    fn test_millis_with_and_without_space() {
        assert_eq!(extract_duration_ms("compiled successfully in 850 ms"), Some(850.0));
        assert_eq!(extract_duration_ms("compiled successfully in 1337ms"), Some(1337.0));
    }

    #[test]
    fn test_seconds_win_when_both_present() {
        assert_eq!(extract_duration_ms("took 2s (was 900 ms before)"), Some(2000.0));
    }

    #[test]
    fn test_ms_text_does_not_match_seconds_pattern() {
        // "850 ms" must not be read as "850 seconds".
        assert_eq!(extract_duration_ms("in 850 ms"), Some(850.0));
    }

    #[test]
    fn test_no_duration_yields_none() {
        assert_eq!(extract_duration_ms("compiled successfully"), None);
        assert_eq!(extract_duration_ms("in 25sec"), None);
        assert_eq!(extract_duration_ms(""), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_duration_ms("in 1.2s then 3.4s"), Some(1200.0));
        assert_eq!(extract_module_count("100 modules then 200 modules"), Some(100));
    }

    #[test]
    fn test_comma_decimal_not_honored() {
        // Only dot decimals parse as fractions; "2,3s" degrades to the digit
        // adjacent to the suffix.
        assert_eq!(extract_duration_ms("in 2,3s"), Some(3000.0));
    }

    #[test]
    fn test_module_count() {
        assert_eq!(extract_module_count("compiled in 2.3s (267 modules)"), Some(267));
        assert_eq!(extract_module_count("no counts here"), None);
    }
}
