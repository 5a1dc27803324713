//! Date expansion for templated endpoint URLs

use chrono::{Datelike, NaiveDate};

/// Expand date tokens in a URL template against the given calendar day.
///
/// Tokens: `{yyyy}` 4-digit year, `{MM}` zero-padded month, `{dd}`
/// zero-padded day, plus the compact `{MMdd}` and `{yyyyMMdd}` forms.
/// Longer tokens are substituted first so `{yyyyMMdd}` is never
/// clobbered by `{yyyy}`.
pub fn expand(template: &str, date: NaiveDate) -> String {
    let yyyy = format!("{:04}", date.year());
    let mm = format!("{:02}", date.month());
    let dd = format!("{:02}", date.day());

    template
        .replace("{yyyyMMdd}", &format!("{yyyy}{mm}{dd}"))
        .replace("{MMdd}", &format!("{mm}{dd}"))
        .replace("{yyyy}", &yyyy)
        .replace("{MM}", &mm)
        .replace("{dd}", &dd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_basic_tokens() {
        let url = expand("https://example.com/{yyyy}/{MM}/{dd}.txt", date(2024, 3, 5));
        assert_eq!(url, "https://example.com/2024/03/05.txt");
    }

    #[test]
    fn test_compact_tokens() {
        assert_eq!(
            expand("https://example.com/{yyyyMMdd}.txt", date(2024, 3, 5)),
            "https://example.com/20240305.txt"
        );
        assert_eq!(
            expand("https://example.com/{yyyy}/{MM}/{MMdd}.txt", date(2024, 3, 5)),
            "https://example.com/2024/03/0305.txt"
        );
    }

    #[test]
    fn test_no_tokens_is_identity() {
        let url = "https://example.com/static/sub";
        assert_eq!(expand(url, date(2024, 12, 31)), url);
    }

    #[test]
    fn test_zero_padding() {
        let url = expand("{yyyy}-{MM}-{dd}", date(2025, 1, 9));
        assert_eq!(url, "2025-01-09");
    }
}
