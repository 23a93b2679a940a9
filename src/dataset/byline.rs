// Byline and dateline patterns found in Chinese-language wire copy.
//
//   記者王宏舜╱即時報導                 -> reporter 王宏舜
//   中央社記者蔡沛琪台北2016年6月29日電   -> reporter 蔡沛琪, date 2016-06-29
//   ETNOTW, CTRTOT                      -> wire source codes
//
// Dates may be written with Arabic or Chinese numerals (二〇一六年六月二十九日).

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex_lite::Regex;

/// CJK ideographs allowed in a reporter name.
const NAME: &str = "[一-鿿]{2,4}";
const YEAR_DIGITS: &str = "[0-9零〇一二两兩三四五六七八九十]+";
const DAY_DIGITS: &str = "[0-9一二三四五六七八九十]+";

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"({YEAR_DIGITS})\s*年\s*({DAY_DIGITS})\s*月\s*({DAY_DIGITS})\s*[号號日]"
        );
        Regex::new(&pattern).expect("date pattern is valid")
    })
}

fn reporter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"^(?:記者({NAME})╱?(?:即時)?報導|中央社記者({NAME})台北.+)$");
        Regex::new(&pattern).expect("reporter pattern is valid")
    })
}

fn news_source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3,}[A-Z0-9]+$").expect("source pattern is valid"))
}

/// Reporter name from a byline line, if the line is a byline.
pub fn reporter(line: &str) -> Option<String> {
    let caps = reporter_re().captures(line.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// First date mentioned in the text.
pub fn publish_date(text: &str) -> Option<NaiveDate> {
    date_re().captures_iter(text).find_map(|caps| {
        let year = parse_numeral(caps.get(1)?.as_str())?;
        let month = parse_numeral(caps.get(2)?.as_str())?;
        let day = parse_numeral(caps.get(3)?.as_str())?;
        NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
    })
}

/// Whether a token looks like a wire-service source code such as `ETNOTW`.
pub fn is_news_source_code(token: &str) -> bool {
    news_source_re().is_match(token)
}

/// Parse Arabic digits, digit-by-digit Chinese numerals (二〇一六), or
/// tens notation (二十九, 十五, 十).
fn parse_numeral(s: &str) -> Option<u32> {
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }

    if let Some((tens, ones)) = s.split_once('十') {
        let tens = if tens.is_empty() { 1 } else { parse_digits(tens)? };
        let ones = if ones.is_empty() { 0 } else { parse_digits(ones)? };
        return tens.checked_mul(10)?.checked_add(ones);
    }
    parse_digits(s)
}

fn parse_digits(s: &str) -> Option<u32> {
    s.chars().try_fold(0u32, |acc, c| {
        let digit = chinese_digit(c).or_else(|| c.to_digit(10))?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}

fn chinese_digit(c: char) -> Option<u32> {
    let digit = match c {
        '零' | '〇' => 0,
        '一' => 1,
        '二' | '两' | '兩' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporter_bylines() {
        assert_eq!(reporter("記者王宏舜╱即時報導").as_deref(), Some("王宏舜"));
        assert_eq!(reporter("記者項程鎮報導").as_deref(), Some("項程鎮"));
        assert_eq!(
            reporter("中央社記者蔡沛琪台北2016年6月29日電").as_deref(),
            Some("蔡沛琪")
        );
        assert_eq!(reporter("陳志賢、蕭博文、王己由"), None);
    }

    #[test]
    fn test_publish_date_arabic() {
        let date = publish_date("中央社記者蔡沛琪台北2016年6月29日電").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 6, 29).unwrap());
    }

    #[test]
    fn test_publish_date_chinese_numerals() {
        let date = publish_date("二〇一六年六月二十九日").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 6, 29).unwrap());
        let date = publish_date("2020 年 十 月 十五 号").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 10, 15).unwrap());
    }

    #[test]
    fn test_publish_date_rejects_impossible_dates() {
        assert_eq!(publish_date("2016年2月31日"), None);
        assert_eq!(publish_date("no date here"), None);
    }

    #[test]
    fn test_publish_date_overflowing_tens_numeral() {
        assert_eq!(publish_date("九九九九九九九九九十年1月1日"), None);
        assert_eq!(parse_numeral("九九九九九九九九九十"), None);
        assert_eq!(parse_numeral("二十九"), Some(29));
    }

    #[test]
    fn test_news_source_codes() {
        assert!(is_news_source_code("ETNOTW"));
        assert!(is_news_source_code("CTRTOT"));
        assert!(!is_news_source_code("Reuters"));
        assert!(!is_news_source_code("AB"));
    }
}
