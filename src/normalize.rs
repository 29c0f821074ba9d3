//! Clean up place and city names emitted by a language model.
//!
//! Models decorate place names with day labels, time-of-day prefixes,
//! enumeration markers and bullets even when told not to. Stripping them
//! gives the search provider a fighting chance.

use regex::Regex;
use std::sync::LazyLock;

static DAY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:第\s*\d+\s*天|day\s*\d+)\s*[：:]\s*").unwrap()
});

static TIME_OF_DAY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:上午|下午|晚上|早上|中午|傍晚|morning|afternoon|evening)\s*[：:]\s*")
        .unwrap()
});

static LEADING_PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[（(][^）)]*[）)]\s*").unwrap());

static DAY_OR_TIME_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[（(]\s*(?:第\s*\d+\s*天|day\s*\d+|上午|下午|晚上|早上|中午|傍晚|morning|afternoon|evening)\s*[）)]\s*",
    )
    .unwrap()
});

static ENUMERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+\s*[、.．)）]|[①-⑳])\s*").unwrap());

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[•·●▪◦\-*]\s*").unwrap());

static PROVINCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^省]{2,8}?省").unwrap());

static CITY_WITH_DISTRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.{2,}?)市.+[区县]$").unwrap());

static QUALIFIER_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[省市区县]+").unwrap());

static CITY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(?:市|\s+city)$").unwrap());

/// Strip day/time labels, enumeration markers and bullets from a place name.
///
/// Never returns an empty string for non-empty input: when everything would
/// be stripped the raw name comes back unchanged.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();
    for pattern in [&DAY_LABEL, &TIME_OF_DAY_LABEL, &LEADING_PARENTHESIZED] {
        cleaned = pattern.replace(&cleaned, "").trim().to_string();
    }
    cleaned = DAY_OR_TIME_ANNOTATION
        .replace_all(&cleaned, "")
        .trim()
        .to_string();
    for pattern in [&ENUMERATION, &BULLET] {
        cleaned = pattern.replace(&cleaned, "").trim().to_string();
    }

    if cleaned.is_empty() {
        raw.to_string()
    } else {
        cleaned
    }
}

/// Reduce an administrative city label to the bare city name used as a
/// bounds-table key, e.g. "江苏省南京市" becomes "南京".
pub fn clean_city_name(city: &str) -> String {
    let trimmed = city.trim();
    let without_province = PROVINCE_PREFIX.replace(trimmed, "");
    let without_district = CITY_WITH_DISTRICT.replace(without_province.trim(), "$1");
    let without_qualifier = QUALIFIER_PREFIX.replace(without_district.trim(), "");
    CITY_SUFFIX
        .replace(without_qualifier.trim(), "")
        .trim()
        .to_string()
}

/// Identity key for markers: trimmed and lowercased
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_day_label() {
        assert_eq!(normalize("第1天：故宫博物院"), "故宫博物院");
        assert_eq!(normalize("Day 2: Summer Palace"), "Summer Palace");
    }

    #[test]
    fn test_strips_time_of_day_label() {
        assert_eq!(normalize("上午：天安门广场"), "天安门广场");
        assert_eq!(normalize("Evening: Nanluoguxiang"), "Nanluoguxiang");
    }

    #[test]
    fn test_strips_parenthetical_annotations() {
        assert_eq!(normalize("① 故宫（上午）"), "故宫");
        assert_eq!(normalize("颐和园 (第2天)"), "颐和园");
        assert_eq!(normalize("(北京)天坛公园"), "天坛公园");
    }

    #[test]
    fn test_keeps_branch_parentheses() {
        assert_eq!(normalize("全聚德烤鸭店（前门店）"), "全聚德烤鸭店（前门店）");
    }

    #[test]
    fn test_strips_enumeration_and_bullets() {
        assert_eq!(normalize("1. 天安门"), "天安门");
        assert_eq!(normalize("2、夫子庙"), "夫子庙");
        assert_eq!(normalize("• 中山陵"), "中山陵");
        assert_eq!(normalize("  · 玄武湖  "), "玄武湖");
    }

    #[test]
    fn test_combined_prefixes() {
        assert_eq!(normalize("第3天：上午：1. 灵隐寺"), "灵隐寺");
    }

    #[test]
    fn test_never_returns_empty() {
        assert_eq!(normalize("（上午）"), "（上午）");
        assert_eq!(normalize("1."), "1.");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_clean_city_name() {
        assert_eq!(clean_city_name("南京市"), "南京");
        assert_eq!(clean_city_name("江苏省南京市"), "南京");
        assert_eq!(clean_city_name(" 北京 "), "北京");
        assert_eq!(clean_city_name("北京市朝阳区"), "北京");
        assert_eq!(clean_city_name("Hangzhou City"), "Hangzhou");
        assert_eq!(clean_city_name(""), "");
    }

    #[test]
    fn test_name_key() {
        assert_eq!(name_key("  West Lake "), "west lake");
    }
}
