use serde_json::json;
use trip_mapper::markers::{build_day_index, partition_pois};
use trip_mapper::{
    clean_city_name, extract_json, extract_summary, is_relevant, summary_from_text, MarkerSet,
    ResolvedMarker,
};

const HANGZHOU_RESPONSE: &str = r#"好的，以下是为您定制的杭州三日游行程：

## 第1天：西湖
- 上午：断桥残雪
- 下午：雷峰塔

## 第2天：灵隐寺
- 上午：灵隐寺
- 下午：西湖（第1天）

```json
{
  "days": [
    {"day": 1, "morning": ["断桥残雪"], "afternoon": "雷峰塔", "poiList": [{"name": "断桥残雪"}, {"name": "雷峰塔"}]},
    {"day": 2, "morning": ["灵隐寺"], "poiList": [{"name": "灵隐寺"}, {"name": "断桥残雪"}]}
  ],
  "poiList": [
    {"name": "断桥残雪", "city": "杭州市", "lng": 120.152, "lat": 30.262},
    {"name": "雷峰塔", "city": "杭州"},
    {"name": "灵隐寺", "city": "杭州", "lng": null, "lat": null}
  ],
  "budgetSummary": {"住宿": 1200, "门票": "150"}
}
```

祝您旅途愉快！"#;

#[test]
fn test_fenced_block_is_found_among_prose() {
    let summary = extract_summary(HANGZHOU_RESPONSE).unwrap();
    assert_eq!(summary.days.len(), 2);
    assert_eq!(summary.days[0].afternoon, vec!["雷峰塔"]);
    assert_eq!(summary.poi_list.len(), 3);
    assert_eq!(summary.budget_summary.get("住宿"), Some(&1200.0));
}

#[test]
fn test_fenced_block_deep_equals_parsed_content() {
    let payload = json!({"days": [{"day": 1, "poiList": [{"name": "外滩"}]}], "poiList": []});
    let text = format!("Here you go:\n```json\n{}\n```\nEnjoy!", payload);
    assert_eq!(extract_json(&text), Some(payload));
}

#[test]
fn test_unfenced_trailing_object() {
    let text = r#"行程如下……最后附上摘要 {"poiList": [{"name": "外滩", "city": "上海"}]}"#;
    let summary = summary_from_text(text);
    assert_eq!(summary.poi_list[0].name, "外滩");
}

#[test]
fn test_no_summary_means_no_pois() {
    assert!(extract_summary("抱歉，我无法完成这个请求 {").is_none());
    assert!(summary_from_text("plain text only").is_empty());
}

#[test]
fn test_day_index_and_partition() {
    let summary = extract_summary(HANGZHOU_RESPONSE).unwrap();
    let index = build_day_index(&summary);
    assert_eq!(index.get("断桥残雪"), Some(&1));
    assert_eq!(index.get("灵隐寺"), Some(&2));

    let (ready, pending) = partition_pois(&summary);
    assert_eq!(ready.len(), 1);
    assert_eq!(ready.as_slice()[0].day, Some(1));

    let pending_names: Vec<(&str, Option<u32>)> = pending
        .iter()
        .map(|p| (p.query.name.as_str(), p.day))
        .collect();
    assert_eq!(pending_names, vec![("雷峰塔", Some(1)), ("灵隐寺", Some(2))]);
}

#[test]
fn test_same_name_collapses_to_first_merged() {
    let mut set = MarkerSet::new();
    set.merge([
        ResolvedMarker::new("Oriental Pearl", 121.499, 31.239),
        ResolvedMarker::new("oriental pearl ", 121.0, 31.0),
    ]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.as_slice()[0].lng, 121.499);
}

#[test]
fn test_relevance_and_city_cleaning() {
    assert!(is_relevant("天安门广场", "天安门广场"));
    assert!(!is_relevant("天安门广场", "故宫博物院"));
    assert_eq!(clean_city_name("南京市"), "南京");
    assert!(trip_mapper::bounds::in_bounds(118.8, 32.0, Some("南京")));
    assert!(!trip_mapper::bounds::in_bounds(116.4, 39.9, Some("南京")));
}
