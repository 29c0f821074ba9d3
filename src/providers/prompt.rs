/// Instructions for generating a day-by-day itinerary.
///
/// The prompt asks the model to finish with a fenced JSON summary whose
/// `poiList` names are clean enough to search for on the map.
pub const ITINERARY_PROMPT: &str = include_str!("itinerary_prompt.txt");

/// Append the traveller's request to the itinerary instructions
pub fn build_itinerary_prompt(request: &str) -> String {
    format!("{}\n用户需求：\n{}", ITINERARY_PROMPT.trim_end(), request.trim())
}

/// Ask for a strict JSON budget estimate of a plan or its summary
pub fn build_budget_prompt(plan: &str) -> String {
    [
        "请基于以下旅行行程或预算概要，给出严格 JSON 的预算估算：",
        "输出结构：",
        r#"{ "total": number, "items": [ { "category": "交通|住宿|餐饮|门票|其他", "amount": number, "note": string? } ] }"#,
        "币种：人民币，数值为数字，不带 ¥ 或 人民币 字样。",
        "以下为行程/概要：",
        plan,
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!ITINERARY_PROMPT.is_empty());
        assert!(ITINERARY_PROMPT.contains("```json"));
        assert!(ITINERARY_PROMPT.contains("poiList"));
        assert!(ITINERARY_PROMPT.contains("budgetSummary"));
    }

    #[test]
    fn test_build_itinerary_prompt_appends_request() {
        let prompt = build_itinerary_prompt("  南京三日游，喜欢历史  ");
        assert!(prompt.starts_with(ITINERARY_PROMPT.trim_end()));
        assert!(prompt.ends_with("用户需求：\n南京三日游，喜欢历史"));
    }

    #[test]
    fn test_build_budget_prompt_includes_plan() {
        let prompt = build_budget_prompt("第1天：中山陵");
        assert!(prompt.contains("\"total\": number"));
        assert!(prompt.ends_with("第1天：中山陵"));
    }
}
