use crate::error::PlannerError;
use crate::extract::extract_json;
use crate::model::ItinerarySummary;
use crate::providers::{build_budget_prompt, LlmProvider, Task};
use crate::store::Expense;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Itemised trip cost in CNY
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetEstimate {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
}

impl BudgetEstimate {
    /// Derive an estimate from the itinerary's own `budgetSummary`
    pub fn from_summary(summary: &ItinerarySummary) -> Self {
        // BTreeMap iteration keeps the categories in a stable order
        let items: Vec<BudgetItem> = summary
            .budget_summary
            .iter()
            .map(|(category, amount)| BudgetItem {
                category: category.clone(),
                amount: *amount,
                note: None,
            })
            .collect();
        let total = items.iter().map(|i| i.amount).sum();
        Self { total, items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.total == 0.0
    }
}

/// Recorded spending against the planned amount for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub category: String,
    pub actual: f64,
    pub planned: f64,
    /// `actual - planned`; positive means over budget
    pub delta: f64,
}

pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Sum expenses per category, in the order categories first appear
pub fn spent_by_category(expenses: &[Expense]) -> Vec<BudgetItem> {
    let mut totals: Vec<BudgetItem> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|t| t.category == expense.category) {
            Some(total) => total.amount += expense.amount,
            None => totals.push(BudgetItem {
                category: expense.category.clone(),
                amount: expense.amount,
                note: None,
            }),
        }
    }
    totals
}

/// Line up actual spending with an estimate, category by category.
///
/// Categories with spending come first, then planned-only ones; a side with
/// nothing for a category counts as zero.
pub fn compare_with_plan(expenses: &[Expense], plan: &BudgetEstimate) -> Vec<CategoryComparison> {
    let spent = spent_by_category(expenses);
    let mut categories: Vec<&str> = spent.iter().map(|s| s.category.as_str()).collect();
    for item in &plan.items {
        if !categories.contains(&item.category.as_str()) {
            categories.push(&item.category);
        }
    }

    categories
        .into_iter()
        .map(|category| {
            let actual = spent
                .iter()
                .find(|s| s.category == category)
                .map_or(0.0, |s| s.amount);
            let planned = plan
                .items
                .iter()
                .find(|i| i.category == category)
                .map_or(0.0, |i| i.amount);
            CategoryComparison {
                category: category.to_string(),
                actual,
                planned,
                delta: actual - planned,
            }
        })
        .collect()
}

/// Read a model's budget answer; anything unreadable becomes an empty estimate
pub fn parse_budget(text: &str) -> BudgetEstimate {
    extract_json(text)
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Ask the model for an itemised estimate of a plan
pub async fn estimate_budget(
    provider: &dyn LlmProvider,
    plan: &str,
) -> Result<BudgetEstimate, PlannerError> {
    let text = provider.complete(Task::Budget, &build_budget_prompt(plan)).await?;
    let estimate = parse_budget(&text);
    if estimate.is_empty() {
        warn!("budget answer from {} was empty or unreadable", provider.provider_name());
    }
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn expense(category: &str, amount: f64) -> Expense {
        Expense {
            id: format!("{}-{}", category, amount),
            plan_id: Some("itinerary-1".to_string()),
            category: category.to_string(),
            amount,
            note: None,
            created_at: Utc::now(),
        }
    }

    struct CannedProvider(&'static str);

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, task: Task, prompt: &str) -> Result<String, PlannerError> {
            assert_eq!(task, Task::Budget);
            assert!(prompt.contains("中山陵"));
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_parse_budget_strict_json() {
        let estimate = parse_budget(
            r#"{"total": 1500, "items": [{"category": "住宿", "amount": 1200, "note": "两晚"}, {"category": "交通", "amount": 300}]}"#,
        );
        assert_eq!(estimate.total, 1500.0);
        assert_eq!(estimate.items.len(), 2);
        assert_eq!(estimate.items[0].note.as_deref(), Some("两晚"));
    }

    #[test]
    fn test_parse_budget_tolerates_fences() {
        let estimate = parse_budget("```json\n{\"total\": 80, \"items\": []}\n```");
        assert_eq!(estimate.total, 80.0);
    }

    #[test]
    fn test_parse_budget_garbage_is_zero() {
        assert_eq!(parse_budget("sorry, I cannot help"), BudgetEstimate::default());
        assert_eq!(
            parse_budget(r#"{"total": "a lot"}"#),
            BudgetEstimate::default()
        );
    }

    #[test]
    fn test_from_summary() {
        let mut budget_summary = BTreeMap::new();
        budget_summary.insert("门票".to_string(), 150.0);
        budget_summary.insert("交通".to_string(), 300.0);
        let summary = ItinerarySummary {
            budget_summary,
            ..Default::default()
        };

        let estimate = BudgetEstimate::from_summary(&summary);
        assert_eq!(estimate.total, 450.0);
        assert_eq!(estimate.items[0].category, "交通");
    }

    #[tokio::test]
    async fn test_estimate_budget() {
        let provider = CannedProvider(r#"{"total": 99, "items": [{"category": "门票", "amount": 99}]}"#);
        let estimate = estimate_budget(&provider, "第1天：中山陵").await.unwrap();
        assert_eq!(estimate.total, 99.0);
    }

    #[test]
    fn test_spent_by_category() {
        let expenses = vec![
            expense("餐饮", 45.5),
            expense("交通", 120.0),
            expense("餐饮", 30.0),
        ];
        assert_eq!(total_spent(&expenses), 195.5);

        let totals = spent_by_category(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "餐饮");
        assert_eq!(totals[0].amount, 75.5);
        assert_eq!(totals[1].amount, 120.0);
    }

    #[test]
    fn test_compare_with_plan() {
        let plan = BudgetEstimate {
            total: 700.0,
            items: vec![
                BudgetItem {
                    category: "交通".to_string(),
                    amount: 100.0,
                    note: None,
                },
                BudgetItem {
                    category: "住宿".to_string(),
                    amount: 600.0,
                    note: None,
                },
            ],
        };
        let comparison = compare_with_plan(&[expense("交通", 120.0), expense("餐饮", 40.0)], &plan);

        let rows: Vec<(&str, f64, f64, f64)> = comparison
            .iter()
            .map(|c| (c.category.as_str(), c.actual, c.planned, c.delta))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("交通", 120.0, 100.0, 20.0),
                ("餐饮", 40.0, 0.0, 40.0),
                ("住宿", 0.0, 600.0, -600.0),
            ]
        );
    }

    #[test]
    fn test_no_expenses() {
        assert_eq!(total_spent(&[]), 0.0);
        assert!(compare_with_plan(&[], &BudgetEstimate::default()).is_empty());
    }
}
