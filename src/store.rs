use crate::error::PlannerError;
use crate::model::ItinerarySummary;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

const MAX_TITLE_CHARS: usize = 60;

/// Category used when an expense is recorded without one
pub const DEFAULT_EXPENSE_CATEGORY: &str = "其他";

/// A generated itinerary the user chose to keep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItinerary {
    pub id: String,
    pub title: String,
    pub raw_text: String,
    pub summary: Option<ItinerarySummary>,
    pub created_at: DateTime<Utc>,
}

/// Money actually spent, optionally tied to a saved itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub plan_id: Option<String>,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Title for a saved itinerary: its first non-empty line without markdown heading marks
pub fn derive_title(raw_text: &str) -> String {
    raw_text
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
        .unwrap_or_else(|| "Untitled itinerary".to_string())
}

/// Persistence for itineraries and the expenses recorded against them
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn save(
        &self,
        title: &str,
        raw_text: &str,
        summary: Option<ItinerarySummary>,
    ) -> Result<SavedItinerary, PlannerError>;

    async fn load(&self, id: &str) -> Result<Option<SavedItinerary>, PlannerError>;

    /// All itineraries, newest first
    async fn list(&self) -> Result<Vec<SavedItinerary>, PlannerError>;

    /// Record an expense. Amounts must be positive; a blank category
    /// becomes [`DEFAULT_EXPENSE_CATEGORY`].
    async fn add_expense(
        &self,
        plan_id: Option<&str>,
        category: &str,
        amount: f64,
        note: Option<&str>,
    ) -> Result<Expense, PlannerError>;

    /// Expenses for one itinerary, or all of them for `None`, newest first
    async fn list_expenses(&self, plan_id: Option<&str>) -> Result<Vec<Expense>, PlannerError>;
}

#[derive(Default)]
struct MemoryEntries {
    next_id: u64,
    itineraries: HashMap<String, (u64, SavedItinerary)>,
    next_expense_id: u64,
    expenses: Vec<Expense>,
}

/// In-memory storage for tests and single-session use.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<MemoryEntries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryStore {
    async fn save(
        &self,
        title: &str,
        raw_text: &str,
        summary: Option<ItinerarySummary>,
    ) -> Result<SavedItinerary, PlannerError> {
        let mut entries = self.entries.write().await;
        entries.next_id += 1;
        let sequence = entries.next_id;
        let saved = SavedItinerary {
            id: format!("itinerary-{}", sequence),
            title: title.to_string(),
            raw_text: raw_text.to_string(),
            summary,
            created_at: Utc::now(),
        };
        entries
            .itineraries
            .insert(saved.id.clone(), (sequence, saved.clone()));
        Ok(saved)
    }

    async fn load(&self, id: &str) -> Result<Option<SavedItinerary>, PlannerError> {
        let entries = self.entries.read().await;
        Ok(entries.itineraries.get(id).map(|(_, saved)| saved.clone()))
    }

    async fn list(&self) -> Result<Vec<SavedItinerary>, PlannerError> {
        let entries = self.entries.read().await;
        let mut all: Vec<&(u64, SavedItinerary)> = entries.itineraries.values().collect();
        // sequence, not timestamp: saves within the same instant must still order
        all.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(all.into_iter().map(|(_, saved)| saved.clone()).collect())
    }

    async fn add_expense(
        &self,
        plan_id: Option<&str>,
        category: &str,
        amount: f64,
        note: Option<&str>,
    ) -> Result<Expense, PlannerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(PlannerError::InvalidInput(format!(
                "expense amount must be positive, got {}",
                amount
            )));
        }
        let category = match category.trim() {
            "" => DEFAULT_EXPENSE_CATEGORY,
            trimmed => trimmed,
        };

        let mut entries = self.entries.write().await;
        entries.next_expense_id += 1;
        let expense = Expense {
            id: format!("expense-{}", entries.next_expense_id),
            plan_id: plan_id.map(str::to_string),
            category: category.to_string(),
            amount,
            note: note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string),
            created_at: Utc::now(),
        };
        entries.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn list_expenses(&self, plan_id: Option<&str>) -> Result<Vec<Expense>, PlannerError> {
        let entries = self.entries.read().await;
        // stored in insertion order
        Ok(entries
            .expenses
            .iter()
            .rev()
            .filter(|e| plan_id.is_none() || e.plan_id.as_deref() == plan_id)
            .cloned()
            .collect())
    }
}
