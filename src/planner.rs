use crate::budget::{self, BudgetEstimate};
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::extract::extract_summary;
use crate::geocode::{AmapClient, PlaceProvider};
use crate::markers::{bind_days, partition_pois, MarkerBoard};
use crate::model::{ItinerarySummary, PoiQuery, ResolvedMarker};
use crate::providers::{build_itinerary_prompt, LlmProvider, ProviderFactory, Task};
use crate::resolver::PoiResolver;
use crate::store::{derive_title, Expense, ItineraryStore, MemoryStore, SavedItinerary};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// The itinerary currently on screen
#[derive(Debug, Clone, Default)]
struct CurrentItinerary {
    text: String,
    summary: Option<ItinerarySummary>,
}

/// Background geocoding batch started by [`TripPlanner::refresh`]
#[derive(Debug)]
pub struct RefreshHandle {
    generation: u64,
    task: Option<JoinHandle<bool>>,
}

impl RefreshHandle {
    /// Marker generation the batch was issued under
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether anything was sent to the resolver
    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the batch. Returns true if its markers were merged, false if
    /// there was no batch or it was discarded as stale.
    pub async fn wait(self) -> bool {
        let Some(task) = self.task else {
            return false;
        };
        match task.await {
            Ok(applied) => applied,
            Err(e) => {
                warn!("geocoding batch {} failed: {}", self.generation, e);
                false
            }
        }
    }
}

/// Result of [`TripPlanner::plan`]
#[derive(Debug)]
pub struct PlanOutcome {
    /// The model's narrative itinerary
    pub text: String,
    /// `None` when the text carried no readable summary
    pub summary: Option<ItinerarySummary>,
    pub pending: RefreshHandle,
}

/// Ties together the language model, the resolver, the marker board and storage
pub struct TripPlanner {
    llm: Option<Arc<dyn LlmProvider>>,
    resolver: Arc<PoiResolver>,
    store: Arc<dyn ItineraryStore>,
    board: MarkerBoard,
    current: Mutex<CurrentItinerary>,
}

impl TripPlanner {
    pub fn builder() -> PlannerBuilder {
        PlannerBuilder::default()
    }

    fn llm(&self) -> Result<&dyn LlmProvider, PlannerError> {
        self.llm
            .as_deref()
            .ok_or_else(|| PlannerError::MissingCredentials("llm".to_string()))
    }

    /// Ask the model for an itinerary and start placing its POIs on the map
    pub async fn plan(&self, request: &str) -> Result<PlanOutcome, PlannerError> {
        let llm = self.llm()?;
        let text = llm
            .complete(Task::Plan, &build_itinerary_prompt(request))
            .await?;

        let summary = extract_summary(&text);
        if summary.is_none() {
            warn!("no itinerary summary found in {} response", llm.provider_name());
        }

        *self.current.lock().await = CurrentItinerary {
            text: text.clone(),
            summary: summary.clone(),
        };
        let pending = self.refresh(&summary.clone().unwrap_or_default()).await;

        Ok(PlanOutcome {
            text,
            summary,
            pending,
        })
    }

    /// Rebuild the marker board for `summary`.
    ///
    /// Entries that already carry coordinates are shown immediately; the rest
    /// are geocoded in the background and merged only if no later refresh has
    /// started in the meantime.
    pub async fn refresh(&self, summary: &ItinerarySummary) -> RefreshHandle {
        let (ready, pending) = partition_pois(summary);
        let generation = self.board.reset(ready).await;

        if pending.is_empty() {
            return RefreshHandle {
                generation,
                task: None,
            };
        }

        debug!(
            "generation {}: geocoding {} names in the background",
            generation,
            pending.len()
        );
        let resolver = Arc::clone(&self.resolver);
        let board = self.board.clone();
        let task = tokio::spawn(async move {
            let queries: Vec<PoiQuery> = pending.iter().map(|p| p.query.clone()).collect();
            let resolved = resolver.resolve(&queries).await;
            board.merge(generation, bind_days(resolved, &pending)).await
        });

        RefreshHandle {
            generation,
            task: Some(task),
        }
    }

    /// Save the itinerary currently on screen
    pub async fn save_current(&self) -> Result<SavedItinerary, PlannerError> {
        let current = self.current.lock().await.clone();
        if current.text.trim().is_empty() {
            return Err(PlannerError::NotFound("no current itinerary".to_string()));
        }
        let saved = self
            .store
            .save(&derive_title(&current.text), &current.text, current.summary)
            .await?;
        info!("saved itinerary {} ({})", saved.id, saved.title);
        Ok(saved)
    }

    /// Make a saved itinerary current and rebuild its markers
    pub async fn select(&self, id: &str) -> Result<RefreshHandle, PlannerError> {
        let saved = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| PlannerError::NotFound(id.to_string()))?;

        // older saves may predate the summary; recover it from the text
        let summary = saved
            .summary
            .clone()
            .or_else(|| extract_summary(&saved.raw_text));

        *self.current.lock().await = CurrentItinerary {
            text: saved.raw_text,
            summary: summary.clone(),
        };
        Ok(self.refresh(&summary.unwrap_or_default()).await)
    }

    pub async fn list_saved(&self) -> Result<Vec<SavedItinerary>, PlannerError> {
        self.store.list().await
    }

    /// Record spending, optionally against a saved itinerary
    pub async fn add_expense(
        &self,
        plan_id: Option<&str>,
        category: &str,
        amount: f64,
        note: Option<&str>,
    ) -> Result<Expense, PlannerError> {
        let expense = self.store.add_expense(plan_id, category, amount, note).await?;
        debug!("recorded {} {} for {:?}", expense.category, expense.amount, plan_id);
        Ok(expense)
    }

    pub async fn expenses(&self, plan_id: Option<&str>) -> Result<Vec<Expense>, PlannerError> {
        self.store.list_expenses(plan_id).await
    }

    /// Markers as they stand right now
    pub async fn markers(&self) -> Vec<ResolvedMarker> {
        self.board.snapshot().await
    }

    pub async fn current_summary(&self) -> Option<ItinerarySummary> {
        self.current.lock().await.summary.clone()
    }

    /// Itemised budget for a plan text
    pub async fn estimate_budget(&self, plan: &str) -> Result<BudgetEstimate, PlannerError> {
        budget::estimate_budget(self.llm()?, plan).await
    }
}

/// Builder for [`TripPlanner`]
#[derive(Default)]
pub struct PlannerBuilder {
    config: Option<PlannerConfig>,
    llm: Option<Arc<dyn LlmProvider>>,
    places: Option<Arc<dyn PlaceProvider>>,
    store: Option<Arc<dyn ItineraryStore>>,
}

impl PlannerBuilder {
    /// Use this configuration instead of the defaults
    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a specific language-model provider instead of the configured one
    pub fn llm(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.llm = Some(Arc::from(provider));
        self
    }

    /// Use a specific place provider instead of AMap
    pub fn places(mut self, provider: Arc<dyn PlaceProvider>) -> Self {
        self.places = Some(provider);
        self
    }

    pub fn store(mut self, store: Arc<dyn ItineraryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Assemble the planner.
    ///
    /// A missing LLM key is not an error: the planner can still resolve and
    /// display saved itineraries, and `plan` reports the missing key when called.
    pub fn build(self) -> Result<TripPlanner, PlannerError> {
        let config = self.config.unwrap_or_default();

        let llm = match self.llm {
            Some(llm) => Some(llm),
            None => match ProviderFactory::create(&config.llm) {
                Ok(provider) => Some(Arc::from(provider)),
                Err(PlannerError::MissingCredentials(what)) => {
                    warn!("no {} API key configured, planning is disabled", what);
                    None
                }
                Err(e) => return Err(e),
            },
        };

        let places: Arc<dyn PlaceProvider> = match self.places {
            Some(places) => places,
            None => Arc::new(AmapClient::new(&config.amap)?),
        };

        Ok(TripPlanner {
            llm,
            resolver: Arc::new(PoiResolver::from_config(places, &config.amap)),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            board: MarkerBoard::new(),
            current: Mutex::new(CurrentItinerary::default()),
        })
    }
}
