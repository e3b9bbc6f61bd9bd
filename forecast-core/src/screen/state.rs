use tracing::debug;

use crate::model::{CityCandidate, WeatherSnapshot};

use super::ScreenSettings;

/// Everything that can happen to the screen: user input plus the completions
/// of work the screen started itself.
#[derive(Debug, Clone)]
pub enum Action {
    /// The city chosen on activation, remembered or default.
    Startup { city: String },
    QueryChanged(String),
    /// The debounce timer for query revision `rev` ran out.
    SearchTimerFired { rev: u64 },
    SearchResultsLoaded {
        seq: u64,
        result: Result<Vec<CityCandidate>, String>,
    },
    ToggleSearch,
    CitySelected(CityCandidate),
    ForecastLoaded {
        seq: u64,
        city: String,
        remember: bool,
        result: Result<WeatherSnapshot, String>,
    },
    Retry,
}

/// Side effects declared by [`ScreenState::reduce`], executed by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the debounce timer for query revision `rev`.
    ScheduleSearch { rev: u64 },
    CancelScheduledSearch,
    Search { seq: u64, query: String },
    FetchForecast {
        seq: u64,
        city: String,
        remember: bool,
    },
    /// Persist the city as the remembered one.
    RememberCity(String),
}

/// The forecast the screen last asked for, kept so it can be retried.
#[derive(Debug, Clone, PartialEq)]
struct ForecastTarget {
    city: String,
    remember: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    pub show_search: bool,
    /// Latest text typed into the search box.
    pub query: String,
    pub candidates: Vec<CityCandidate>,
    pub snapshot: Option<WeatherSnapshot>,
    pub loading: bool,
    /// Message of the last failed forecast fetch, cleared by the next success.
    pub error: Option<String>,
    query_rev: u64,
    search_seq: u64,
    forecast_seq: u64,
    target: Option<ForecastTarget>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenState {
    /// The screen starts out loading; the first snapshot ends that.
    pub fn new() -> Self {
        Self {
            show_search: false,
            query: String::new(),
            candidates: Vec::new(),
            snapshot: None,
            loading: true,
            error: None,
            query_rev: 0,
            search_seq: 0,
            forecast_seq: 0,
            target: None,
        }
    }

    /// City of the most recent forecast request, if any.
    pub fn active_city(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.city.as_str())
    }

    /// Candidates are only listed while the search box is open.
    pub fn visible_candidates(&self) -> &[CityCandidate] {
        if self.show_search {
            &self.candidates
        } else {
            &[]
        }
    }

    pub fn reduce(&mut self, action: Action, settings: &ScreenSettings) -> Vec<Effect> {
        match action {
            Action::Startup { city } => self.request_forecast(city, false),

            Action::QueryChanged(text) => {
                self.query = text;
                self.query_rev += 1;
                vec![Effect::ScheduleSearch {
                    rev: self.query_rev,
                }]
            }

            Action::SearchTimerFired { rev } => {
                if rev != self.query_rev {
                    debug!(rev, current = self.query_rev, "ignoring superseded search timer");
                    return Vec::new();
                }
                if self.query.chars().count() <= settings.min_query_len {
                    return Vec::new();
                }
                self.search_seq += 1;
                vec![Effect::Search {
                    seq: self.search_seq,
                    query: self.query.clone(),
                }]
            }

            Action::SearchResultsLoaded { seq, result } => {
                if seq != self.search_seq {
                    debug!(seq, latest = self.search_seq, "discarding stale search results");
                    return Vec::new();
                }
                self.candidates = result.unwrap_or_default();
                Vec::new()
            }

            Action::ToggleSearch => {
                self.show_search = !self.show_search;
                Vec::new()
            }

            Action::CitySelected(candidate) => {
                self.candidates.clear();
                self.show_search = false;
                // Outstanding timers and lookups belong to the query just answered.
                self.query_rev += 1;
                self.search_seq += 1;

                let mut effects = vec![Effect::CancelScheduledSearch];
                effects.extend(self.request_forecast(candidate.name, true));
                effects
            }

            Action::ForecastLoaded {
                seq,
                city,
                remember,
                result,
            } => {
                if seq != self.forecast_seq {
                    debug!(seq, latest = self.forecast_seq, %city, "discarding stale forecast");
                    return Vec::new();
                }
                self.loading = false;
                match result {
                    Ok(snapshot) => {
                        self.snapshot = Some(snapshot);
                        self.error = None;
                        if remember {
                            vec![Effect::RememberCity(city)]
                        } else {
                            Vec::new()
                        }
                    }
                    Err(message) => {
                        self.error = Some(message);
                        Vec::new()
                    }
                }
            }

            Action::Retry => match self.target.clone() {
                Some(target) => self.request_forecast(target.city, target.remember),
                None => Vec::new(),
            },
        }
    }

    fn request_forecast(&mut self, city: String, remember: bool) -> Vec<Effect> {
        self.loading = true;
        self.error = None;
        self.forecast_seq += 1;
        self.target = Some(ForecastTarget {
            city: city.clone(),
            remember,
        });
        vec![Effect::FetchForecast {
            seq: self.forecast_seq,
            city,
            remember,
        }]
    }
}
