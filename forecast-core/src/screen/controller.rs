use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, warn};

use crate::{
    model::CityCandidate,
    provider::WeatherApi,
    store::{KeyValueStore, LAST_CITY_KEY},
};

use super::{Action, Debouncer, Effect, ScreenSettings, ScreenState};

const COMMAND_BUFFER: usize = 32;

/// Input accepted from the outside; completions stay internal to the loop.
#[derive(Debug)]
enum Command {
    /// `applied` fires once the new state has been published.
    Dispatch {
        action: Action,
        applied: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Owns the screen state and runs it as a single event loop.
#[derive(Debug)]
pub struct ScreenController {
    api: Arc<dyn WeatherApi>,
    store: Arc<dyn KeyValueStore>,
    settings: ScreenSettings,
}

impl ScreenController {
    pub fn new(
        api: Arc<dyn WeatherApi>,
        store: Arc<dyn KeyValueStore>,
        settings: ScreenSettings,
    ) -> Self {
        Self {
            api,
            store,
            settings,
        }
    }

    /// Activate the screen: loads the initial forecast and starts accepting input.
    ///
    /// The loop stops on [`ScreenHandle::shutdown`] or once every handle is dropped;
    /// pending writes of the remembered city finish before it does.
    pub fn spawn(self) -> (ScreenHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(ScreenState::new());

        let task = tokio::spawn(self.run(commands_rx, state_tx));
        let handle = ScreenHandle {
            commands: commands_tx,
            state: state_rx,
        };

        (handle, task)
    }

    async fn run(self, mut commands: mpsc::Receiver<Command>, state_tx: watch::Sender<ScreenState>) {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut tasks = LoopTasks {
            events: events_tx,
            debouncer: Debouncer::new(self.settings.debounce),
            writes: JoinSet::new(),
        };
        let mut state = ScreenState::new();

        let city = self.startup_city().await;
        info!(%city, "screen activated");
        self.apply(Action::Startup { city }, &mut state, &state_tx, &mut tasks);

        loop {
            let (action, applied) = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Dispatch { action, applied }) => (action, Some(applied)),
                    Some(Command::Shutdown) | None => break,
                },
                Some(action) = events.recv() => (action, None),
            };

            self.apply(action, &mut state, &state_tx, &mut tasks);
            if let Some(applied) = applied {
                let _ = applied.send(());
            }
            while tasks.writes.try_join_next().is_some() {}
        }

        tasks.debouncer.cancel();
        while tasks.writes.join_next().await.is_some() {}
        debug!("screen loop stopped");
    }

    async fn startup_city(&self) -> String {
        match self.store.get(LAST_CITY_KEY).await {
            Ok(Some(city)) if !city.trim().is_empty() => city,
            Ok(_) => self.settings.default_city.clone(),
            Err(e) => {
                warn!(error = %e, "could not read remembered city, using default");
                self.settings.default_city.clone()
            }
        }
    }

    fn apply(
        &self,
        action: Action,
        state: &mut ScreenState,
        state_tx: &watch::Sender<ScreenState>,
        tasks: &mut LoopTasks,
    ) {
        let effects = state.reduce(action, &self.settings);

        state_tx.send_if_modified(|published| {
            if *published == *state {
                false
            } else {
                *published = state.clone();
                true
            }
        });

        for effect in effects {
            self.execute(effect, tasks);
        }
    }

    fn execute(&self, effect: Effect, tasks: &mut LoopTasks) {
        let events = &tasks.events;
        match effect {
            Effect::ScheduleSearch { rev } => {
                let events = events.clone();
                tasks.debouncer.schedule(async move {
                    let _ = events.send(Action::SearchTimerFired { rev });
                });
            }

            Effect::CancelScheduledSearch => tasks.debouncer.cancel(),

            Effect::Search { seq, query } => {
                let api = Arc::clone(&self.api);
                let events = events.clone();
                tokio::spawn(async move {
                    let result = api.search_locations(&query).await.map_err(|e| format!("{e:#}"));
                    if let Err(message) = &result {
                        warn!(%query, error = %message, "location search failed");
                    }
                    let _ = events.send(Action::SearchResultsLoaded { seq, result });
                });
            }

            Effect::FetchForecast {
                seq,
                city,
                remember,
            } => {
                let api = Arc::clone(&self.api);
                let events = events.clone();
                let days = self.settings.forecast_days;
                tokio::spawn(async move {
                    let result = api.get_forecast(&city, days).await.map_err(|e| format!("{e:#}"));
                    if let Err(message) = &result {
                        warn!(%city, error = %message, "forecast fetch failed");
                    }
                    let _ = events.send(Action::ForecastLoaded {
                        seq,
                        city,
                        remember,
                        result,
                    });
                });
            }

            Effect::RememberCity(city) => {
                let store = Arc::clone(&self.store);
                tasks.writes.spawn(async move {
                    if let Err(e) = store.set(LAST_CITY_KEY, &city).await {
                        warn!(%city, error = %e, "could not remember city");
                    }
                });
            }
        }
    }
}

/// Work the loop has started and still owns.
struct LoopTasks {
    events: mpsc::UnboundedSender<Action>,
    debouncer: Debouncer,
    writes: JoinSet<()>,
}

/// Cloneable input side of a running screen.
///
/// Each input method returns once the loop has applied the action, so
/// [`state`](Self::state) already reflects it.
#[derive(Debug, Clone)]
pub struct ScreenHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ScreenState>,
}

impl ScreenHandle {
    pub async fn query_changed(&self, text: impl Into<String>) -> Result<()> {
        self.dispatch(Action::QueryChanged(text.into())).await
    }

    pub async fn select_city(&self, candidate: CityCandidate) -> Result<()> {
        self.dispatch(Action::CitySelected(candidate)).await
    }

    pub async fn toggle_search(&self) -> Result<()> {
        self.dispatch(Action::ToggleSearch).await
    }

    /// Re-request the forecast for the city last asked for.
    pub async fn retry(&self) -> Result<()> {
        self.dispatch(Action::Retry).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    /// Current state.
    pub fn state(&self) -> ScreenState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState> {
        self.state.clone()
    }

    /// Wait until the published state satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&ScreenState) -> bool) -> Result<ScreenState> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(predicate)
            .await
            .map_err(|_| anyhow!("screen controller has stopped"))?;
        Ok(state.clone())
    }

    async fn dispatch(&self, action: Action) -> Result<()> {
        let (applied, done) = oneshot::channel();
        self.send(Command::Dispatch { action, applied }).await?;
        done.await.map_err(|_| anyhow!("screen controller has stopped"))
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("screen controller has stopped"))
    }
}
