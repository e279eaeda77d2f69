//! The widget controller: lookup pipeline and unit toggle.
//!
//! A lookup chains geocode, current conditions and forecast, then commits
//! the result to the display in one step. Runs may overlap; each one takes a
//! sequence number when it starts and its commit is dropped if a run started
//! later has already committed, so the most recent user action wins.

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
    WidgetError,
    config::WidgetSettings,
    display::{DisplaySink, FORECAST_UNAVAILABLE},
    forecast::daily_entries,
    format::{current_view, forecast_card},
    model::{CurrentConditions, DisplayUnit, ForecastSample},
    provider::WeatherService,
};

/// How a single lookup ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Both regions rendered.
    Rendered,
    /// Current conditions rendered; the forecast region shows the unavailable message.
    ForecastUnavailable(WidgetError),
    /// Nothing rendered. Unless the input was empty, the display is cleared.
    Failed(WidgetError),
    /// A newer lookup committed first; this one left the display alone.
    Superseded,
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// Mutable state shared by lookups and the unit toggle.
#[derive(Debug, Default)]
pub struct AppState {
    unit: DisplayUnit,
    last_snapshot: Option<CurrentConditions>,
    started: u64,
    committed: u64,
}

impl AppState {
    fn begin_run(&mut self) -> u64 {
        self.started += 1;
        self.started
    }

    /// Claims the display for run `seq`; false if a later run got there first.
    fn try_commit(&mut self, seq: u64) -> bool {
        if seq < self.committed {
            return false;
        }
        self.committed = seq;
        true
    }
}

pub struct Widget<D> {
    service: Box<dyn WeatherService>,
    sink: Mutex<D>,
    state: Mutex<AppState>,
    settings: WidgetSettings,
}

impl<D: DisplaySink> Widget<D> {
    pub fn new(service: Box<dyn WeatherService>, sink: D, settings: WidgetSettings) -> Self {
        Self {
            service,
            sink: Mutex::new(sink),
            state: Mutex::new(AppState::default()),
            settings,
        }
    }

    pub fn unit(&self) -> DisplayUnit {
        self.state.lock().unit
    }

    pub fn last_snapshot(&self) -> Option<CurrentConditions> {
        self.state.lock().last_snapshot.clone()
    }

    /// Locks the display sink.
    ///
    /// Drop the guard before calling [`Widget::set_unit`] or awaiting
    /// [`Widget::fetch_weather_for`]; both lock the sink and would deadlock.
    pub fn sink(&self) -> MutexGuard<'_, D> {
        self.sink.lock()
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    /// The load-time query for the configured default city.
    pub async fn on_load(&self) -> RunOutcome {
        self.fetch_weather_for(&self.settings.default_city).await
    }

    pub async fn fetch_weather_for(&self, city: &str) -> RunOutcome {
        let city = city.trim();
        if city.is_empty() {
            debug!("ignoring empty city name");
            return RunOutcome::Failed(WidgetError::EmptyInput);
        }

        let seq = self.state.lock().begin_run();
        info!(seq, city, "looking up weather");

        match self.fetch(city).await {
            Ok((current, forecast)) => self.commit(seq, current, forecast),
            Err(err) => self.fail(seq, err),
        }
    }

    async fn fetch(
        &self,
        city: &str,
    ) -> Result<(CurrentConditions, Result<Vec<ForecastSample>, WidgetError>), WidgetError> {
        let location = self.service.geocode(city).await?;
        debug!(lat = location.latitude, lon = location.longitude, "city resolved");

        let current = self.service.current(&location).await?;
        let forecast = self.service.forecast(&location).await;

        Ok((current, forecast))
    }

    fn commit(
        &self,
        seq: u64,
        current: CurrentConditions,
        forecast: Result<Vec<ForecastSample>, WidgetError>,
    ) -> RunOutcome {
        let mut state = self.state.lock();
        if !state.try_commit(seq) {
            debug!(seq, committed = state.committed, "dropping superseded lookup");
            return RunOutcome::Superseded;
        }

        let unit = state.unit;
        let mut sink = self.sink.lock();

        let current_result = self.render_current(&mut *sink, &current, unit);
        state.last_snapshot = Some(current);

        let forecast_result = match forecast {
            Ok(samples) => self.render_forecast(&mut *sink, &samples, unit),
            Err(err) => {
                warn!(error = %err, "forecast lookup failed");
                if let Err(render_err) = sink.set_forecast_unavailable(FORECAST_UNAVAILABLE) {
                    warn!(error = %render_err, "failed to mark forecast unavailable");
                }
                Err(err)
            }
        };

        info!(seq, "lookup committed");
        match (current_result, forecast_result) {
            (Err(err), _) => RunOutcome::Failed(err),
            (Ok(()), Err(err)) => RunOutcome::ForecastUnavailable(err),
            (Ok(()), Ok(())) => RunOutcome::Rendered,
        }
    }

    fn fail(&self, seq: u64, err: WidgetError) -> RunOutcome {
        let mut state = self.state.lock();
        if !state.try_commit(seq) {
            debug!(seq, error = %err, "dropping failure of superseded lookup");
            return RunOutcome::Superseded;
        }

        warn!(seq, error = %err, "lookup failed");
        state.last_snapshot = None;

        let mut sink = self.sink.lock();
        if let Err(render_err) = sink.clear_all() {
            warn!(error = %render_err, "failed to clear display");
        }
        sink.notify_error(&err.user_message());

        RunOutcome::Failed(err)
    }

    /// Writes every current-conditions slot; falls back to the cleared state
    /// if any write fails.
    fn render_current(
        &self,
        sink: &mut D,
        conditions: &CurrentConditions,
        unit: DisplayUnit,
    ) -> Result<(), WidgetError> {
        let view = current_view(conditions, unit, &self.settings.icon_url);

        let written = view
            .fields
            .iter()
            .try_for_each(|(slot, value)| sink.set_field(*slot, value))
            .and_then(|()| sink.set_icon(view.icon.as_ref()));

        if let Err(err) = written {
            warn!(error = %err, "rendering current conditions failed");
            if let Err(clear_err) = sink.clear_all() {
                warn!(error = %clear_err, "failed to clear display");
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn render_forecast(
        &self,
        sink: &mut D,
        samples: &[ForecastSample],
        unit: DisplayUnit,
    ) -> Result<(), WidgetError> {
        let cards: Vec<_> = daily_entries(samples, self.settings.zone)
            .iter()
            .map(|entry| forecast_card(entry, unit, &self.settings.icon_url))
            .collect();

        if let Err(err) = sink.set_forecast_list(&cards) {
            warn!(error = %err, "rendering forecast failed");
            if let Err(fallback_err) = sink.set_forecast_unavailable(FORECAST_UNAVAILABLE) {
                warn!(error = %fallback_err, "failed to mark forecast unavailable");
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Switches the active unit. Re-renders current conditions from the last
    /// snapshot without touching the network or the forecast region.
    ///
    /// Returns false when `unit` is already active.
    pub fn set_unit(&self, unit: DisplayUnit) -> bool {
        let mut state = self.state.lock();
        if state.unit == unit {
            return false;
        }
        state.unit = unit;
        debug!(%unit, "unit changed");

        let mut sink = self.sink.lock();
        if let Err(err) = sink.set_unit_toggle(unit) {
            warn!(error = %err, "failed to update unit toggle");
        }

        if let Some(snapshot) = &state.last_snapshot {
            if let Err(err) = self.render_current(&mut *sink, snapshot, unit) {
                debug!(error = %err, "unit re-render fell back to the cleared state");
            }
        }
        true
    }
}

impl<D> std::fmt::Debug for Widget<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("service", &self.service)
            .field("state", &*self.state.lock())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
