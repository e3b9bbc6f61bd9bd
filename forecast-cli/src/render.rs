use std::fmt::Write;

use forecast_core::{ScreenState, WeatherIcon, WeatherSnapshot};

/// Full text frame for the interactive screen.
pub fn screen(state: &ScreenState) -> String {
    let mut out = String::new();

    if state.show_search {
        let _ = writeln!(out, "search: {}", state.query);
        for (i, candidate) in state.visible_candidates().iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", i + 1, candidate.label());
        }
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "! {error} (:r to retry)");
    }

    if state.loading {
        let _ = writeln!(out, "Loading weather...");
    } else if let Some(snap) = &state.snapshot {
        out.push_str(&snapshot(snap));
    }

    out
}

/// Current conditions followed by one line per forecast day.
pub fn snapshot(snap: &WeatherSnapshot) -> String {
    let mut out = String::new();
    let current = &snap.current;
    let icon = WeatherIcon::from_condition(&current.condition.text);

    let _ = writeln!(out, "{}, {}", snap.location.name, snap.location.country);
    let _ = writeln!(out, "{} {}°  {}", icon.glyph(), current.temp_c, current.condition.text);
    let _ = writeln!(
        out,
        "wind {} km   humidity {} %   sunrise {}",
        current.wind_kph,
        current.humidity,
        snap.sunrise().unwrap_or("-"),
    );

    if !snap.days().is_empty() {
        let _ = writeln!(out, "Daily forecast");
    }
    for day in snap.days() {
        let icon = WeatherIcon::from_condition(&day.day.condition.text);
        let _ = writeln!(
            out,
            "  {:<10} {} {}°",
            day.weekday_name(),
            icon.glyph(),
            day.day.avgtemp_c
        );
    }

    out
}
