/// Icon shown next to a condition.
///
/// WeatherAPI.com reports conditions as free text; only the handful below have
/// dedicated artwork, everything else falls back to [`WeatherIcon::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    PartlyCloudy,
    ModerateRain,
    Sun,
    Cloud,
    HeavyRain,
    Mist,
    Other,
}

impl WeatherIcon {
    pub fn from_condition(text: &str) -> Self {
        match text.trim() {
            "Partly cloudy" => Self::PartlyCloudy,
            "Moderate rain" | "Patchy rain possible" | "Light rain" | "Moderate rain at times" => {
                Self::ModerateRain
            }
            "Sunny" | "Clear" => Self::Sun,
            "Overcast" | "Cloudy" => Self::Cloud,
            "Heavy rain"
            | "Heavy rain at times"
            | "Moderate or heavy freezing rain"
            | "Moderate or heavy rain shower"
            | "Moderate or heavy rain with thunder" => Self::HeavyRain,
            "Mist" => Self::Mist,
            _ => Self::Other,
        }
    }

    /// Asset file stem, e.g. `partlycloudy` for `partlycloudy.png`.
    pub fn asset_name(&self) -> &'static str {
        match self {
            Self::PartlyCloudy => "partlycloudy",
            Self::ModerateRain | Self::Other => "moderaterain",
            Self::Sun => "sun",
            Self::Cloud => "cloud",
            Self::HeavyRain => "heavyrain",
            Self::Mist => "mist",
        }
    }

    /// Single-glyph stand-in for terminals.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::PartlyCloudy => "⛅",
            Self::ModerateRain | Self::Other => "🌦",
            Self::Sun => "☀",
            Self::Cloud => "☁",
            Self::HeavyRain => "🌧",
            Self::Mist => "🌫",
        }
    }
}
