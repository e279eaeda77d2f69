use std::io::{self, Write};

use weather_widget_core::{DisplayUnit, ForecastRegion, MemorySink, Slot};

/// Paints the sink's current state, then flushes queued notifications.
pub fn paint(sink: &mut MemorySink, out: &mut impl Write) -> io::Result<()> {
    for alert in sink.take_alerts() {
        writeln!(out, "!! {alert}")?;
    }

    let field = |slot| sink.field(slot).unwrap_or("");

    writeln!(out)?;
    writeln!(out, "  {}    {}", field(Slot::City), toggles(sink.active_unit()))?;
    writeln!(out, "  {}  {}", field(Slot::Temperature), field(Slot::Description))?;
    writeln!(
        out,
        "  Feels like {} | Humidity {} | Wind {}",
        field(Slot::FeelsLike),
        field(Slot::Humidity),
        field(Slot::WindSpeed)
    )?;
    if let Some(icon) = sink.icon() {
        writeln!(out, "  Icon: {} ({})", icon.url, icon.alt)?;
    }

    match sink.forecast() {
        ForecastRegion::Cards(cards) if cards.is_empty() => {}
        ForecastRegion::Cards(cards) => {
            writeln!(out)?;
            writeln!(out, "  Forecast")?;
            for card in cards {
                writeln!(
                    out,
                    "  {:<12} {:>6}  {:<24} {}",
                    card.date_label, card.temperature, card.description, card.icon.url
                )?;
            }
        }
        ForecastRegion::Unavailable(message) => {
            writeln!(out)?;
            writeln!(out, "  {message}")?;
        }
    }
    writeln!(out)?;
    out.flush()
}

fn toggles(active: DisplayUnit) -> String {
    DisplayUnit::all()
        .iter()
        .map(|unit| {
            let symbol = unit.symbol();
            if *unit == active { format!("[{symbol}]") } else { format!(" {symbol} ") }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_widget_core::DisplaySink;

    #[test]
    fn toggles_mark_active_unit() {
        assert_eq!(toggles(DisplayUnit::Celsius), "[°C]  °F ");
        assert_eq!(toggles(DisplayUnit::Fahrenheit), " °C  [°F]");
    }

    #[test]
    fn paint_cleared_state_with_alert() {
        let mut sink = MemorySink::new();
        sink.clear_all().unwrap();
        sink.notify_error("Error: City not found");

        let mut out = Vec::new();
        paint(&mut sink, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("!! Error: City not found\n"));
        assert!(text.contains("Weather Unavailable"));
        assert!(text.contains("Feels like --°C | Humidity --% | Wind -- km/h"));
        assert!(!text.contains("Forecast"));
        assert!(sink.alerts().is_empty());
    }

    #[test]
    fn paint_unavailable_forecast() {
        let mut sink = MemorySink::new();
        sink.set_forecast_unavailable("Forecast data unavailable").unwrap();

        let mut out = Vec::new();
        paint(&mut sink, &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().contains("Forecast data unavailable"));
    }
}
