//! Event emission.
//!
//! The host reads events from stdout in its streaming XML format:
//! `<stream><event stanza=".."><time/><data/><source/><sourcetype/><index/></event>...</stream>`.
//! The `stanza` attribute ties an event to the input that produced it when
//! several inputs share one process.

use std::io::Write;

use chrono::{DateTime, Utc};
use cityweather_core::{CityRecord, WeatherReading};
use serde::Serialize;
use tracing::instrument;

use crate::error::EmissionError;
use crate::xml::escape;

/// One event handed to the host index.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub data: String,
    pub time: Option<DateTime<Utc>>,
    pub index: Option<String>,
    pub sourcetype: Option<String>,
    /// Input stanza, e.g. `city_weather_input://guanacaste`
    pub source: Option<String>,
}

impl Event {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            time: None,
            index: None,
            sourcetype: None,
            source: None,
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Empty names are treated as unset so the host default applies.
    pub fn with_index(mut self, index: &str) -> Self {
        self.index = non_empty(index);
        self
    }

    pub fn with_sourcetype(mut self, sourcetype: &str) -> Self {
        self.sourcetype = non_empty(sourcetype);
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = non_empty(source);
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Destination for emitted events.
pub trait EventSink: Send {
    /// Write one event. The event is either fully accepted or an error is returned.
    fn write_event(&mut self, event: &Event) -> Result<(), EmissionError>;
}

/// Streaming XML writer for the host's event channel.
pub struct XmlEventWriter<W: Write> {
    out: W,
    header_written: bool,
    closed: bool,
}

impl<W: Write> XmlEventWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
            closed: false,
        }
    }

    /// Finish the stream. Writes the opening tag too if no event was written.
    pub fn close(&mut self) -> Result<(), EmissionError> {
        if self.closed {
            return Ok(());
        }
        if !self.header_written {
            self.out.write_all(b"<stream>")?;
            self.header_written = true;
        }
        self.out.write_all(b"</stream>\n")?;
        self.out.flush()?;
        self.closed = true;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(event: &Event) -> String {
        let mut xml = match &event.source {
            Some(source) => format!("<event stanza=\"{}\">", escape(source)),
            None => String::from("<event>"),
        };
        if let Some(time) = event.time {
            xml.push_str(&format!(
                "<time>{}.{:03}</time>",
                time.timestamp(),
                time.timestamp_subsec_millis()
            ));
        }
        xml.push_str("<data>");
        xml.push_str(&escape(&event.data));
        xml.push_str("</data>");
        if let Some(source) = &event.source {
            xml.push_str(&format!("<source>{}</source>", escape(source)));
        }
        if let Some(sourcetype) = &event.sourcetype {
            xml.push_str(&format!("<sourcetype>{}</sourcetype>", escape(sourcetype)));
        }
        if let Some(index) = &event.index {
            xml.push_str(&format!("<index>{}</index>", escape(index)));
        }
        xml.push_str("</event>");
        xml
    }
}

impl<W: Write + Send> EventSink for XmlEventWriter<W> {
    fn write_event(&mut self, event: &Event) -> Result<(), EmissionError> {
        if self.closed {
            return Err(EmissionError::Rejected("event stream already closed".to_string()));
        }
        if !self.header_written {
            self.out.write_all(b"<stream>")?;
            self.header_written = true;
        }
        self.out.write_all(Self::render(event).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    pub events: Vec<Event>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for MemoryEventSink {
    fn write_event(&mut self, event: &Event) -> Result<(), EmissionError> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Payload of one weather event: the city identity fields plus the full
/// provider response under `weather`.
#[derive(Debug, Serialize)]
pub struct CityWeatherEvent<'a> {
    #[serde(flatten)]
    pub city: &'a CityRecord,
    pub weather: &'a WeatherReading,
}

impl<'a> CityWeatherEvent<'a> {
    pub fn new(city: &'a CityRecord, weather: &'a WeatherReading) -> Self {
        Self { city, weather }
    }
}

/// Serialize `event_data` to JSON and write it to `sink` as one event tagged
/// with `index_name`, `sourcetype` and the producing input's `source` stanza.
/// Empty tags are left for the host to fill in.
#[instrument(skip(event_data, sink), level = "debug")]
pub fn index_weather_events_in_splunk<T: Serialize + ?Sized>(
    index_name: &str,
    event_data: &T,
    sink: &mut dyn EventSink,
    sourcetype: &str,
    source: &str,
) -> Result<(), EmissionError> {
    let data = serde_json::to_string(event_data)?;
    let event = Event::new(data)
        .with_time(Utc::now())
        .with_index(index_name)
        .with_sourcetype(sourcetype)
        .with_source(source);

    sink.write_event(&event)?;
    tracing::debug!("Emitted event to index {}", index_name);
    Ok(())
}
