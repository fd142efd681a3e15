//! City weather modular input.
//!
//! Resolves a city to coordinates through the geocode cache, fetches the
//! current weather and writes one event per run.

pub mod error;
pub mod events;
pub mod input;
pub mod orchestrator;
pub mod xml;

pub use error::{CityWeatherError, EmissionError};
pub use events::{
    index_weather_events_in_splunk, CityWeatherEvent, Event, EventSink, MemoryEventSink,
    XmlEventWriter,
};
pub use input::{CityWeatherInput, InputDefinition, ModularInput, Scheme, SchemeArgument, INPUT_NAME};
pub use orchestrator::{process_city_weather, ApiEndpoint};
