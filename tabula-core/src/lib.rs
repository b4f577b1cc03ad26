//! # Tabula Core
//!
//! Core library for the Tabula start-page dashboard.
//! Provides the command registry, query resolver, suggestion engine,
//! configuration, and the greeting/clock/weather/tile dashboard models.

pub mod clock;
pub mod config;
pub mod error;
pub mod greeting;
pub mod query;
pub mod registry;
pub mod suggest;
pub mod tiles;
pub mod weather;

// Re-export commonly used types at the crate root.
pub use config::{StyleConfig, TabulaConfig, WeatherSettings};
pub use error::{ConfigError, Result, SuggestError, TabulaError, WeatherError};
pub use query::{QueryDescriptor, QueryIdentity, Resolver};
pub use registry::{CommandDescriptor, CommandRegistry};
pub use suggest::{
    DuckDuckGoSource, MatchSpan, StaticSource, SuggestionBatch, SuggestionEngine, SuggestionItem,
    SuggestionSource,
};
pub use tiles::{Tile, TileLink};
pub use weather::{OpenWeatherMap, WeatherProvider, WeatherReport};
