//! Alert discovery and wind-station enrichment.
//!
//! [`AlertPipeline`] drives one run: [`AlertSelector`] narrows the active
//! feed, then for each selected alert [`StationAggregator`] resolves zones
//! through [`ZoneResolver`], de-duplicates stations, reads them through
//! [`ObservationClient`] and keeps the ones over the wind threshold.

pub mod aggregate;
pub mod api;
pub mod observations;
pub mod pipeline;
pub mod selector;
pub mod zones;

pub use aggregate::{Aggregation, StationAggregator};
pub use api::NwsApi;
pub use observations::{ObservationClient, ObservationFailure};
pub use pipeline::{AlertPipeline, PipelineRun, PipelineSettings};
pub use selector::{AlertSelection, AlertSelector};
pub use zones::ZoneResolver;
