//! `landpermit-engine` - valuation engine for the land-transfer permit form.
//!
//! Holds the in-memory form model, derives land/fixture valuations and
//! totals from it, and propagates every input change to the fields that
//! depend on it. Presentation layers read and write through
//! [`surface::FormSurface`]; lookups arrive as already-resolved payloads.

pub mod area;
pub mod describe;
pub mod display;
pub mod error;
pub mod events;
pub mod field;
pub mod form;
pub mod generation;
pub mod report;
pub mod session;
pub mod surface;
pub mod sync;
pub mod valuation;

pub use area::{parse_area, AreaFraction};
pub use error::EngineError;
pub use field::FieldKey;
pub use form::{FormAggregate, Parcel};
pub use generation::Generation;
pub use landpermit_config::ValuationMode;
pub use session::{Applied, FormSession, LandBundle, RecoveryNote};
pub use sync::{ChangeSet, FieldHint, FieldWrite};
pub use valuation::{compute_aggregate, compute_parcel, ParcelValuation};
