//! `landpermit-recon` - Land-share reconciliation across registry sources.
//!
//! Pure engine crate: receives already-fetched lookup payloads, returns the
//! authoritative land-share area of a parcel with its provenance.
//! No HTTP or IO dependencies.

pub mod error;
pub mod lookup;
pub mod measure;
pub mod model;
pub mod registry;
pub mod source;

pub use error::ReconError;
pub use lookup::{
    AddressSelection, LandInfoLookup, Lookup, LookupKind, PriceLookup, UnitLookup, UnitSource,
    UsageLookup,
};
pub use model::{Advisory, Provenance, ReconciledArea, Recovery};
pub use registry::Pnu;
pub use source::{reconcile_parcel_area, AreaSource, DirectAreaSource, EstimatedAreaSource};
