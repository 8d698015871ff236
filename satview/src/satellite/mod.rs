//! Satellite view and in-use reconciliation.
//!
//! GSV and GSA sentences arrive independently. [`GsvAccumulator`] turns GSV
//! groups into complete [`ViewSnapshot`]s; [`GsaResolver`] joins GSA PRN
//! lists against the latest snapshot to produce the satellites in use.
//!
//! # Components
//!
//! - [`model`] - `SatelliteRecord`, `Constellation`, `ViewSnapshot`
//! - [`gsv`] - `GsvAccumulator`
//! - [`gsa`] - `GsaResolver`

mod gsa;
mod gsv;
mod model;

pub use gsa::GsaResolver;
pub use gsv::GsvAccumulator;
pub use model::{Constellation, InUseSet, Prn, SatelliteRecord, ViewSnapshot};
