pub mod coordinates;
pub mod poi;
pub mod route;

pub use coordinates::Coordinates;
pub use poi::{Poi, PoiCategory};
pub use route::{
    Candidate, ExportRequest, MapsLinkResponse, Preference, PreferenceSet, RouteRequest,
    RouteResponse, RouteShape, SynthesisResult, SynthesisStatus,
};
