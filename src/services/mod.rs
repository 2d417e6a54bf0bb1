pub mod elevation;
pub mod osrm;
pub mod overpass;
pub mod providers;
pub mod route_synthesizer;
