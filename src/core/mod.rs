//! Core transform building blocks: geometry resolution, the reference grid, identifiers
//! and orbits, property mapping, asset binding and record assembly. These are pure
//! functions over borrowed metadata, consumed by the high-level `api` module.
pub mod assets;
pub mod geometry;
pub mod grid;
pub mod ident;
pub mod item;
pub mod params;
pub mod properties;
