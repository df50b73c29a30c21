// Database module
// LanceDB-backed vector index over grant chunks

pub mod lancedb;

pub use lancedb::*;
