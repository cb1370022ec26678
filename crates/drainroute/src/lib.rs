//! Routing of drainage pipe traces through rectilinear corridor plans.
//!
//! Given a planar decomposition of admissible corridor regions, a catalog of
//! pipe objects, and a set of water sources draining into one destination
//! (stack), the crate computes a tree-shaped trace of straight pipe segments
//! rooted at the destination. Sources are connected greedily in descending
//! diameter order; each connection follows the shortest clearance-respecting
//! polyline through the corridor graph.
//!
//! The main pieces:
//!
//! - [`graph::CorridorGraph`] — the planar corridor subdivision with
//!   edge-sharing adjacency, water-connection attachment, and multi-source
//!   node separation;
//! - [`route::RouteBuilder`] — the greedy per-source route construction;
//! - [`track::PipeTrack`] — the resulting flat tree of laid pipe segments;
//! - [`catalog::Catalog`] — available pipe objects and external diameters;
//! - [`cli::Cli`] — the command-line pipeline over the `InputData` /
//!   `OutputData` directory layout.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod connections;
pub mod csv;
pub mod decisions;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod params;
pub mod route;
pub mod sink;
pub mod track;

pub use error::{Error, Result};
