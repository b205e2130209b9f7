//! Leptos components.

pub mod force_graph;
pub mod pages;

pub use pages::{EdgeDetailPage, GraphPage};
