pub mod canvas;
pub mod config;
pub mod fractal;
pub mod fragments;
pub mod grid_spec;
pub mod partition;
pub mod range;
pub mod rank;
