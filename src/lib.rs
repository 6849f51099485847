pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod geo;
pub mod globe;
mod hash;
pub mod ui;
