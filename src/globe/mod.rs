pub mod animation;
pub mod controller;
pub mod land;
pub mod projection;
pub mod renderer;
pub mod sampler;
pub mod surface;
pub mod view;

pub use controller::{Cursor, GlobeController, GlobeEvent, Hover};
pub use land::{Land, LandFeature, LandGeometry};
pub use projection::{project, unproject, visible_side, Rotation};
pub use renderer::render;
pub use sampler::{sample_all, sample_interior, DotSample};
pub use surface::{Layer, Paint, Rgb, Stroke, Surface};
pub use view::{GlobeFrame, ViewState};
