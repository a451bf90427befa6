mod camera;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod util;

pub use camera::Camera;
pub use renderer::{Frame, FrameRenderer, RenderError, RenderSettings};
pub use scene::{Scene, SceneSettings};
