pub mod camera;
pub mod gpu_context;
pub mod palette;
pub mod quad_pipeline;
pub mod renderer;
pub mod vertex;

pub use camera::{CameraUniform, ScreenCamera};
pub use gpu_context::GpuContext;
pub use quad_pipeline::QuadPipeline;
pub use renderer::QuadRenderer;
pub use vertex::QuadVertex;
