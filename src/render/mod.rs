pub(crate) mod framebuffer;
pub(crate) mod pipeline;
pub(crate) mod raster;
pub(crate) mod shader;
