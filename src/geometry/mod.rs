pub(crate) mod assembly;
pub(crate) mod clip;
pub(crate) mod vertex;
