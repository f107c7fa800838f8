mod registry;
mod selectors;

pub use registry::{ModelRegistry, ModelSpec, STRUCTURED_JSON};
pub use selectors::{ModelSelection, ModelSelector};
