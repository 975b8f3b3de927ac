pub mod descriptor;
pub mod registry;

pub use descriptor::{ResourceDescriptor, ResourceDescriptorBuilder};
pub use registry::{ResourceRegistry, entity_name_for_key};

#[cfg(test)]
mod registry_test;
