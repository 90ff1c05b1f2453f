//! Generator registry - resolves configured generator names

use crate::base::{EchoGenerator, Generator, ProviderError, ProviderResult};
use crate::local_rules::LocalRulesGenerator;
use std::sync::Arc;

/// Names accepted by [`build_generator`]
pub const GENERATOR_NAMES: &[&str] = &["local-rules", "echo"];

/// Create the generator registered under `name`
pub fn build_generator(name: &str) -> ProviderResult<Arc<dyn Generator>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "local-rules" | "local_rules" | "local" => Ok(Arc::new(LocalRulesGenerator::new())),
        "echo" => Ok(Arc::new(EchoGenerator)),
        _ => Err(ProviderError::UnknownGenerator {
            name: name.to_string(),
            available: GENERATOR_NAMES.join(", "),
        }),
    }
}
