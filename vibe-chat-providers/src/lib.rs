//! Response generators for vibe-chat
//!
//! A generator turns a (styled) prompt plus the conversation so far into a
//! raw reply. Generators are selected by name at construction time.

pub mod base;
pub mod local_rules;
pub mod registry;

pub use base::{EchoGenerator, Generator, ProviderError, ProviderResult};
pub use local_rules::{category_of_reply, classify, Category, LocalRulesGenerator};
pub use registry::{build_generator, GENERATOR_NAMES};
