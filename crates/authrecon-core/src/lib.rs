//! AuthRecon Core: shared types, static service profiles, configuration.

pub mod config;
pub mod error;
pub mod normalize;
pub mod profile;
pub mod types;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use normalize::{Normalizer, TextNormalizer};
pub use profile::{
    full_type_id, split_type_id, ResponseFormat, ServiceMetadata, ServiceProfile,
    SourceDescriptor, TypeEntry,
};
pub use types::{Candidate, RawRecord, TypeMeta};
