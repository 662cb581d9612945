//! Job parameters: flat key map, typed bridge input, and the steps between them

pub mod deprecation;
pub mod keys;
pub mod mapping;
pub mod model;
pub mod normalize;
pub mod product;
pub mod raw;

pub use deprecation::DeprecationLog;
pub use mapping::{prepare_parameters, FreestyleStep, JobStep, PipelineStep, ScanFields};
pub use model::{BridgeData, BridgeInput, ScmSection};
pub use normalize::{normalize, prepare, ValidationError};
pub use product::{validate_product, ScanProduct};
pub use raw::{RawParameters, RawValue};
