//! Camera independent fresnel shading.
//!
//! The blend between a front and a side color is driven by explicitly
//! supplied transforms instead of the renderer's active camera, so the same
//! falloff can be reproduced from any viewpoint. [`FresnelEvaluator`] is the
//! pure per-sample computation; [`FresnelNode`] wraps it in a thread-safe
//! attribute store that answers plug requests the way a host shading network
//! does.

pub mod attributes;
pub mod error;
pub mod fresnel;
pub mod node;
pub mod scene;

pub use attributes::{Attribute, AttributeKind};
pub use error::FresnelError;
pub use fresnel::{
    evaluate, host_rows, matrix_from_host_rows, Falloff, FresnelEvaluator, FresnelParams,
    SurfaceSample, Thresholds, SIDE_EPSILON,
};
pub use node::{AttributeValue, FresnelNode, OutputValue};
pub use scene::{FresnelScene, NodeDescription};
