use std::sync::Arc;

use glam::{Mat4, Vec3};
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::attributes::{Attribute, AttributeKind};
use crate::error::{FresnelError, Result};
use crate::fresnel::{Falloff, FresnelEvaluator, FresnelParams, SurfaceSample};

/// Value written to or read from a node attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Float(f32),
    Vector(Vec3),
    Matrix(Mat4),
}

impl AttributeValue {
    fn kind(&self) -> AttributeKind {
        match self {
            Self::Float(_) => AttributeKind::Float,
            Self::Vector(_) => AttributeKind::Point,
            Self::Matrix(_) => AttributeKind::Matrix,
        }
    }
}

/// Result of a successful output request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputValue {
    Color(Vec3),
    Channel(f32),
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeState {
    params: FresnelParams,
    sample: SurfaceSample,
}

/// Thread-safe attribute store for a single fresnel node.
///
/// Clones share the same underlying values, so one thread can tweak
/// parameters while render threads keep pulling outputs.
#[derive(Debug, Default)]
pub struct FresnelNode {
    state: Arc<RwLock<NodeState>>,
}

impl Clone for FresnelNode {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl FresnelNode {
    /// Creates a node holding the default attribute values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: FresnelParams) -> Self {
        Self {
            state: Arc::new(RwLock::new(NodeState {
                params,
                sample: SurfaceSample::default(),
            })),
        }
    }

    /// Returns a snapshot of the configured parameters.
    pub fn params(&self) -> FresnelParams {
        self.state.read().params
    }

    /// Returns the stored per-sample geometry.
    pub fn sample(&self) -> SurfaceSample {
        self.state.read().sample
    }

    pub fn set_sample(&self, sample: SurfaceSample) {
        self.state.write().sample = sample;
    }

    pub fn set_front(&self, front: f32) {
        self.state.write().params.front = limit(Attribute::Front, front);
    }

    pub fn set_side(&self, side: f32) {
        self.state.write().params.side = limit(Attribute::Side, side);
    }

    pub fn set_noise(&self, noise: f32) {
        self.state.write().params.noise = limit(Attribute::Noise, noise);
    }

    pub fn set_side_color(&self, color: Vec3) {
        self.state.write().params.side_color = color;
    }

    pub fn set_front_color(&self, color: Vec3) {
        self.state.write().params.front_color = color;
    }

    /// Writes an attribute by long or short name.
    pub fn set_attribute(&self, name: &str, value: AttributeValue) -> Result<()> {
        let attribute = Attribute::from_name(name)
            .ok_or_else(|| FresnelError::UnknownAttribute(name.to_string()))?;
        self.set(attribute, value)
    }

    pub fn set(&self, attribute: Attribute, value: AttributeValue) -> Result<()> {
        if attribute.is_output() {
            return Err(FresnelError::ReadOnly(attribute));
        }
        let value = match value {
            AttributeValue::Float(v) => AttributeValue::Float(limit(attribute, v)),
            other => other,
        };

        let mut state = self.state.write();
        match (attribute, value) {
            (Attribute::Front, AttributeValue::Float(v)) => state.params.front = v,
            (Attribute::Side, AttributeValue::Float(v)) => state.params.side = v,
            (Attribute::Noise, AttributeValue::Float(v)) => state.params.noise = v,
            (Attribute::SideColor, AttributeValue::Vector(v)) => state.params.side_color = v,
            (Attribute::FrontColor, AttributeValue::Vector(v)) => state.params.front_color = v,
            (Attribute::InPoint, AttributeValue::Vector(v)) => state.params.in_point = v,
            (Attribute::NormalCamera, AttributeValue::Vector(v)) => state.sample.normal = v,
            (Attribute::PointCamera, AttributeValue::Vector(v)) => state.sample.point = v,
            (Attribute::InMatrix, AttributeValue::Matrix(m)) => state.params.in_matrix = m,
            (Attribute::MatrixEyeToWorld, AttributeValue::Matrix(m)) => {
                state.params.eye_to_world = m
            }
            _ => {
                return Err(FresnelError::KindMismatch {
                    attribute,
                    expected: attribute.kind(),
                    actual: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Reads the current value of an input attribute. Outputs are computed
    /// through [`FresnelNode::compute`] instead.
    pub fn get(&self, attribute: Attribute) -> Result<AttributeValue> {
        let state = self.state.read();
        let value = match attribute {
            Attribute::Front => AttributeValue::Float(state.params.front),
            Attribute::Side => AttributeValue::Float(state.params.side),
            Attribute::Noise => AttributeValue::Float(state.params.noise),
            Attribute::SideColor => AttributeValue::Vector(state.params.side_color),
            Attribute::FrontColor => AttributeValue::Vector(state.params.front_color),
            Attribute::InPoint => AttributeValue::Vector(state.params.in_point),
            Attribute::NormalCamera => AttributeValue::Vector(state.sample.normal),
            Attribute::PointCamera => AttributeValue::Vector(state.sample.point),
            Attribute::InMatrix => AttributeValue::Matrix(state.params.in_matrix),
            Attribute::MatrixEyeToWorld => AttributeValue::Matrix(state.params.eye_to_world),
            Attribute::OutColor
            | Attribute::OutColorR
            | Attribute::OutColorG
            | Attribute::OutColorB => return Err(FresnelError::IrrelevantRequest(attribute)),
        };
        Ok(value)
    }

    /// Computes the requested plug from the stored sample.
    pub fn compute(&self, plug: &str) -> Result<OutputValue> {
        let sample = self.sample();
        self.compute_with(plug, &sample)
    }

    /// Computes the requested plug for a caller supplied sample, leaving the
    /// stored sample untouched.
    pub fn compute_with(&self, plug: &str, sample: &SurfaceSample) -> Result<OutputValue> {
        let attribute = output_plug(plug)?;
        let color = self.evaluator().evaluate(sample);
        Ok(select(attribute, color))
    }

    /// Like [`FresnelNode::compute_with`] but also returns the intermediates.
    pub fn compute_detailed(
        &self,
        plug: &str,
        sample: &SurfaceSample,
    ) -> Result<(OutputValue, Falloff)> {
        let attribute = output_plug(plug)?;
        let falloff = self.evaluator().evaluate_detailed(sample);
        Ok((select(attribute, falloff.color), falloff))
    }

    /// Snapshot evaluator; later attribute writes do not affect it.
    pub fn evaluator(&self) -> FresnelEvaluator {
        FresnelEvaluator::new(self.params())
    }
}

/// Clamps a float write to the attribute's declared range.
fn limit(attribute: Attribute, value: f32) -> f32 {
    let Some((min, max)) = attribute.range() else {
        return value;
    };
    let limited = value.clamp(min, max);
    if limited != value {
        debug!(
            "{} = {value} is outside [{min}, {max}]; using {limited}",
            attribute.long_name()
        );
    }
    limited
}

fn output_plug(plug: &str) -> Result<Attribute> {
    let attribute = Attribute::from_name(plug)
        .ok_or_else(|| FresnelError::UnknownAttribute(plug.to_string()))?;
    if !attribute.is_output() {
        return Err(FresnelError::IrrelevantRequest(attribute));
    }
    Ok(attribute)
}

fn select(attribute: Attribute, color: Vec3) -> OutputValue {
    match attribute.component_index() {
        Some(index) => OutputValue::Channel(color[index]),
        None => OutputValue::Color(color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_sample(raw_dot: f32) -> SurfaceSample {
        SurfaceSample::new(Vec3::new(0.0, 0.0, raw_dot), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn out_color_and_channels_are_computed() {
        let node = FresnelNode::new();
        node.set_sample(facing_sample(1.0));
        assert_eq!(
            node.compute("outColor").unwrap(),
            OutputValue::Color(Vec3::new(0.0, 1.0, 0.0))
        );
        assert_eq!(node.compute("oc").unwrap(), node.compute("outColor").unwrap());
        assert_eq!(node.compute("outColorG").unwrap(), OutputValue::Channel(1.0));
        assert_eq!(node.compute("ocr").unwrap(), OutputValue::Channel(0.0));
    }

    #[test]
    fn input_plugs_are_irrelevant() {
        let node = FresnelNode::new();
        assert_eq!(
            node.compute("front"),
            Err(FresnelError::IrrelevantRequest(Attribute::Front))
        );
        assert_eq!(
            node.compute("normalCamera"),
            Err(FresnelError::IrrelevantRequest(Attribute::NormalCamera))
        );
        assert!(matches!(
            node.compute("outAlpha"),
            Err(FresnelError::UnknownAttribute(name)) if name == "outAlpha"
        ));
    }

    #[test]
    fn set_attribute_by_name() {
        let node = FresnelNode::new();
        node.set_attribute("fro", AttributeValue::Float(0.6)).unwrap();
        node.set_attribute("sideColor", AttributeValue::Vector(Vec3::X))
            .unwrap();
        node.set_attribute("wte", AttributeValue::Matrix(Mat4::from_scale(Vec3::splat(2.0))))
            .unwrap();
        let params = node.params();
        assert_eq!(params.front, 0.6);
        assert_eq!(params.side_color, Vec3::X);
        assert_eq!(params.eye_to_world, Mat4::from_scale(Vec3::splat(2.0)));
        assert_eq!(
            node.get(Attribute::Front).unwrap(),
            AttributeValue::Float(0.6)
        );
    }

    #[test]
    fn outputs_are_read_only() {
        let node = FresnelNode::new();
        assert_eq!(
            node.set_attribute("outColor", AttributeValue::Vector(Vec3::ONE)),
            Err(FresnelError::ReadOnly(Attribute::OutColor))
        );
        assert_eq!(
            node.get(Attribute::OutColorR),
            Err(FresnelError::IrrelevantRequest(Attribute::OutColorR))
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let node = FresnelNode::new();
        let err = node
            .set_attribute("inMatrix", AttributeValue::Float(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            FresnelError::KindMismatch {
                attribute: Attribute::InMatrix,
                expected: AttributeKind::Matrix,
                actual: AttributeKind::Float,
            }
        );
        assert!(node
            .set_attribute("bogus", AttributeValue::Float(1.0))
            .is_err());
    }

    #[test]
    fn threshold_writes_are_clamped_to_unit_range() {
        let node = FresnelNode::new();
        node.set_attribute("front", AttributeValue::Float(1e5)).unwrap();
        node.set_attribute("side", AttributeValue::Float(1e5)).unwrap();
        node.set_attribute("no", AttributeValue::Float(-3.0)).unwrap();
        let params = node.params();
        assert_eq!(params.front, 1.0);
        assert_eq!(params.side, 1.0);
        assert_eq!(params.noise, 0.0);

        node.set_front(-0.5);
        node.set_noise(7.0);
        assert_eq!(node.params().front, 0.0);
        assert_eq!(node.params().noise, 1.0);

        node.set_front(1e5);
        let sample = SurfaceSample::new(Vec3::new(0.0, 0.0, 199_999.0), Vec3::NEG_Z);
        let OutputValue::Color(color) = node.compute_with("outColor", &sample).unwrap() else {
            panic!("expected a color");
        };
        assert!(color.is_finite());
        let (_, falloff) = node
            .compute_detailed("outColor", &SurfaceSample::new(Vec3::Z, Vec3::NEG_Z))
            .unwrap();
        assert_eq!(falloff.facing, 1.0);
        assert!(falloff.color.is_finite());
    }

    #[test]
    fn attribute_values_serialize_by_variant() {
        let value = AttributeValue::Vector(Vec3::new(0.0, 1.0, 0.0));
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"Vector":[0.0,1.0,0.0]}"#);
        let decoded: AttributeValue = serde_json::from_str(r#"{"Float":0.25}"#).unwrap();
        node_accepts(decoded);
    }

    fn node_accepts(value: AttributeValue) {
        let node = FresnelNode::new();
        node.set(Attribute::Noise, value).unwrap();
        assert_eq!(node.params().noise, 0.25);
    }

    #[test]
    fn clones_share_state() {
        let node = FresnelNode::new();
        let other = node.clone();
        other.set_front_color(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(node.params().front_color, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn compute_with_leaves_stored_sample() {
        let node = FresnelNode::new();
        node.set_sample(facing_sample(1.0));
        let side = node.compute_with("outColor", &facing_sample(-1.0)).unwrap();
        assert_eq!(side, OutputValue::Color(Vec3::ZERO));
        assert_eq!(node.sample(), facing_sample(1.0));
    }

    #[test]
    fn concurrent_requests_match_serial_results() {
        let node = FresnelNode::new();
        node.set_noise(0.25);
        let samples: Vec<_> = (0..64)
            .map(|i| facing_sample(i as f32 / 32.0 - 1.0))
            .collect();
        let serial: Vec<_> = samples
            .iter()
            .map(|sample| node.compute_with("outColor", sample).unwrap())
            .collect();

        let parallel: Vec<Vec<OutputValue>> = std::thread::scope(|scope| {
            let handles: Vec<_> = samples
                .chunks(16)
                .map(|chunk| {
                    let node = node.clone();
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|sample| node.compute_with("outColor", sample).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        assert_eq!(parallel.concat(), serial);
    }

    #[test]
    fn detailed_compute_reports_falloff() {
        let node = FresnelNode::new();
        let (value, falloff) = node
            .compute_detailed("outColor", &facing_sample(0.5))
            .unwrap();
        assert_eq!(falloff.facing, 0.75);
        assert_eq!(value, OutputValue::Color(falloff.color));
    }
}
