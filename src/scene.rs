use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use log::debug;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::attributes::{Attribute, AttributeKind};
use crate::fresnel::{matrix_from_host_rows, FresnelParams, SurfaceSample};
use crate::node::{AttributeValue, FresnelNode};

/// A set of configured fresnel nodes together with the samples to shade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FresnelScene {
    pub nodes: Vec<NodeDescription>,
}

/// One node's parameters and the samples it should be evaluated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub name: String,
    #[serde(default)]
    pub params: FresnelParams,
    #[serde(default)]
    pub samples: Vec<SurfaceSample>,
}

impl NodeDescription {
    /// Creates a live node seeded with the described parameters.
    pub fn to_node(&self) -> FresnelNode {
        FresnelNode::from_params(self.params)
    }
}

impl FresnelScene {
    /// Parses a scene description.
    ///
    /// Every `<node name="…">` element configures one node. Its child tags are
    /// attribute long or short names; `<sample>` children list the
    /// `normalCamera`/`pointCamera` pairs to shade. Matrices are 16 floats in
    /// host row-major order.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut nodes = Vec::new();

        for element in document.descendants().filter(|n| n.has_tag_name("node")) {
            let name = element
                .attribute("name")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| anyhow!("<node> is missing a name attribute"))?
                .to_string();
            let description =
                parse_node(&element, name.clone()).with_context(|| format!("in node {name}"))?;
            debug!(
                "parsed node {} with {} sample(s)",
                description.name,
                description.samples.len()
            );
            nodes.push(description);
        }

        Ok(Self { nodes })
    }

    /// Total number of samples across all nodes.
    pub fn sample_count(&self) -> usize {
        self.nodes.iter().map(|node| node.samples.len()).sum()
    }
}

fn parse_node(element: &Node<'_, '_>, name: String) -> Result<NodeDescription> {
    let node = FresnelNode::new();
    let mut samples = Vec::new();

    for child in element.children().filter(Node::is_element) {
        let tag = child.tag_name().name();
        if tag == "sample" {
            let sample = parse_sample(&child)
                .with_context(|| format!("in sample {}", samples.len()))?;
            samples.push(sample);
            continue;
        }
        let attribute = lookup(tag)?;
        if attribute.is_per_sample() {
            bail!("<{tag}> belongs inside a <sample> element");
        }
        let value = parse_value(attribute.kind(), &required_text(&child)?)
            .with_context(|| format!("invalid <{tag}>"))?;
        node.set(attribute, value)?;
    }

    Ok(NodeDescription {
        name,
        params: node.params(),
        samples,
    })
}

fn parse_sample(element: &Node<'_, '_>) -> Result<SurfaceSample> {
    let mut sample = SurfaceSample::default();
    for child in element.children().filter(Node::is_element) {
        let tag = child.tag_name().name();
        let target = match lookup(tag)? {
            Attribute::NormalCamera => &mut sample.normal,
            Attribute::PointCamera => &mut sample.point,
            _ => bail!("<{tag}> is not a per-sample attribute"),
        };
        *target = parse_vec3(&required_text(&child)?).with_context(|| format!("invalid <{tag}>"))?;
    }
    Ok(sample)
}

fn lookup(tag: &str) -> Result<Attribute> {
    let attribute =
        Attribute::from_name(tag).ok_or_else(|| anyhow!("unknown attribute <{tag}>"))?;
    if attribute.is_output() {
        bail!("<{tag}> is an output and cannot be configured");
    }
    Ok(attribute)
}

fn required_text(node: &Node<'_, '_>) -> Result<String> {
    node.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("<{}> is empty", node.tag_name().name()))
}

fn parse_value(kind: AttributeKind, text: &str) -> Result<AttributeValue> {
    Ok(match kind {
        AttributeKind::Float => AttributeValue::Float(parse_f32(text)?),
        AttributeKind::Color | AttributeKind::Point => AttributeValue::Vector(parse_vec3(text)?),
        AttributeKind::Matrix => {
            AttributeValue::Matrix(matrix_from_host_rows(&parse_floats::<16>(text)?))
        }
    })
}

fn parse_f32(text: &str) -> Result<f32> {
    text.parse::<f32>()
        .map_err(|err| anyhow!("failed to parse float {text:?}: {err}"))
}

fn parse_vec3(text: &str) -> Result<Vec3> {
    parse_floats::<3>(text).map(Vec3::from_array)
}

fn parse_floats<const N: usize>(text: &str) -> Result<[f32; N]> {
    let values = text
        .split_whitespace()
        .map(parse_f32)
        .collect::<Result<Vec<_>>>()?;
    let count = values.len();
    values
        .try_into()
        .map_err(|_| anyhow!("expected {N} components, found {count}"))
}
