use serde::{Deserialize, Serialize};

/// Every plug exposed by a fresnel node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Front,
    Side,
    SideColor,
    FrontColor,
    Noise,
    NormalCamera,
    PointCamera,
    InPoint,
    InMatrix,
    MatrixEyeToWorld,
    OutColor,
    OutColorR,
    OutColorG,
    OutColorB,
}

/// Shape of the data stored behind an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Float,
    Color,
    Point,
    Matrix,
}

impl Attribute {
    pub const ALL: [Self; 14] = [
        Self::Front,
        Self::Side,
        Self::SideColor,
        Self::FrontColor,
        Self::Noise,
        Self::NormalCamera,
        Self::PointCamera,
        Self::InPoint,
        Self::InMatrix,
        Self::MatrixEyeToWorld,
        Self::OutColor,
        Self::OutColorR,
        Self::OutColorG,
        Self::OutColorB,
    ];

    /// Looks an attribute up by its long or short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.long_name() == name || attribute.short_name() == name)
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Side => "side",
            Self::SideColor => "sideColor",
            Self::FrontColor => "frontColor",
            Self::Noise => "noise",
            Self::NormalCamera => "normalCamera",
            Self::PointCamera => "pointCamera",
            Self::InPoint => "inPoint",
            Self::InMatrix => "inMatrix",
            Self::MatrixEyeToWorld => "matrixEyeToWorld",
            Self::OutColor => "outColor",
            Self::OutColorR => "outColorR",
            Self::OutColorG => "outColorG",
            Self::OutColorB => "outColorB",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Front => "fro",
            Self::Side => "sid",
            Self::SideColor => "sc",
            Self::FrontColor => "fc",
            Self::Noise => "no",
            Self::NormalCamera => "n",
            Self::PointCamera => "p",
            Self::InPoint => "ip",
            Self::InMatrix => "im",
            Self::MatrixEyeToWorld => "wte",
            Self::OutColor => "oc",
            Self::OutColorR => "ocr",
            Self::OutColorG => "ocg",
            Self::OutColorB => "ocb",
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            Self::Front | Self::Side | Self::Noise => AttributeKind::Float,
            Self::OutColorR | Self::OutColorG | Self::OutColorB => AttributeKind::Float,
            Self::SideColor | Self::FrontColor | Self::OutColor => AttributeKind::Color,
            Self::NormalCamera | Self::PointCamera | Self::InPoint => AttributeKind::Point,
            Self::InMatrix | Self::MatrixEyeToWorld => AttributeKind::Matrix,
        }
    }

    /// Compound parent of a color channel.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::OutColorR | Self::OutColorG | Self::OutColorB => Some(Self::OutColor),
            _ => None,
        }
    }

    /// Channel index within the parent color.
    pub fn component_index(self) -> Option<usize> {
        match self {
            Self::OutColorR => Some(0),
            Self::OutColorG => Some(1),
            Self::OutColorB => Some(2),
            _ => None,
        }
    }

    pub fn is_output(self) -> bool {
        self == Self::OutColor || self.parent() == Some(Self::OutColor)
    }

    /// Limits enforced on writes; values outside are clamped.
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            Self::Front | Self::Side | Self::Noise => Some((0.0, 1.0)),
            _ => None,
        }
    }

    /// Inputs supplied per shading sample rather than configured by users.
    pub fn is_per_sample(self) -> bool {
        matches!(self, Self::NormalCamera | Self::PointCamera)
    }
}
