//! Scene and Element Types
//!
//! A scene is the full canvas state: fixed pixel dimensions plus an ordered
//! list of drawable elements. List order is paint order, so later elements
//! are drawn over earlier ones.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::Color;
use crate::error::{Error, Result};

/// A canvas scene snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Elements in insertion (paint) order
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Scene {
    /// Create an empty scene, rejecting non-positive dimensions
    pub fn new(width: i64, height: i64) -> Result<Self> {
        Ok(Self {
            width: dimension("width", width)?,
            height: dimension("height", height)?,
            elements: Vec::new(),
        })
    }

    /// Get the number of elements
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

fn dimension(field: &str, value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(Error::invalid_dimension(format!(
            "{field} must be a positive integer, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| Error::invalid_dimension(format!("{field} is too large: {value}")))
}

/// Generation-order element identity, assigned by the scene store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A drawable element owned by a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique element ID
    pub id: ElementId,

    /// Left edge in pixels (may be negative)
    pub x: i32,

    /// Top edge in pixels (may be negative)
    pub y: i32,

    /// Variant-specific fields
    #[serde(flatten)]
    pub shape: Shape,
}

impl Element {
    /// Get the element type as a string
    #[must_use]
    pub fn element_type(&self) -> &'static str {
        self.shape.kind()
    }
}

/// Drawable element variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Shape {
    /// Filled and stroked rectangle
    Rectangle {
        /// Box width
        width: u32,
        /// Box height
        height: u32,
        /// Interior colour
        fill_color: Color,
        /// Outline colour
        stroke_color: Color,
        /// Outline width (0 = no outline)
        stroke_width: u32,
    },

    /// Circle whose bounding box starts at the element position
    Circle {
        /// Radius; the centre is at `(x + radius, y + radius)`
        radius: u32,
        /// Interior colour
        fill_color: Color,
        /// Outline colour
        stroke_color: Color,
        /// Outline width (0 = no outline)
        stroke_width: u32,
    },

    /// Single run of text; the baseline sits at `y + font_size`
    Text {
        /// Text content
        text: String,
        /// Font size in pixels
        font_size: u32,
        /// Font family name
        font_family: String,
        /// Text colour
        color: Color,
    },

    /// Raster image stretched into the target box
    Image {
        /// Target box width
        width: u32,
        /// Target box height
        height: u32,
        /// Where the pixels come from
        #[serde(flatten)]
        source: ImageSource,
    },
}

impl Shape {
    /// Get the variant name
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Circle { .. } => "circle",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }

    /// Check the per-variant required fields
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rectangle { width, height, .. } => {
                positive("width", *width)?;
                positive("height", *height)
            }
            Self::Circle { radius, .. } => positive("radius", *radius),
            Self::Text {
                text, font_size, ..
            } => {
                if text.is_empty() {
                    return Err(Error::missing_field("text"));
                }
                positive("fontSize", *font_size)
            }
            Self::Image {
                width,
                height,
                source,
            } => {
                source.validate()?;
                positive("width", *width)?;
                positive("height", *height)
            }
        }
    }
}

fn positive(field: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(Error::invalid_value(field, "must be greater than zero"));
    }
    Ok(())
}

/// Pixel source of an image element; exactly one is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// PNG bytes stored with the element
    Embedded {
        /// Encoded image bytes (base64 on the wire)
        #[serde(rename = "imageData", with = "base64_bytes")]
        data: Vec<u8>,
    },

    /// Image fetched at render time
    Remote {
        /// Absolute `http(s)` or `data:` URL
        #[serde(rename = "imageUrl")]
        url: String,
    },
}

impl ImageSource {
    /// Embedded bytes source
    #[must_use]
    pub fn embedded(data: Vec<u8>) -> Self {
        Self::Embedded { data }
    }

    /// Remote URL source
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Embedded { data } if data.is_empty() => Err(Error::missing_field("image")),
            Self::Remote { url } if url.trim().is_empty() => {
                Err(Error::missing_field("imageUrl"))
            }
            _ => Ok(()),
        }
    }
}

/// An element that has not been assigned an ID yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewElement {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Variant-specific fields
    pub shape: Shape,
}

impl NewElement {
    /// Create a new element draft at a position
    #[must_use]
    pub fn new(x: i32, y: i32, shape: Shape) -> Self {
        Self { x, y, shape }
    }

    /// Rectangle with the default black fill and 1px black outline
    #[must_use]
    pub fn rectangle(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::new(
            x,
            y,
            Shape::Rectangle {
                width,
                height,
                fill_color: Color::BLACK,
                stroke_color: Color::BLACK,
                stroke_width: 1,
            },
        )
    }

    /// Circle with the default black fill and 1px black outline
    #[must_use]
    pub fn circle(x: i32, y: i32, radius: u32) -> Self {
        Self::new(
            x,
            y,
            Shape::Circle {
                radius,
                fill_color: Color::BLACK,
                stroke_color: Color::BLACK,
                stroke_width: 1,
            },
        )
    }

    /// Black 16px Arial text
    #[must_use]
    pub fn text(x: i32, y: i32, text: impl Into<String>) -> Self {
        Self::new(
            x,
            y,
            Shape::Text {
                text: text.into(),
                font_size: 16,
                font_family: "Arial".to_string(),
                color: Color::BLACK,
            },
        )
    }

    /// Image box with the given source
    #[must_use]
    pub fn image(x: i32, y: i32, width: u32, height: u32, source: ImageSource) -> Self {
        Self::new(
            x,
            y,
            Shape::Image {
                width,
                height,
                source,
            },
        )
    }

    /// Replace the fill colour of a rectangle or circle
    #[must_use]
    pub fn with_fill(mut self, color: Color) -> Self {
        if let Shape::Rectangle { fill_color, .. } | Shape::Circle { fill_color, .. } =
            &mut self.shape
        {
            *fill_color = color;
        }
        self
    }

    /// Replace the outline of a rectangle or circle
    #[must_use]
    pub fn with_stroke(mut self, color: Color, width: u32) -> Self {
        if let Shape::Rectangle {
            stroke_color,
            stroke_width,
            ..
        }
        | Shape::Circle {
            stroke_color,
            stroke_width,
            ..
        } = &mut self.shape
        {
            *stroke_color = color;
            *stroke_width = width;
        }
        self
    }

    /// Check required fields before the draft is committed
    pub fn validate(&self) -> Result<()> {
        self.shape.validate()
    }

    pub(crate) fn into_element(self, id: ElementId) -> Element {
        Element {
            id,
            x: self.x,
            y: self.y,
            shape: self.shape,
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
