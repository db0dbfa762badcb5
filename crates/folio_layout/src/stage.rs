//! Stage geometry
//!
//! The stage is a virtual canvas designed at a reference resolution. It is
//! centred in the viewport and scaled to cover it, like a background image
//! with `object-fit: cover`. Decorative objects are authored in reference
//! pixels and mapped through the stage onto the viewport.

use folio_core::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::section::SectionId;

/// Reference resolution the hero artwork is authored at
pub const REFERENCE_SIZE: Size = Size::new(1440.0, 1024.0);

/// An image placed on the stage in reference coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageObject {
    pub name: String,
    /// Centre of the object in reference pixels
    pub anchor: Point,
    /// Edge length of the (square) object in reference pixels
    pub size: f32,
    /// Section to scroll to when the object is clicked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<SectionId>,
}

impl StageObject {
    pub fn new(name: impl Into<String>, x: f32, y: f32, size: f32) -> Self {
        Self {
            name: name.into(),
            anchor: Point::new(x, y),
            size,
            target: None,
        }
    }

    pub fn linked_to(mut self, section: impl Into<SectionId>) -> Self {
        self.target = Some(section.into());
        self
    }

    /// The hero's decorative objects
    pub fn defaults() -> Vec<StageObject> {
        vec![
            StageObject::new("showcase", 1250.0, 710.0, 350.0).linked_to("projects"),
            StageObject::new("experience", 1000.0, 720.0, 175.0).linked_to("projects"),
            StageObject::new("skill", 350.0, 730.0, 600.0).linked_to("experience"),
            StageObject::new("contact", 310.0, 308.0, 95.0).linked_to("contact"),
            StageObject::new("menu", 923.0, 300.0, 348.0),
        ]
    }
}

/// The fitted stage for the current viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stage {
    reference: Size,
    viewport: Size,
    size: Size,
}

impl Stage {
    pub fn new(reference: Size) -> Self {
        Self {
            reference,
            viewport: Size::ZERO,
            size: Size::ZERO,
        }
    }

    /// Fit the stage to a viewport, covering it while keeping the aspect ratio
    pub fn fit(&mut self, viewport: Size) {
        self.viewport = viewport;
        let ratio = self.reference.aspect_ratio();
        if ratio <= 0.0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
            self.size = Size::ZERO;
            return;
        }

        self.size = if viewport.aspect_ratio() > ratio {
            Size::new(viewport.width, viewport.width / ratio)
        } else {
            Size::new(viewport.height * ratio, viewport.height)
        };
        tracing::trace!(width = self.size.width, height = self.size.height, "stage fitted");
    }

    pub fn fitted(reference: Size, viewport: Size) -> Self {
        let mut stage = Self::new(reference);
        stage.fit(viewport);
        stage
    }

    pub fn reference(&self) -> Size {
        self.reference
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Stage pixels per reference pixel
    pub fn scale(&self) -> f32 {
        if self.reference.width > 0.0 {
            self.size.width / self.reference.width
        } else {
            0.0
        }
    }

    /// Viewport x of the stage's left edge (negative when it overflows)
    pub fn left(&self) -> f32 {
        (self.viewport.width - self.size.width) / 2.0
    }

    /// Viewport y of the stage's top edge
    pub fn top(&self) -> f32 {
        (self.viewport.height - self.size.height) / 2.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.size.width, self.size.height)
    }

    /// Convert a viewport x into stage x
    pub fn to_stage_x(&self, client_x: f32) -> f32 {
        client_x - self.left()
    }

    /// Reference x as a fraction of the stage width
    pub fn fraction_x(&self, reference_x: f32) -> f32 {
        if self.reference.width > 0.0 {
            reference_x / self.reference.width
        } else {
            0.0
        }
    }

    /// Reference y as a fraction of the stage height
    pub fn fraction_y(&self, reference_y: f32) -> f32 {
        if self.reference.height > 0.0 {
            reference_y / self.reference.height
        } else {
            0.0
        }
    }

    /// Map a reference point into viewport coordinates
    pub fn to_viewport(&self, reference: Point) -> Point {
        Point::new(
            self.left() + self.fraction_x(reference.x) * self.size.width,
            self.top() + self.fraction_y(reference.y) * self.size.height,
        )
    }

    /// Viewport rect of a stage object (centre-anchored, scaled with stage width)
    pub fn place(&self, object: &StageObject) -> Rect {
        let centre = self.to_viewport(object.anchor);
        let side = self.fraction_x(object.size) * self.size.width;
        Rect::new(centre.x - side / 2.0, centre.y - side / 2.0, side, side)
    }

    /// Topmost object under a viewport point (later objects draw on top)
    pub fn hit_test<'a>(&self, objects: &'a [StageObject], point: Point) -> Option<&'a StageObject> {
        objects
            .iter()
            .rev()
            .find(|object| self.place(object).contains(point))
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(REFERENCE_SIZE)
    }
}
