//! Renderable property sink.
//!
//! The sink is the only source of truth for a renderable's current colour:
//! targets read it back on every tick instead of caching it, so anything else
//! writing to the same renderable is picked up on the next step.

use crate::color::Rgba;

/// Handle for one renderable known to a [`PropertySink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub usize);

pub trait PropertySink {
    /// Current base colour of the renderable.
    fn color(&self, id: RenderableId) -> Rgba;

    /// Write the emissive and base colour together.
    fn set_color_properties(&mut self, id: RenderableId, emissive: Rgba, base: Rgba);

    /// Write the secondary (area light) colour.
    fn set_secondary(&mut self, id: RenderableId, color: Rgba);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderableProps {
    pub emissive: Rgba,
    pub base: Rgba,
    pub secondary: Rgba,
    pub writes: u64, // primary writes, for inspection
}

/// In-memory sink holding the properties of every renderable in a scene.
#[derive(Debug, Default, Clone)]
pub struct SceneBuffer {
    props: Vec<RenderableProps>,
}

impl SceneBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renderable(&mut self) -> RenderableId {
        self.props.push(RenderableProps::default());
        RenderableId(self.props.len() - 1)
    }

    /// Allocate `count` renderables with consecutive ids.
    pub fn add_renderables(&mut self, count: usize) -> Vec<RenderableId> {
        (0..count).map(|_| self.add_renderable()).collect()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn props(&self, id: RenderableId) -> Option<&RenderableProps> {
        self.props.get(id.0)
    }

    pub fn secondary(&self, id: RenderableId) -> Rgba {
        self.props.get(id.0).map(|p| p.secondary).unwrap_or_default()
    }

    /// Overwrite a base colour from outside the engine.
    pub fn set_external(&mut self, id: RenderableId, color: Rgba) {
        if let Some(p) = self.props.get_mut(id.0) {
            p.base = color;
            p.emissive = color;
        }
    }
}

impl PropertySink for SceneBuffer {
    fn color(&self, id: RenderableId) -> Rgba {
        self.props.get(id.0).map(|p| p.base).unwrap_or_default()
    }

    fn set_color_properties(&mut self, id: RenderableId, emissive: Rgba, base: Rgba) {
        if let Some(p) = self.props.get_mut(id.0) {
            p.emissive = emissive;
            p.base = base;
            p.writes += 1;
        }
    }

    fn set_secondary(&mut self, id: RenderableId, color: Rgba) {
        if let Some(p) = self.props.get_mut(id.0) {
            p.secondary = color;
        }
    }
}
