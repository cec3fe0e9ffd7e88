//! The seven fixed stages of the LLM pipeline diagram.

/// Width and height of the diagram coordinate space. Y grows downwards.
pub const DIAGRAM_WIDTH: f64 = 700.0;
pub const DIAGRAM_HEIGHT: f64 = 300.0;
pub const STAGE_RADIUS: f64 = 40.0;
pub const MARKER_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn distance(self, to: Point) -> f64 {
        ((to.x - self.x).powi(2) + (to.y - self.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    InputText,
    Tokenizer,
    EmbeddingLayer,
    AttentionMechanism,
    OutputText,
    ContextWindow,
    KnowledgeBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub from: Stage,
    pub to: Stage,
    pub kind: LineKind,
}

impl Stage {
    pub fn all() -> [Stage; 7] {
        [
            Stage::InputText,
            Stage::Tokenizer,
            Stage::EmbeddingLayer,
            Stage::AttentionMechanism,
            Stage::OutputText,
            Stage::ContextWindow,
            Stage::KnowledgeBase,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::InputText => "Input Text",
            Stage::Tokenizer => "Tokenizer",
            Stage::EmbeddingLayer => "Embedding Layer",
            Stage::AttentionMechanism => "Attention Mechanism",
            Stage::OutputText => "Output Text",
            Stage::ContextWindow => "Context Window",
            Stage::KnowledgeBase => "Knowledge Base",
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Stage::InputText => Point::new(50.0, 150.0),
            Stage::Tokenizer => Point::new(200.0, 150.0),
            Stage::EmbeddingLayer => Point::new(350.0, 150.0),
            Stage::AttentionMechanism => Point::new(500.0, 150.0),
            Stage::OutputText => Point::new(650.0, 150.0),
            Stage::ContextWindow => Point::new(350.0, 50.0),
            Stage::KnowledgeBase => Point::new(500.0, 250.0),
        }
    }

    pub fn connections() -> [Connection; 6] {
        let solid = |from, to| Connection {
            from,
            to,
            kind: LineKind::Solid,
        };
        let dashed = |from, to| Connection {
            from,
            to,
            kind: LineKind::Dashed,
        };
        [
            solid(Stage::InputText, Stage::Tokenizer),
            solid(Stage::Tokenizer, Stage::EmbeddingLayer),
            solid(Stage::EmbeddingLayer, Stage::AttentionMechanism),
            solid(Stage::AttentionMechanism, Stage::OutputText),
            dashed(Stage::EmbeddingLayer, Stage::ContextWindow),
            dashed(Stage::AttentionMechanism, Stage::KnowledgeBase),
        ]
    }
}

/// Split the segment `from`-`to` into dashes of `dash` length separated by gaps of the same length.
pub fn dashes(from: Point, to: Point, dash: f64) -> Vec<(Point, Point)> {
    let length = from.distance(to);
    if length == 0.0 || dash <= 0.0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + dash).min(length);
        segments.push((from.lerp(to, offset / length), from.lerp(to, end / length)));
        offset += 2.0 * dash;
    }
    segments
}
