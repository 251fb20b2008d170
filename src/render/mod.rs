// src/render/mod.rs

//! Diagram renderers for `CircuitProgram` and a fallback chain that always
//! produces something displayable.

use crate::circuits::CircuitProgram;
use crate::core::{DiceError, Result};
use tracing::warn;

/// Returned by [`RenderChain::render_best_effort`] when every backend fails.
pub const RENDER_PLACEHOLDER: &str = "<div>Could not render circuit.</div>";

/// Default column limit for [`TextRenderer`].
pub const DEFAULT_MAX_COLUMNS: usize = 160;

/// A diagram backend.
pub trait Renderer {
    fn name(&self) -> &str;
    fn render(&self, program: &CircuitProgram) -> Result<String>;
}

/// The program's grid diagram as plain text. Refuses diagrams wider than
/// `max_columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRenderer {
    pub max_columns: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            max_columns: DEFAULT_MAX_COLUMNS,
        }
    }
}

impl Renderer for TextRenderer {
    fn name(&self) -> &str {
        "text"
    }

    fn render(&self, program: &CircuitProgram) -> Result<String> {
        let diagram = program.to_string();
        let width = diagram.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        if width > self.max_columns {
            return Err(DiceError::Render {
                message: format!("diagram is {} columns wide, limit is {}", width, self.max_columns),
            });
        }
        Ok(diagram)
    }
}

/// The text diagram escaped inside a `<pre>` block. Has no width limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn name(&self) -> &str {
        "html"
    }

    fn render(&self, program: &CircuitProgram) -> Result<String> {
        Ok(format!("<pre>{}</pre>", escape_html(&program.to_string())))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Ordered list of renderers tried until one succeeds.
pub struct RenderChain {
    backends: Vec<Box<dyn Renderer + Send + Sync>>,
}

impl RenderChain {
    pub fn new(backends: Vec<Box<dyn Renderer + Send + Sync>>) -> Self {
        Self { backends }
    }

    /// Text limited to `max_columns`, then HTML.
    pub fn standard(max_columns: usize) -> Self {
        Self::new(vec![Box::new(TextRenderer { max_columns }), Box::new(HtmlRenderer)])
    }

    /// First successful rendering, or [`RENDER_PLACEHOLDER`]. Never fails.
    pub fn render_best_effort(&self, program: &CircuitProgram) -> String {
        for backend in &self.backends {
            match backend.render(program) {
                Ok(diagram) => return diagram,
                Err(e) => warn!(backend = backend.name(), error = %e, "render backend failed"),
            }
        }
        RENDER_PLACEHOLDER.to_string()
    }
}

impl Default for RenderChain {
    fn default() -> Self {
        Self::standard(DEFAULT_MAX_COLUMNS)
    }
}
