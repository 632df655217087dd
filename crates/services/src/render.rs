use handlebars::Handlebars;

use crate::error::RenderError;
use crate::view::{TemplateContext, TemplateId};

const HEADER_PARTIAL: &str = include_str!("../templates/header.hbs");
const QUESTION_PARTIAL: &str = include_str!("../templates/question.hbs");
const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");

/// Turns a template id plus its context into markup.
pub trait Renderer: Send + Sync {
    /// # Errors
    ///
    /// Returns `RenderError` if the template cannot be produced.
    fn render(
        &self,
        template: TemplateId,
        context: &TemplateContext,
    ) -> Result<String, RenderError>;
}

/// Handlebars renderer for the bundled `index` and `page` templates.
///
/// Values are HTML-escaped by the registry.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    registry: Handlebars<'static>,
}

impl HtmlRenderer {
    /// Compile the bundled templates.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Template` if a bundled template fails to parse.
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_partial("header", HEADER_PARTIAL)?;
        registry.register_partial("question", QUESTION_PARTIAL)?;
        registry.register_template_string(TemplateId::Index.as_str(), INDEX_TEMPLATE)?;
        registry.register_template_string(TemplateId::Page.as_str(), PAGE_TEMPLATE)?;
        Ok(Self { registry })
    }
}

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        template: TemplateId,
        context: &TemplateContext,
    ) -> Result<String, RenderError> {
        Ok(self.registry.render(template.as_str(), context)?)
    }
}
