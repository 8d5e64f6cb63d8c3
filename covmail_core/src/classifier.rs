//! Template registry and message classification.

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{Error, Result};
use crate::message::RawMessage;
use crate::template::{Template, TemplateDef, TemplateKind};

static BUILTIN: Lazy<std::result::Result<TemplateRegistry, String>> = Lazy::new(|| {
    let defs: Vec<TemplateDef> = TemplateKind::ALL
        .iter()
        .map(|kind| *kind.definition())
        .collect();
    TemplateRegistry::new(&defs).map_err(|e| e.to_string())
});

/// Outcome of running every identification predicate over one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationResult<'r> {
    Matched(&'r Template),
    NoMatch,
    /// Two or more templates claimed the message. Marker patterns overlap;
    /// this is a template-authoring defect, never resolved by picking one.
    Ambiguous(Vec<&'static str>),
}

impl ClassificationResult<'_> {
    #[must_use]
    pub const fn template_id(&self) -> Option<&'static str> {
        match self {
            Self::Matched(template) => Some(template.type_id()),
            Self::NoMatch | Self::Ambiguous(_) => None,
        }
    }
}

/// Read-only set of compiled templates.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Compile `defs` into a registry.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if any definition is malformed or two
    /// definitions share a type id.
    pub fn new(defs: &[TemplateDef]) -> Result<Self> {
        let mut templates: Vec<Template> = Vec::with_capacity(defs.len());

        for def in defs {
            if templates.iter().any(|t| t.type_id() == def.type_id) {
                return Err(Error::Configuration(format!(
                    "duplicate template id: {}",
                    def.type_id
                )));
            }
            templates.push(Template::compile(def)?);
        }

        Ok(Self { templates })
    }

    /// The built-in templates, compiled once per process.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if a built-in pattern fails to compile.
    pub fn builtin() -> Result<&'static Self> {
        BUILTIN.as_ref().map_err(|e| Error::Configuration(e.clone()))
    }

    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    #[must_use]
    pub fn get(&self, type_id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.type_id() == type_id)
    }

    /// Identification result of every template, in registration order.
    #[must_use]
    pub fn identification_results(&self, body: &str) -> Vec<(&'static str, bool)> {
        self.templates
            .iter()
            .map(|t| (t.type_id(), t.identify(body)))
            .collect()
    }

    /// Resolve exactly one template for `message`.
    #[must_use]
    pub fn classify(&self, message: &RawMessage) -> ClassificationResult<'_> {
        let matches: Vec<&Template> = self
            .templates
            .iter()
            .filter(|t| t.identify(&message.body))
            .collect();

        match matches.as_slice() {
            [] => ClassificationResult::NoMatch,
            [template] => {
                debug!(
                    subject = %message.subject,
                    template = template.type_id(),
                    "message classified"
                );
                ClassificationResult::Matched(template)
            }
            many => {
                ClassificationResult::Ambiguous(many.iter().map(|t| t.type_id()).collect())
            }
        }
    }
}
