use crate::envelope::EnvelopeStyle;

/// Static metadata describing an action.
///
/// Used by the registry for lookup and by the envelope policy to shape
/// every outcome of the action.
#[derive(Debug, Clone)]
pub struct ActionMetadata {
    /// Unique key identifying this action (e.g. `"humanitix.check_in"`).
    pub key: String,
    /// Short description of what this action does.
    pub description: String,
    /// Vendor grouping (e.g. `"humanitix"`).
    pub category: String,
    /// Envelope shaping for this action's outcomes.
    pub envelope: EnvelopeStyle,
    /// Credential keys this action reads, for documentation and discovery.
    pub required_credentials: Vec<String>,
}

impl ActionMetadata {
    /// Create metadata with the minimum required fields.
    ///
    /// The key is `"<category>.<name>"`.
    pub fn new(category: impl Into<String>, name: &str, description: impl Into<String>) -> Self {
        let category = category.into();
        Self {
            key: format!("{category}.{name}"),
            description: description.into(),
            category,
            envelope: EnvelopeStyle::default(),
            required_credentials: Vec::new(),
        }
    }

    /// Action name without the vendor prefix.
    pub fn name(&self) -> &str {
        self.key
            .strip_prefix(&self.category)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.key)
    }

    /// Set the envelope style.
    pub fn with_envelope(mut self, envelope: EnvelopeStyle) -> Self {
        self.envelope = envelope;
        self
    }

    /// Add a credential key this action requires.
    pub fn with_required_credential(mut self, credential_key: impl Into<String>) -> Self {
        self.required_credentials.push(credential_key.into());
        self
    }
}
