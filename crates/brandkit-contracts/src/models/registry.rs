use indexmap::IndexMap;

/// Capability tag for models that can return schema-constrained JSON.
pub const STRUCTURED_JSON: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
    pub context_window: Option<u64>,
}

impl ModelSpec {
    pub fn new(name: &str, provider: &str, capabilities: &[&str], context_window: Option<u64>) -> Self {
        Self {
            name: name.to_string(),
            provider: provider.to_string(),
            capabilities: capabilities.iter().map(|item| (*item).to_string()).collect(),
            context_window,
        }
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Known completion models in preference order. The first model supporting a
/// capability is the default for it.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn from_specs(specs: impl IntoIterator<Item = ModelSpec>) -> Self {
        Self {
            models: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        self.get(name)
            .filter(|model| model.supports(capability))
            .cloned()
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    [
        ModelSpec::new("gemini-2.5-flash", "gemini", &["text", STRUCTURED_JSON], Some(1_048_576)),
        ModelSpec::new("gemini-2.5-pro", "gemini", &["text", STRUCTURED_JSON], Some(1_048_576)),
        ModelSpec::new("gpt-4o-mini", "openai", &["text", STRUCTURED_JSON], Some(128_000)),
        ModelSpec::new("gpt-4o", "openai", &["text", STRUCTURED_JSON], Some(128_000)),
        ModelSpec::new("dryrun-text-1", "dryrun", &["text", STRUCTURED_JSON], Some(8192)),
    ]
    .into_iter()
    .map(|spec| (spec.name.clone(), spec))
    .collect()
}
