use super::registry::{ModelRegistry, ModelSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_default(),
        }
    }

    /// Resolves `requested` for `capability`, falling back to the first
    /// capable model and recording why.
    pub fn select(
        &self,
        requested: Option<&str>,
        capability: &str,
    ) -> Result<ModelSelection, String> {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());
        let fallback_reason = match requested {
            Some(name) => {
                if let Some(model) = self.registry.ensure(name, capability) {
                    return Ok(ModelSelection {
                        model,
                        requested: Some(name.to_string()),
                        fallback_reason: None,
                    });
                }
                format!("Requested model '{name}' unavailable for capability '{capability}'.")
            }
            None => "No model specified; using default.".to_string(),
        };

        let Some(model) = self.registry.by_capability(capability).into_iter().next() else {
            return Err(format!(
                "No models available for capability '{capability}'."
            ));
        };
        Ok(ModelSelection {
            model,
            requested: requested.map(str::to_string),
            fallback_reason: Some(fallback_reason),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::STRUCTURED_JSON;

    use super::*;

    #[test]
    fn known_model_is_selected_without_fallback() -> Result<(), String> {
        let selection = ModelSelector::default().select(Some("gpt-4o-mini"), STRUCTURED_JSON)?;
        assert_eq!(selection.model.name, "gpt-4o-mini");
        assert!(selection.fallback_reason.is_none());
        Ok(())
    }

    #[test]
    fn unknown_or_missing_model_falls_back_to_first() -> Result<(), String> {
        let selector = ModelSelector::default();
        let unknown = selector.select(Some("mystery-9"), STRUCTURED_JSON)?;
        assert_eq!(unknown.model.name, "gemini-2.5-flash");
        assert_eq!(unknown.requested.as_deref(), Some("mystery-9"));
        assert!(unknown
            .fallback_reason
            .as_deref()
            .is_some_and(|reason| reason.contains("mystery-9")));

        let blank = selector.select(Some("  "), STRUCTURED_JSON)?;
        assert!(blank.requested.is_none());
        assert_eq!(
            blank.fallback_reason.as_deref(),
            Some("No model specified; using default.")
        );
        Ok(())
    }

    #[test]
    fn empty_registry_is_an_error() {
        let selector = ModelSelector::new(Some(ModelRegistry::from_specs([])));
        assert!(selector.select(None, STRUCTURED_JSON).is_err());
    }
}
