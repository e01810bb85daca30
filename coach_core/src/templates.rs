//! Workout template registry.
//!
//! Template references stay opaque to the scheduling core; this registry only
//! supplies display metadata (names, durations) for the CLI, plus a built-in
//! starter set extensible from config.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display metadata for one workout template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub duration_minutes: u32,
}

/// Registry of known templates, keyed by id
#[derive(Clone, Debug)]
pub struct TemplateRegistry {
    pub templates: HashMap<String, TemplateSummary>,
}

/// Cached built-in registry - built once and reused across all operations
static DEFAULT_REGISTRY: Lazy<TemplateRegistry> = Lazy::new(build_default_registry_internal);

/// Get a reference to the cached built-in registry
pub fn default_registry() -> &'static TemplateRegistry {
    &DEFAULT_REGISTRY
}

/// Build a registry from the built-in set plus custom config entries
///
/// Custom entries override built-ins with the same id.
pub fn build_registry(custom: &[TemplateSummary]) -> TemplateRegistry {
    let mut registry = build_default_registry_internal();
    for template in custom {
        registry
            .templates
            .insert(template.id.clone(), template.clone());
    }
    registry
}

fn summary(id: &str, name: &str, category: &str, duration_minutes: u32) -> TemplateSummary {
    TemplateSummary {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        duration_minutes,
    }
}

fn build_default_registry_internal() -> TemplateRegistry {
    let builtins = [
        summary("tpl_full_body", "Full Body Strength", "strength", 60),
        summary("tpl_upper_body", "Upper Body Push/Pull", "strength", 45),
        summary("tpl_lower_body", "Lower Body Strength", "strength", 50),
        summary("tpl_conditioning", "Conditioning Circuit", "cardio", 30),
        summary("tpl_mobility", "Mobility & Recovery", "mobility", 25),
    ];

    TemplateRegistry {
        templates: builtins
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect(),
    }
}

impl TemplateRegistry {
    pub fn get(&self, id: &str) -> Option<&TemplateSummary> {
        self.templates.get(id)
    }

    /// Display name for a template id, tolerating unknown ids
    pub fn name_of(&self, id: &str) -> &str {
        self.get(id).map(|t| t.name.as_str()).unwrap_or("Unknown template")
    }

    pub fn duration_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|t| t.duration_minutes)
    }

    /// All templates, sorted by name
    pub fn iter_sorted(&self) -> Vec<&TemplateSummary> {
        let mut all: Vec<&TemplateSummary> = self.templates.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Validate the registry for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, template) in &self.templates {
            if id.is_empty() || template.id.is_empty() {
                errors.push("Template has empty ID".to_string());
            }
            if id != &template.id {
                errors.push(format!(
                    "Template key '{}' doesn't match template.id '{}'",
                    id, template.id
                ));
            }
            if template.name.is_empty() {
                errors.push(format!("Template '{}' has empty name", id));
            }
            if template.duration_minutes == 0 {
                errors.push(format!("Template '{}' has zero duration", id));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_loads() {
        let registry = default_registry();
        assert_eq!(registry.templates.len(), 5);
        assert!(registry.validate().is_empty());
    }

    #[test]
    fn test_name_of_unknown_template() {
        let registry = default_registry();
        assert_eq!(registry.name_of("tpl_full_body"), "Full Body Strength");
        assert_eq!(registry.name_of("tpl_nonexistent"), "Unknown template");
    }

    #[test]
    fn test_custom_templates_extend_and_override() {
        let custom = vec![
            summary("tpl_boxing", "Boxing Fundamentals", "cardio", 40),
            summary("tpl_full_body", "Full Body (Club Variant)", "strength", 75),
        ];
        let registry = build_registry(&custom);

        assert_eq!(registry.templates.len(), 6);
        assert_eq!(registry.name_of("tpl_boxing"), "Boxing Fundamentals");
        assert_eq!(registry.name_of("tpl_full_body"), "Full Body (Club Variant)");
        assert_eq!(registry.duration_of("tpl_full_body"), Some(75));
    }

    #[test]
    fn test_validate_flags_defects() {
        let registry = build_registry(&[summary("tpl_bad", "", "misc", 0)]);
        let errors = registry.validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_iter_sorted_by_name() {
        let registry = default_registry();
        let names: Vec<&str> = registry.iter_sorted().iter().map(|t| t.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
