//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.fitcoach/prompts/`)
    user_dir: Option<PathBuf>,
    /// Project default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `workdir`
    ///
    /// Looks for `.fitcoach/prompts/` and `prompts/` beneath it. Directories
    /// that do not exist are skipped.
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        let workdir = workdir.as_ref();
        debug!(?workdir, "PromptLoader::new: called");
        let user_dir = workdir.join(".fitcoach/prompts");
        let repo_dir = workdir.join("prompts");

        let user_dir_exists = user_dir.exists();
        let repo_dir_exists = repo_dir.exists();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "PromptLoader::new: checking directories"
        );

        Self {
            hbs: Self::engine(),
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
            repo_dir: if repo_dir_exists { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Prompts are plain text, so HTML escaping is turned off
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.fitcoach/prompts/{name}.pmt`
    /// 2. Project default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found on disk");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Ctx {
        name: String,
    }

    #[test]
    fn test_prompt_loader_embedded() {
        let loader = PromptLoader::embedded_only();
        let content = loader.load_template("workout-plan").unwrap();
        assert!(content.contains("AI Personal Trainer"));
    }

    #[test]
    fn test_prompt_loader_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let result = loader.load_template("nonexistent-template");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_override_wins_over_repo() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".fitcoach/prompts")).unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join(".fitcoach/prompts/greeting.pmt"), "user {{name}}").unwrap();
        std::fs::write(dir.path().join("prompts/greeting.pmt"), "repo {{name}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let out = loader.render("greeting", &Ctx { name: "Sam".to_string() }).unwrap();
        assert_eq!(out, "user Sam");
    }

    #[test]
    fn test_repo_dir_used_without_user_override() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/greeting.pmt"), "repo {{name}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let out = loader.render("greeting", &Ctx { name: "Sam".to_string() }).unwrap();
        assert_eq!(out, "repo Sam");
    }

    #[test]
    fn test_render_does_not_escape() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
        std::fs::write(dir.path().join("prompts/greeting.pmt"), "{{name}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let out = loader
            .render("greeting", &Ctx { name: "3x <30 min> & 'rest'".to_string() })
            .unwrap();
        assert_eq!(out, "3x <30 min> & 'rest'");
    }
}
