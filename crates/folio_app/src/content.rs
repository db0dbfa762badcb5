//! Portfolio content
//!
//! Everything the page displays: owner, navigation, hero copy and the
//! section entries. A default content file ships with the crate; other
//! files follow the same TOML layout.

use std::fs;
use std::path::Path;

use folio_layout::{SectionId, SectionRegistry};
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// The built-in content file
pub const DEFAULT_CONTENT: &str = include_str!("../content/portfolio.toml");

// =============================================================================
// Content Model
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PortfolioContent {
    pub owner: Owner,
    #[serde(default)]
    pub navigation: Vec<NavLink>,
    pub hero: HeroContent,
    #[serde(default)]
    pub experience: ExperienceContent,
    #[serde(default)]
    pub skills: SkillsContent,
    #[serde(default)]
    pub projects: ProjectsContent,
    #[serde(default)]
    pub contact: ContactContent,
    #[serde(default)]
    pub footer: FooterContent,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Owner {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// A header navigation entry
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NavLink {
    pub label: String,
    pub section: SectionId,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HeroContent {
    /// Title markup; `<span class="..">` wrappers keep their styling
    /// through fragmentation
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_scroll_label")]
    pub scroll_label: String,
}

fn default_scroll_label() -> String {
    "Scroll to explore".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ExperienceContent {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheading: String,
    #[serde(default)]
    pub entries: Vec<ExperienceEntry>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct SkillsContent {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheading: String,
    #[serde(default)]
    pub groups: Vec<SkillGroup>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SkillGroup {
    #[serde(default)]
    pub icon: String,
    pub category: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ProjectsContent {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheading: String,
    #[serde(default)]
    pub items: Vec<Project>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ContactContent {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub subheading: String,
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ContactLink {
    pub label: String,
    pub value: String,
    pub href: String,
}

impl ContactLink {
    /// Links leaving the site open in a new tab
    pub fn is_external(&self) -> bool {
        self.href.starts_with("http")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FooterContent {
    #[serde(default)]
    pub credit: String,
    #[serde(default)]
    pub links: Vec<FooterLink>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

// =============================================================================
// Loading
// =============================================================================

impl PortfolioContent {
    /// The content shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONTENT)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FolioError::ContentParse(e.to_string()))
    }

    /// Load content from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let content = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "content loaded");
        Ok(content)
    }

    /// Check that every navigation entry points at a section on the page
    pub fn validate(&self, sections: &SectionRegistry) -> Result<()> {
        match self
            .navigation
            .iter()
            .find(|link| !sections.contains(link.section.as_str()))
        {
            Some(link) => Err(FolioError::UnknownSection(link.section.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_content_parses() {
        let content = PortfolioContent::builtin().unwrap();
        assert_eq!(content.owner.name, "Alvinnanda Dary");
        assert_eq!(content.navigation.len(), 5);
        assert_eq!(content.navigation[0].section, "about");
        assert_eq!(content.experience.entries.len(), 4);
        assert_eq!(content.experience.entries[0].achievements.len(), 5);
        assert_eq!(content.skills.groups.len(), 6);
        assert_eq!(content.projects.items.len(), 6);
        assert_eq!(content.contact.links.len(), 4);
        assert_eq!(content.hero.tags.len(), 6);
        assert!(content.hero.title.contains("Alvinnanda"));
    }

    #[test]
    fn test_minimal_content_uses_defaults() {
        let content = PortfolioContent::from_toml_str(
            r#"
            [owner]
            name = "Ada"

            [hero]
            title = "Hello"
            "#,
        )
        .unwrap();
        assert!(content.navigation.is_empty());
        assert!(content.projects.items.is_empty());
        assert_eq!(content.hero.scroll_label, "Scroll to explore");
    }

    #[test]
    fn test_malformed_content_is_a_parse_error() {
        let err = PortfolioContent::from_toml_str("[owner]\nname = 3").unwrap_err();
        assert!(matches!(err, FolioError::ContentParse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PortfolioContent::load("/nonexistent/folio/content.toml").unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_nav_target() {
        let mut content = PortfolioContent::builtin().unwrap();
        let sections = SectionRegistry::new(["about", "skills", "projects", "experience", "contact"]).unwrap();
        assert!(content.validate(&sections).is_ok());

        content.navigation.push(NavLink {
            label: "Blog".into(),
            section: "blog".into(),
        });
        match content.validate(&sections) {
            Err(FolioError::UnknownSection(id)) => assert_eq!(id, "blog"),
            other => panic!("expected unknown section, got {other:?}"),
        }
    }

    #[test]
    fn test_external_links() {
        let content = PortfolioContent::builtin().unwrap();
        let external: Vec<_> = content
            .contact
            .links
            .iter()
            .filter(|l| l.is_external())
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(external, ["LinkedIn", "GitHub"]);
    }
}
