//! Content sections: scroll reveals and hover effects
//!
//! Every section below the hero reveals its cards as it scrolls into view.
//! Element names double as animation targets, so `"projects.card.2"` is both
//! the element the host lays out and the target whose state it renders.

use folio_animation::{SchedulerHandle, TargetId, VisualState};
use folio_layout::{HoverEffect, MotionDriver, RevealId};
use rustc_hash::FxHashMap;

use crate::config::{PageConfig, SectionConfig};
use crate::content::PortfolioContent;

/// Element and target names of the content sections
pub mod targets {
    pub const EXPERIENCE_LINE: &str = "experience.line";
    pub const EXPERIENCE_DOT: &str = "experience.dot";
    pub const EXPERIENCE_CARD: &str = "experience.card";
    pub const SKILL_CARD: &str = "skills.card";
    pub const PROJECT_CARD: &str = "projects.card";
    pub const CONTACT_CARD: &str = "contact.card";
    pub const CONTACT_ICON: &str = "contact.icon";
    pub const FOOTER: &str = "footer";
}

fn indexed(prefix: &str, count: usize) -> Vec<TargetId> {
    (0..count).map(|i| TargetId::indexed(prefix, i)).collect()
}

/// Reveal handles for every content section
#[derive(Clone, Debug, Default)]
pub struct SectionReveals {
    pub experience_line: Option<RevealId>,
    pub experience_dots: Option<RevealId>,
    /// One per card, each triggered by the card itself
    pub experience_cards: Vec<RevealId>,
    pub skills: Option<RevealId>,
    pub projects: Option<RevealId>,
    pub contact: Option<RevealId>,
    pub footer: Option<RevealId>,
}

impl SectionReveals {
    /// Register the reveals of all sections with a driver
    ///
    /// Sections without entries get no reveal.
    pub fn register(
        driver: &mut MotionDriver,
        content: &PortfolioContent,
        config: &PageConfig,
    ) -> Self {
        let mut out = Self::default();

        let experience = &config.experience;
        let entries = content.experience.entries.len();
        if entries > 0 {
            out.experience_line = Some(driver.add(
                "experience",
                vec![TargetId::from(targets::EXPERIENCE_LINE)],
                experience.line.spec(&experience.style),
            ));
            out.experience_dots = Some(driver.add(
                "experience",
                indexed(targets::EXPERIENCE_DOT, entries),
                experience.dots.spec(&experience.style),
            ));
            out.experience_cards = indexed(targets::EXPERIENCE_CARD, entries)
                .into_iter()
                .enumerate()
                .map(|(i, card)| {
                    let anchor = card.as_str().to_string();
                    driver.add(anchor, vec![card], experience.card_spec(i))
                })
                .collect();
        }

        out.skills = reveal_cards(
            driver,
            "skills",
            targets::SKILL_CARD,
            content.skills.groups.len(),
            &config.skills,
        );
        out.projects = reveal_cards(
            driver,
            "projects",
            targets::PROJECT_CARD,
            content.projects.items.len(),
            &config.projects,
        );
        out.contact = reveal_cards(
            driver,
            "contact",
            targets::CONTACT_CARD,
            content.contact.links.len(),
            &config.contact,
        );

        out.footer = Some(driver.add(
            "footer",
            vec![TargetId::from(targets::FOOTER)],
            config.footer.reveal.spec(&config.footer.style),
        ));

        tracing::debug!(reveals = driver.len(), "section reveals registered");
        out
    }

    /// Every registered reveal, in page order
    pub fn all(&self) -> Vec<RevealId> {
        [self.experience_line, self.experience_dots]
            .into_iter()
            .flatten()
            .chain(self.experience_cards.iter().copied())
            .chain([self.skills, self.projects, self.contact, self.footer].into_iter().flatten())
            .collect()
    }
}

fn reveal_cards(
    driver: &mut MotionDriver,
    anchor: &str,
    prefix: &str,
    count: usize,
    section: &SectionConfig,
) -> Option<RevealId> {
    if count == 0 {
        return None;
    }
    let spec = section.reveal.spec(&section.style);
    Some(driver.add(anchor, indexed(prefix, count), spec))
}

// =============================================================================
// Hover
// =============================================================================

/// Hover effects keyed by the element the pointer enters
pub struct HoverRegistry {
    effects: FxHashMap<String, HoverEffect>,
    /// Animated target to the element owning its effect
    owners: FxHashMap<TargetId, String>,
}

impl HoverRegistry {
    /// Project card and contact icon effects for the given content
    pub fn new(scheduler: &SchedulerHandle, content: &PortfolioContent) -> Self {
        let mut registry = Self {
            effects: FxHashMap::default(),
            owners: FxHashMap::default(),
        };

        for card in indexed(targets::PROJECT_CARD, content.projects.items.len()) {
            let name = card.as_str();
            let parts =
                ["image", "overlay", "button"].map(|part| TargetId::new(format!("{name}.{part}")));
            registry.insert(name, &parts, HoverEffect::project_card(scheduler.clone(), name));
        }

        for i in 0..content.contact.links.len() {
            let card = TargetId::indexed(targets::CONTACT_CARD, i);
            let icon = TargetId::indexed(targets::CONTACT_ICON, i);
            registry.insert(
                card.as_str(),
                std::slice::from_ref(&icon),
                HoverEffect::contact_icon(scheduler.clone(), icon.clone()),
            );
        }
        registry
    }

    fn insert(&mut self, element: &str, targets: &[TargetId], effect: HoverEffect) {
        for target in targets {
            self.owners.insert(target.clone(), element.to_string());
        }
        self.effects.insert(element.to_string(), effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn contains(&self, element: &str) -> bool {
        self.effects.contains_key(element)
    }

    /// Pointer entered an element; false when it has no hover effect
    pub fn enter(&mut self, element: &str) -> bool {
        match self.effects.get_mut(element) {
            Some(effect) => {
                effect.enter();
                true
            }
            None => false,
        }
    }

    pub fn leave(&mut self, element: &str) -> bool {
        match self.effects.get_mut(element) {
            Some(effect) => {
                effect.leave();
                true
            }
            None => false,
        }
    }

    pub fn is_hovered(&self, element: &str) -> bool {
        self.effects.get(element).is_some_and(|e| e.is_hovered())
    }

    /// Elements under hover
    pub fn hovered(&self) -> impl Iterator<Item = &str> + '_ {
        self.effects
            .iter()
            .filter(|(_, effect)| effect.is_hovered())
            .map(|(name, _)| name.as_str())
    }

    pub fn visual_state(&self, target: &TargetId) -> Option<VisualState> {
        let owner = self.owners.get(target)?;
        self.effects.get(owner).map(|e| e.visual_state(target))
    }

    /// Every target driven by a hover effect
    pub fn targets(&self) -> impl Iterator<Item = &TargetId> + '_ {
        self.owners.keys()
    }
}
