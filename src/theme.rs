use std::fmt;

use serde::Serialize;

use crate::color::Color;
use crate::error::PaletteWarning;
use crate::pipeline::assign::Assignment;
use crate::pipeline::extract::Method;
use crate::pipeline::score::QualityScore;

/// Number of ordered terminal color slots.
pub const TERMINAL_SLOTS: usize = 16;

/// The closed set of semantic roles a palette fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Background,
    Text,
    Primary,
    Secondary,
    Accent,
    /// Terminal slot 0-15 (`color0`..`color15`).
    Terminal(u8),
}

impl Role {
    /// Every role, in template order.
    pub fn all() -> impl Iterator<Item = Role> {
        [
            Role::Background,
            Role::Text,
            Role::Primary,
            Role::Secondary,
            Role::Accent,
        ]
        .into_iter()
        .chain((0..TERMINAL_SLOTS as u8).map(Role::Terminal))
    }

    pub fn name(self) -> String {
        match self {
            Role::Background => "background".to_string(),
            Role::Text => "text".to_string(),
            Role::Primary => "primary".to_string(),
            Role::Secondary => "secondary".to_string(),
            Role::Accent => "accent".to_string(),
            Role::Terminal(slot) => format!("color{slot}"),
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        Role::all().find(|role| role.name() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One color per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleColors {
    pub background: Color,
    pub text: Color,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub terminal: [Color; TERMINAL_SLOTS],
}

impl RoleColors {
    pub fn get(&self, role: Role) -> Color {
        match role {
            Role::Background => self.background,
            Role::Text => self.text,
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
            Role::Accent => self.accent,
            Role::Terminal(slot) => self.terminal[slot as usize % TERMINAL_SLOTS],
        }
    }
}

/// The durable artifact of a pipeline run: colors for every role, the quality
/// score of the candidate they came from, and the method that produced it.
///
/// Background/text contrast is at least 4.5:1; when the assigner had to fall
/// back to the neutral pair, `warnings` says so.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticPalette {
    method: Method,
    quality: QualityScore,
    text_contrast: f32,
    warnings: Vec<PaletteWarning>,
    roles: RoleColors,
}

impl SemanticPalette {
    pub fn new(
        assignment: Assignment,
        quality: QualityScore,
        method: Method,
        quality_threshold: f32,
    ) -> Self {
        let Assignment {
            roles, mut warnings, ..
        } = assignment;
        if quality.total < quality_threshold {
            warnings.push(PaletteWarning::QualityBelowThreshold {
                score: quality.total,
                threshold: quality_threshold,
            });
        }
        Self {
            method,
            quality,
            text_contrast: Color::contrast_ratio(&roles.background, &roles.text),
            warnings,
            roles,
        }
    }

    pub fn get(&self, role: Role) -> Color {
        self.roles.get(role)
    }

    pub fn roles(&self) -> &RoleColors {
        &self.roles
    }

    /// `(role, color)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Color)> + '_ {
        Role::all().map(|role| (role, self.get(role)))
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn quality(&self) -> &QualityScore {
        &self.quality
    }

    pub fn warnings(&self) -> &[PaletteWarning] {
        &self.warnings
    }

    /// WCAG contrast between background and text.
    pub fn text_contrast(&self) -> f32 {
        self.text_contrast
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
