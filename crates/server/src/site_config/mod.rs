//! Typed site configuration decoded from flat settings.
//!
//! Site settings are stored as flat `(key, value, type)` rows. Page-facing
//! configuration is grouped into a closed set of [`Namespace`]s, each with a
//! compile-time field list:
//!
//! ```text
//! about_title      = "\"Who we are\""   (string)  ─┐
//! about_show_team  = "\"false\""        (string)   ├─> AboutSettings { title, show_team, stats, .. }
//! about_stats      = "[{..}]"           (json)    ─┘
//! social_links     = "{\"twitter\":..}" (json)    ───> SocialLinks { twitter, .. }
//! ```
//!
//! Decoding happens in two steps:
//! 1. [`interpreter::interpret`] selects a namespace's rows and decodes each
//!    field by its declared type and the field's kind.
//! 2. [`reconcile::reconcile`] merges decoded fields over the section's
//!    defaults. Anything that fails either step falls back to the default
//!    and is reported as a [`FieldFallback`], never as an error.

pub mod interpreter;
pub mod reconcile;
pub mod sections;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use interpreter::{DecodeFailure, Decoded, FieldFallback, interpret};
pub use reconcile::{Reconciled, SiteSection, reconcile};
pub use sections::{SectionConfig, SiteConfig};

/// How a namespace's settings are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keying {
    /// One row per field, keyed `<prefix><field>`.
    Prefix(&'static str),
    /// One JSON object row under a bare key; its members are the fields.
    Singleton(&'static str),
}

/// How a field's decoded JSON value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text; non-string scalars are rendered to text.
    Text,
    /// Boolean; accepts JSON booleans and the strings `"true"`/`"false"`.
    Bool,
    /// Structured value; shape is checked against the section type.
    Json,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Bool => write!(f, "boolean"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// A known field of a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name after the prefix is stripped.
    pub name: &'static str,
    /// Coercion applied when decoding.
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text,
    }
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Bool,
    }
}

const fn json(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Json,
    }
}

const GENERAL_FIELDS: &[FieldSpec] = &[
    text("name"),
    text("tagline"),
    text("logo_url"),
    flag("maintenance_mode"),
];

const ABOUT_FIELDS: &[FieldSpec] = &[
    text("title"),
    text("subtitle"),
    text("description"),
    text("mission"),
    text("vision"),
    json("values"),
    json("stats"),
    flag("show_team"),
];

const CONTACT_FIELDS: &[FieldSpec] = &[
    text("email"),
    text("phone"),
    text("address"),
    text("hours"),
    text("map_embed_url"),
    flag("show_form"),
];

const HERO_FIELDS: &[FieldSpec] = &[
    text("title"),
    text("subtitle"),
    text("cta_text"),
    text("cta_link"),
    text("background_image"),
    flag("show_video"),
];

const SEO_FIELDS: &[FieldSpec] = &[
    text("meta_title"),
    text("meta_description"),
    json("keywords"),
    text("og_image"),
];

const FOOTER_FIELDS: &[FieldSpec] = &[text("copyright"), text("description"), json("links")];

const SOCIAL_LINK_FIELDS: &[FieldSpec] = &[
    text("facebook"),
    text("twitter"),
    text("linkedin"),
    text("instagram"),
    text("youtube"),
];

/// The closed set of configuration domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    General,
    About,
    Contact,
    Hero,
    Seo,
    Footer,
    SocialLinks,
}

impl Namespace {
    /// Every namespace, in display order.
    pub const ALL: [Self; 7] = [
        Self::General,
        Self::About,
        Self::Contact,
        Self::Hero,
        Self::Seo,
        Self::Footer,
        Self::SocialLinks,
    ];

    /// Public name, as used in URLs and JSON.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Hero => "hero",
            Self::Seo => "seo",
            Self::Footer => "footer",
            Self::SocialLinks => "social_links",
        }
    }

    /// How rows of this namespace are keyed.
    #[must_use]
    pub const fn keying(self) -> Keying {
        match self {
            Self::General => Keying::Prefix("general_"),
            Self::About => Keying::Prefix("about_"),
            Self::Contact => Keying::Prefix("contact_"),
            Self::Hero => Keying::Prefix("hero_"),
            Self::Seo => Keying::Prefix("seo_"),
            Self::Footer => Keying::Prefix("footer_"),
            Self::SocialLinks => Keying::Singleton("social_links"),
        }
    }

    /// Known fields of this namespace.
    #[must_use]
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::General => GENERAL_FIELDS,
            Self::About => ABOUT_FIELDS,
            Self::Contact => CONTACT_FIELDS,
            Self::Hero => HERO_FIELDS,
            Self::Seo => SEO_FIELDS,
            Self::Footer => FOOTER_FIELDS,
            Self::SocialLinks => SOCIAL_LINK_FIELDS,
        }
    }

    /// Look up a field by its de-prefixed name.
    #[must_use]
    pub fn field(self, name: &str) -> Option<FieldSpec> {
        self.fields().iter().copied().find(|spec| spec.name == name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Namespace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.name() == s)
            .ok_or_else(|| format!("unknown settings namespace: {s}"))
    }
}
