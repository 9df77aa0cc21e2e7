//! Typed configuration sections and their defaults.

use serde::{Deserialize, Serialize};

use super::interpreter::{FieldFallback, interpret};
use super::reconcile::{Reconciled, SiteSection, reconcile};
use super::Namespace;
use crate::models::Setting;

/// Site-wide identity (`general_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub name: String,
    pub tagline: String,
    pub logo_url: String,
    pub maintenance_mode: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            name: "Our Company".to_owned(),
            tagline: "Building better solutions together".to_owned(),
            logo_url: "/images/logo.svg".to_owned(),
            maintenance_mode: false,
        }
    }
}

/// A headline figure on the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

/// About page content (`about_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutSettings {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub mission: String,
    pub vision: String,
    pub values: Vec<String>,
    pub stats: Vec<Stat>,
    pub show_team: bool,
}

impl Default for AboutSettings {
    fn default() -> Self {
        Self {
            title: "About Us".to_owned(),
            subtitle: "Who we are and what we do".to_owned(),
            description: "We are a team dedicated to delivering quality work for our clients."
                .to_owned(),
            mission: "To deliver dependable products that help our customers succeed.".to_owned(),
            vision: "To be the partner our customers recommend first.".to_owned(),
            values: ["Integrity", "Quality", "Collaboration"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            stats: vec![
                Stat {
                    label: "Years in business".to_owned(),
                    value: "10+".to_owned(),
                },
                Stat {
                    label: "Clients served".to_owned(),
                    value: "500+".to_owned(),
                },
            ],
            show_team: true,
        }
    }
}

/// Contact page content (`contact_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub hours: String,
    pub map_embed_url: String,
    pub show_form: bool,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            email: "info@example.com".to_owned(),
            phone: "+1 (555) 000-0000".to_owned(),
            address: "123 Main Street, Anytown".to_owned(),
            hours: "Monday to Friday, 9:00 to 17:00".to_owned(),
            map_embed_url: String::new(),
            show_form: true,
        }
    }
}

/// Home page hero banner (`hero_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSettings {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub background_image: String,
    pub show_video: bool,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            title: "Welcome".to_owned(),
            subtitle: "Solutions that grow with your business".to_owned(),
            cta_text: "Get in touch".to_owned(),
            cta_link: "/contact".to_owned(),
            background_image: "/images/hero.jpg".to_owned(),
            show_video: false,
        }
    }
}

/// Search metadata (`seo_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoSettings {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub og_image: String,
}

impl Default for SeoSettings {
    fn default() -> Self {
        Self {
            meta_title: "Our Company".to_owned(),
            meta_description: "Building better solutions together.".to_owned(),
            keywords: Vec::new(),
            og_image: "/images/og.png".to_owned(),
        }
    }
}

/// A footer navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

/// Footer content (`footer_*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub copyright: String,
    pub description: String,
    pub links: Vec<FooterLink>,
}

impl Default for FooterSettings {
    fn default() -> Self {
        Self {
            copyright: "All rights reserved.".to_owned(),
            description: String::new(),
            links: vec![
                FooterLink {
                    label: "About".to_owned(),
                    url: "/about".to_owned(),
                },
                FooterLink {
                    label: "Contact".to_owned(),
                    url: "/contact".to_owned(),
                },
            ],
        }
    }
}

/// Social profile URLs, stored together under `social_links`.
///
/// An empty string means the profile is not shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub facebook: String,
    pub twitter: String,
    pub linkedin: String,
    pub instagram: String,
    pub youtube: String,
}

impl SiteSection for GeneralSettings {
    const NAMESPACE: Namespace = Namespace::General;
}
impl SiteSection for AboutSettings {
    const NAMESPACE: Namespace = Namespace::About;
}
impl SiteSection for ContactSettings {
    const NAMESPACE: Namespace = Namespace::Contact;
}
impl SiteSection for HeroSettings {
    const NAMESPACE: Namespace = Namespace::Hero;
}
impl SiteSection for SeoSettings {
    const NAMESPACE: Namespace = Namespace::Seo;
}
impl SiteSection for FooterSettings {
    const NAMESPACE: Namespace = Namespace::Footer;
}
impl SiteSection for SocialLinks {
    const NAMESPACE: Namespace = Namespace::SocialLinks;
}

/// Decode and reconcile one section from the full settings list.
#[must_use]
pub fn load_section<T: SiteSection>(settings: &[Setting]) -> Reconciled<T> {
    reconcile(T::default(), interpret(T::NAMESPACE, settings))
}

/// Any one section, selected by namespace at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionConfig {
    General(GeneralSettings),
    About(AboutSettings),
    Contact(ContactSettings),
    Hero(HeroSettings),
    Seo(SeoSettings),
    Footer(FooterSettings),
    SocialLinks(SocialLinks),
}

impl SectionConfig {
    /// Load the section for `namespace`.
    #[must_use]
    pub fn load(namespace: Namespace, settings: &[Setting]) -> Reconciled<Self> {
        match namespace {
            Namespace::General => load_section(settings).map(Self::General),
            Namespace::About => load_section(settings).map(Self::About),
            Namespace::Contact => load_section(settings).map(Self::Contact),
            Namespace::Hero => load_section(settings).map(Self::Hero),
            Namespace::Seo => load_section(settings).map(Self::Seo),
            Namespace::Footer => load_section(settings).map(Self::Footer),
            Namespace::SocialLinks => load_section(settings).map(Self::SocialLinks),
        }
    }
}

/// Every section at once, as served to public pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteConfig {
    pub general: GeneralSettings,
    pub about: AboutSettings,
    pub contact: ContactSettings,
    pub hero: HeroSettings,
    pub seo: SeoSettings,
    pub footer: FooterSettings,
    pub social_links: SocialLinks,
}

impl SiteConfig {
    /// Build every section, returning the fallbacks grouped by namespace.
    #[must_use]
    pub fn from_settings(settings: &[Setting]) -> (Self, Vec<(Namespace, FieldFallback)>) {
        let mut fallbacks = Vec::new();
        let mut take = |namespace: Namespace, found: Vec<FieldFallback>| {
            fallbacks.extend(found.into_iter().map(|f| (namespace, f)));
        };

        let general = load_section::<GeneralSettings>(settings);
        take(Namespace::General, general.fallbacks);
        let about = load_section::<AboutSettings>(settings);
        take(Namespace::About, about.fallbacks);
        let contact = load_section::<ContactSettings>(settings);
        take(Namespace::Contact, contact.fallbacks);
        let hero = load_section::<HeroSettings>(settings);
        take(Namespace::Hero, hero.fallbacks);
        let seo = load_section::<SeoSettings>(settings);
        take(Namespace::Seo, seo.fallbacks);
        let footer = load_section::<FooterSettings>(settings);
        take(Namespace::Footer, footer.fallbacks);
        let social_links = load_section::<SocialLinks>(settings);
        take(Namespace::SocialLinks, social_links.fallbacks);

        let config = Self {
            general: general.value,
            about: about.value,
            contact: contact.value,
            hero: hero.value,
            seo: seo.value,
            footer: footer.value,
            social_links: social_links.value,
        };
        (config, fallbacks)
    }
}
