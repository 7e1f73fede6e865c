use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::EncodedImage;
use crate::error::UnknownOption;

pub const STYLES: [&str; 15] = [
    "Streetwear", "Minimalist", "Business Casual", "Boho", "Y2K",
    "Old Money", "Grunge", "Cottagecore", "Athleisure", "Avant-Garde",
    "Coastal", "Dark Academia", "Preppy", "Maximalist", "Androgynous",
];

/// Substituted when the user clears every style selection.
pub const FALLBACK_STYLE: &str = "Minimalist";
pub const MAX_STYLES: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occasion {
    #[default]
    Everyday,
    Work,
    #[serde(rename = "Date Night")]
    DateNight,
    Party,
    Outdoor,
    Formal,
    Festival,
    Travel,
}

impl Occasion {
    pub const ALL: [Occasion; 8] = [
        Occasion::Everyday, Occasion::Work, Occasion::DateNight, Occasion::Party,
        Occasion::Outdoor, Occasion::Formal, Occasion::Festival, Occasion::Travel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Occasion::Everyday => "Everyday",
            Occasion::Work => "Work",
            Occasion::DateNight => "Date Night",
            Occasion::Party => "Party",
            Occasion::Outdoor => "Outdoor",
            Occasion::Formal => "Formal",
            Occasion::Festival => "Festival",
            Occasion::Travel => "Travel",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
    #[serde(rename = "All-Season")]
    AllSeason,
}

impl Season {
    pub const ALL: [Season; 5] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter, Season::AllSeason];

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::AllSeason => "All-Season",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    #[default]
    #[serde(rename = "Under ₹2K")]
    Under2K,
    #[serde(rename = "₹2K–5K")]
    From2KTo5K,
    #[serde(rename = "₹5K–10K")]
    From5KTo10K,
    #[serde(rename = "₹10K–20K")]
    From10KTo20K,
    Luxury,
}

impl Budget {
    pub const ALL: [Budget; 5] = [
        Budget::Under2K, Budget::From2KTo5K, Budget::From5KTo10K, Budget::From10KTo20K, Budget::Luxury,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Budget::Under2K => "Under ₹2K",
            Budget::From2KTo5K => "₹2K–5K",
            Budget::From5KTo10K => "₹5K–10K",
            Budget::From10KTo20K => "₹10K–20K",
            Budget::Luxury => "Luxury",
        }
    }
}

fn parse_label<T: Copy>(kind: &'static str, all: &[T], label: fn(T) -> &'static str, value: &str) -> Result<T, UnknownOption> {
    let value = value.trim();
    all.iter()
        .copied()
        .find(|v| label(*v) == value)
        .ok_or_else(|| UnknownOption { kind, value: value.to_string() })
}

impl FromStr for Occasion {
    type Err = UnknownOption;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_label("occasion", &Self::ALL, Self::label, s) }
}

impl FromStr for Season {
    type Err = UnknownOption;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_label("season", &Self::ALL, Self::label, s) }
}

impl FromStr for Budget {
    type Err = UnknownOption;
    fn from_str(s: &str) -> Result<Self, Self::Err> { parse_label("budget", &Self::ALL, Self::label, s) }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// What the user picked in the form. Survives across generations within a session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Selections {
    pub styles: Vec<String>,
    pub occasion: Occasion,
    pub season: Season,
    pub budget: Budget,
    #[serde(default)]
    pub body_notes: Option<String>, // e.g. petite, prefer loose fits
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            styles: vec![FALLBACK_STYLE.to_string()],
            occasion: Occasion::default(),
            season: Season::default(),
            budget: Budget::default(),
            body_notes: None,
            special_requests: None,
        }
    }
}

/// Validated form input with a photo guaranteed present.
#[derive(Debug, Clone)]
pub struct CollectedInput {
    pub image: EncodedImage,
    pub selections: Selections,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub image: EncodedImage,
    pub style_tags: Vec<String>,
    pub occasion: Occasion,
    pub season: Season,
    pub budget: Budget,
    pub body_notes: Option<String>,
    pub special_requests: Option<String>,
    pub system: &'static str,
    pub instruction: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PersonAnalysis {
    pub skin_tone: String,
    pub body_silhouette: String,
    pub current_style_cue: String,
    pub style_persona: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OutfitPiece {
    #[serde(rename = "type")]
    pub kind: String, // Top, Bottom, Shoes, Bag, Accessory by convention
    pub item: String,
    pub why: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Outfit {
    pub name: String,
    pub occasion_fit: String,
    pub vibe: String,
    pub description: String,
    pub pieces: Vec<OutfitPiece>,
    pub color_palette: Vec<String>,
    pub palette_names: Vec<String>, // parallel to color_palette, lengths may differ
    pub styling_tip: String,
    pub budget_breakdown: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RecommendationResult {
    pub person_analysis: PersonAnalysis,
    pub outfits: Vec<Outfit>,
    pub universal_tips: Vec<String>,
    pub signature_piece: String,
    pub avoid: String,
}
