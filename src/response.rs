//! Turns raw model text into a [`RecommendationResult`].
//!
//! Malformed JSON is a hard [`ParseError`]. Missing or mistyped fields are not:
//! every read goes through [`Doc`], which falls back to empty values.

use serde_json::Value;

use crate::error::ParseError;
use crate::models::{Outfit, OutfitPiece, PersonAnalysis, RecommendationResult};

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Removes one leading and one trailing code fence from the boundaries of `raw`.
/// Text without fences comes back untouched.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let opening = trimmed.strip_prefix(JSON_FENCE).or_else(|| trimmed.strip_prefix(FENCE));
    let body = opening.unwrap_or(trimmed);
    let closing = body.strip_suffix(FENCE);
    if opening.is_none() && closing.is_none() {
        return raw.to_string();
    }
    closing.unwrap_or(body).trim().to_string()
}

/// Read-only view over a JSON value where every lookup has a default.
#[derive(Debug, Clone, Copy)]
pub struct Doc<'a>(Option<&'a Value>);

impl<'a> Doc<'a> {
    pub fn new(value: &'a Value) -> Self { Doc(Some(value)) }

    /// Child under `key`; absent when this is not an object or the key is missing.
    pub fn get(&self, key: &str) -> Doc<'a> {
        Doc(self.0.and_then(|v| v.as_object()).and_then(|m| m.get(key)))
    }

    /// Scalar as display text. Null, objects and arrays read as "".
    pub fn text(&self) -> String {
        match self.0 {
            Some(Value::String(s)) => s.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => String::new(),
        }
    }

    pub fn str(&self, key: &str) -> String { self.get(key).text() }

    /// Elements under `key`; empty when missing or not an array.
    pub fn list(&self, key: &str) -> Vec<Doc<'a>> {
        match self.get(key).0 {
            Some(Value::Array(items)) => items.iter().map(Doc::new).collect(),
            _ => Vec::new(),
        }
    }

    pub fn texts(&self, key: &str) -> Vec<String> {
        self.list(key).iter().map(Doc::text).collect()
    }
}

pub fn parse(candidate: &str) -> Result<RecommendationResult, ParseError> {
    let value: Value = serde_json::from_str(candidate)?;
    Ok(from_doc(Doc::new(&value)))
}

fn from_doc(root: Doc<'_>) -> RecommendationResult {
    let pa = root.get("person_analysis");
    RecommendationResult {
        person_analysis: PersonAnalysis {
            skin_tone: pa.str("skin_tone"),
            body_silhouette: pa.str("body_silhouette"),
            current_style_cue: pa.str("current_style_cue"),
            style_persona: pa.str("style_persona"),
        },
        outfits: root.list("outfits").iter().map(outfit).collect(),
        universal_tips: root.texts("universal_tips"),
        signature_piece: root.str("signature_piece"),
        avoid: root.str("avoid"),
    }
}

fn outfit(doc: &Doc<'_>) -> Outfit {
    Outfit {
        name: doc.str("name"),
        occasion_fit: doc.str("occasion_fit"),
        vibe: doc.str("vibe"),
        description: doc.str("description"),
        pieces: doc
            .list("pieces")
            .iter()
            .map(|p| OutfitPiece { kind: p.str("type"), item: p.str("item"), why: p.str("why") })
            .collect(),
        color_palette: doc.texts("color_palette"),
        palette_names: doc.texts("palette_names"),
        styling_tip: doc.str("styling_tip"),
        budget_breakdown: doc.str("budget_breakdown"),
    }
}
