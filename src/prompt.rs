use crate::models::{CollectedInput, GenerationRequest, FALLBACK_STYLE, MAX_STYLES};

pub const SYSTEM_PROMPT: &str = "You are FITLAB's elite AI fashion stylist — part visionary creative director, part personal shopper. \
You analyze the user's photo to understand body proportions, skin tone, current outfit, and personal aesthetic cues. \
You then craft 3 complete, wearable outfit concepts that flatter them specifically. \
Always respond in valid JSON only — no markdown, no preamble.";

/// Literal template the model fills in. Field names must match `response::parse`.
pub const SCHEMA_TEMPLATE: &str = r##"{
  "person_analysis": {
    "skin_tone": "describe undertone briefly",
    "body_silhouette": "describe shape/proportions briefly",
    "current_style_cue": "what their current look suggests",
    "style_persona": "2-3 word style archetype e.g. 'Quiet Luxe Minimalist'"
  },
  "outfits": [
    {
      "name": "Outfit name (evocative, 2-4 words)",
      "occasion_fit": "Best for...",
      "vibe": "One sentence mood/vibe",
      "description": "2-3 sentences describing how this outfit looks on them specifically, referencing their features",
      "pieces": [
        {"type": "Top", "item": "specific item with color/material", "why": "why it flatters them"},
        {"type": "Bottom", "item": "specific item with color/material", "why": "why it works"},
        {"type": "Shoes", "item": "specific footwear", "why": "completes the look"},
        {"type": "Bag", "item": "bag/accessory", "why": "ties it together"},
        {"type": "Accessory", "item": "jewelry/belt/hat etc", "why": "adds personality"}
      ],
      "color_palette": ["#hex1", "#hex2", "#hex3", "#hex4"],
      "palette_names": ["Color 1 name", "Color 2 name", "Color 3 name", "Color 4 name"],
      "styling_tip": "One specific tip for wearing this outfit best",
      "budget_breakdown": "Approximate total cost breakdown"
    }
  ],
  "universal_tips": [
    "Personalized tip 1 based on their features",
    "Personalized tip 2",
    "Personalized tip 3"
  ],
  "signature_piece": "The one statement piece that would transform their wardrobe",
  "avoid": "What styles/cuts to generally avoid and why"
}"##;

/// Dedupes preserving order, keeps at most three, and never returns an empty list.
pub fn clamp_styles(styles: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(MAX_STYLES);
    for style in styles.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if kept.len() == MAX_STYLES {
            break;
        }
        if !kept.iter().any(|k| k == style) {
            kept.push(style.to_string());
        }
    }
    if kept.is_empty() {
        kept.push(FALLBACK_STYLE.to_string());
    }
    kept
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

pub fn build(input: CollectedInput) -> GenerationRequest {
    let CollectedInput { image, selections } = input;
    let style_tags = clamp_styles(&selections.styles);

    let instruction = format!(
        "Analyze the person in this photo and create 3 distinct outfit concepts for them.\n\n\
         Style preferences: {styles}\n\
         Occasion: {occasion}\n\
         Season: {season}\n\
         Budget range: {budget}\n\
         Body/fit notes: {notes}\n\
         Special requests: {extra}\n\n\
         Respond ONLY with a JSON object in exactly this structure:\n{schema}",
        styles = style_tags.join(", "),
        occasion = selections.occasion,
        season = selections.season,
        budget = selections.budget,
        notes = or_placeholder(&selections.body_notes, "Not specified"),
        extra = or_placeholder(&selections.special_requests, "None"),
        schema = SCHEMA_TEMPLATE,
    );

    GenerationRequest {
        image,
        style_tags,
        occasion: selections.occasion,
        season: selections.season,
        budget: selections.budget,
        body_notes: selections.body_notes,
        special_requests: selections.special_requests,
        system: SYSTEM_PROMPT,
        instruction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{EncodedImage, MediaType};
    use crate::models::{Budget, Occasion, Season, Selections};
    use pretty_assertions::assert_eq;

    fn input(styles: &[&str]) -> CollectedInput {
        CollectedInput {
            image: EncodedImage::new(b"photo", MediaType::Jpeg),
            selections: Selections {
                styles: styles.iter().map(|s| s.to_string()).collect(),
                ..Selections::default()
            },
        }
    }

    #[test]
    fn empty_selection_gets_single_fallback() {
        let req = build(input(&[]));
        assert_eq!(req.style_tags, vec!["Minimalist".to_string()]);
        assert!(req.instruction.contains("Style preferences: Minimalist\n"));
    }

    #[test]
    fn up_to_three_styles_are_kept_in_order() {
        for styles in [vec!["Boho"], vec!["Y2K", "Grunge"], vec!["Preppy", "Coastal", "Old Money"]] {
            let req = build(input(&styles));
            assert_eq!(req.style_tags, styles.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn oversized_or_duplicated_selection_is_clamped() {
        let req = build(input(&["Boho", "Boho", "Y2K", "Grunge", "Preppy"]));
        assert_eq!(req.style_tags, vec!["Boho", "Y2K", "Grunge"]);
    }

    #[test]
    fn instruction_embeds_selections() {
        let mut collected = input(&["Minimalist"]);
        collected.selections.occasion = Occasion::Work;
        collected.selections.season = Season::Autumn;
        collected.selections.budget = Budget::From5KTo10K;
        let req = build(collected);
        for needle in ["Minimalist", "Work", "Autumn", "₹5K–10K"] {
            assert!(req.instruction.contains(needle), "missing {needle}");
        }
        assert!(req.instruction.contains("Body/fit notes: Not specified"));
        assert!(req.instruction.contains("Special requests: None"));
    }

    #[test]
    fn free_text_notes_are_forwarded() {
        let mut collected = input(&["Boho"]);
        collected.selections.body_notes = Some("petite, prefer loose fits".into());
        collected.selections.special_requests = Some("  ".into());
        let req = build(collected);
        assert!(req.instruction.contains("Body/fit notes: petite, prefer loose fits"));
        assert!(req.instruction.contains("Special requests: None"));
    }

    #[test]
    fn schema_template_names_every_field() {
        let req = build(input(&["Boho"]));
        assert_eq!(req.system, SYSTEM_PROMPT);
        for field in [
            "person_analysis", "skin_tone", "body_silhouette", "current_style_cue", "style_persona",
            "outfits", "occasion_fit", "vibe", "description", "pieces", "color_palette",
            "palette_names", "styling_tip", "budget_breakdown", "universal_tips", "signature_piece", "avoid",
        ] {
            assert!(req.instruction.contains(&format!("\"{field}\"")), "missing {field}");
        }
        for slot in ["Top", "Bottom", "Shoes", "Bag", "Accessory"] {
            assert!(req.instruction.contains(&format!("{{\"type\": \"{slot}\"")));
        }
        serde_json::from_str::<serde_json::Value>(SCHEMA_TEMPLATE).unwrap();
    }
}
