//! HTML fragments for the results pane. Class names match `static/fitlab.css`.

use std::fmt::Write;

use crate::error::{ApiError, GenerationError};
use crate::models::{Outfit, RecommendationResult};
use crate::session::StoredResult;

/// Escapes text coming from the model or the user before it lands in markup.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn placeholder() -> String {
    r#"<div class="placeholder">
    <div class="placeholder-icon">👗</div>
    <div class="placeholder-title">Your Looks Await</div>
    <div class="placeholder-sub">Upload your photo · Choose your styles · Hit Generate<br>Get 3 personalised outfit concepts crafted by AI</div>
</div>"#
        .to_string()
}

pub fn error_notice(err: &ApiError) -> String {
    let (class, title) = match err {
        ApiError::Generation(GenerationError::InputMissing) => ("notice warning", "Photo needed"),
        ApiError::Generation(GenerationError::Parse(_)) => ("notice error", "Parsing error"),
        ApiError::Generation(GenerationError::Service(_)) => ("notice error", "Error"),
        ApiError::BadRequest(_) => ("notice warning", "Check your selections"),
        ApiError::PayloadTooLarge => ("notice warning", "Photo too large"),
        ApiError::NotFound => ("notice error", "Session expired"),
    };
    format!(
        r#"<div class="{class}"><div class="notice-title">{title}</div><div class="notice-text">{}</div></div>"#,
        escape(&err.to_string())
    )
}

pub fn panels(stored: Option<&StoredResult>) -> String {
    match stored {
        Some(stored) => results(stored),
        None => placeholder(),
    }
}

pub fn results(stored: &StoredResult) -> String {
    let data = &stored.result;
    let mut html = String::new();
    analysis_box(&mut html, data);
    info_strip(&mut html, stored);
    for (i, outfit) in data.outfits.iter().enumerate() {
        outfit_card(&mut html, i + 1, outfit);
    }
    tips(&mut html, &data.universal_tips);
    signature_and_avoid(&mut html, data);
    html
}

fn analysis_box(html: &mut String, data: &RecommendationResult) {
    let pa = &data.person_analysis;
    let _ = write!(
        html,
        r#"<div class="analysis-box">
    <div class="analysis-title">✦ Style Profile Analysis</div>
    <div class="analysis-text">You carry a <strong>{}</strong> energy — {} with {}. Your current look signals <em>{}</em>. These looks are curated to elevate exactly that.</div>
</div>
"#,
        escape(&pa.style_persona),
        escape(&pa.skin_tone),
        escape(&pa.body_silhouette),
        escape(&pa.current_style_cue),
    );
}

fn info_strip(html: &mut String, stored: &StoredResult) {
    let s = &stored.selections;
    let cells = [
        (stored.result.outfits.len().to_string(), "Looks"),
        (s.occasion.to_string(), "Occasion"),
        (s.season.to_string(), "Season"),
        (s.budget.to_string(), "Budget"),
    ];
    html.push_str(r#"<div class="info-strip">"#);
    for (val, lbl) in cells {
        let _ = write!(html, r#"<div class="info-cell"><div class="info-val">{}</div><div class="info-lbl">{lbl}</div></div>"#, escape(&val));
    }
    let _ = writeln!(html, r#"</div><div class="info-styles">{}</div>"#, escape(&s.styles.join(" · ")));
}

fn outfit_card(html: &mut String, index: usize, outfit: &Outfit) {
    let _ = write!(
        html,
        r#"<div class="outfit-card">
    <div class="outfit-head">
        <div>
            <div class="look-num">LOOK {index:02}</div>
            <div class="outfit-name">{}</div>
            <div class="outfit-occasion">{}</div>
        </div>
        <div class="outfit-vibe">{}</div>
    </div>
    <div class="outfit-desc">{}</div>
    <div class="piece-list">"#,
        escape(&outfit.name),
        escape(&outfit.occasion_fit),
        escape(&outfit.vibe),
        escape(&outfit.description),
    );
    for piece in &outfit.pieces {
        let _ = write!(
            html,
            r#"<div class="piece-item"><div class="piece-dot"></div><div class="piece-type">{}</div><div class="piece-name">{}</div><div class="piece-why">{}</div></div>"#,
            escape(&piece.kind),
            escape(&piece.item),
            escape(&piece.why),
        );
    }
    html.push_str("</div>");

    if !outfit.color_palette.is_empty() {
        html.push_str(r#"<div class="palette-row"><span class="palette-label">PALETTE</span>"#);
        for (j, color) in outfit.color_palette.iter().enumerate() {
            let title = outfit.palette_names.get(j).map(String::as_str).unwrap_or("");
            let _ = write!(html, r#"<div title="{}" class="color-chip" style="background:{};"></div>"#, escape(title), escape(color));
        }
        let _ = write!(html, r#"<span class="palette-names">{}</span></div>"#, escape(&outfit.palette_names.join(" · ")));
    }

    let _ = writeln!(
        html,
        r#"<div class="tip-box"><div class="tip-main"><div class="tip-label">✦ Styling Tip</div><div class="tip-text">{}</div></div><div class="tip-budget"><div class="tip-label muted">BUDGET</div><div class="tip-text">{}</div></div></div>
</div>"#,
        escape(&outfit.styling_tip),
        escape(&outfit.budget_breakdown),
    );
}

fn tips(html: &mut String, tips: &[String]) {
    if tips.is_empty() {
        return;
    }
    html.push_str(r#"<div class="tips"><div class="section-label">✦ Personalized Style Tips</div>"#);
    for (idx, tip) in tips.iter().enumerate() {
        let _ = write!(html, r#"<div class="tip-row"><div class="tip-num">{:02}</div><div>{}</div></div>"#, idx + 1, escape(tip));
    }
    html.push_str("</div>\n");
}

fn signature_and_avoid(html: &mut String, data: &RecommendationResult) {
    if data.signature_piece.is_empty() && data.avoid.is_empty() {
        return;
    }
    let _ = writeln!(
        html,
        r#"<div class="closing-row">
    <div class="outfit-card signature"><div class="card-label">✦ Signature Statement Piece</div><div class="card-text">{}</div></div>
    <div class="outfit-card avoid"><div class="card-label">✦ What to Avoid</div><div class="card-text">{}</div></div>
</div>"#,
        escape(&data.signature_piece),
        escape(&data.avoid),
    );
}
