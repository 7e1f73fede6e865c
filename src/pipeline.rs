use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::anthropic::ModelClient;
use crate::codec::{EncodedImage, MediaType};
use crate::error::{ApiError, GenerationError};
use crate::models::{CollectedInput, Selections};
use crate::prompt;
use crate::response;
use crate::session::{SessionStore, StoredResult};

#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub media_type: MediaType,
}

/// One submission of the form. `photo` is `None` when the user did not re-upload.
#[derive(Debug, Clone, Default)]
pub struct GenerationForm {
    pub photo: Option<Upload>,
    pub selections: Selections,
}

/// Runs one generation attempt for a session. The stored result is replaced only on success.
pub async fn generate(
    store: &SessionStore,
    model: &dyn ModelClient,
    id: &Uuid,
    form: GenerationForm,
) -> Result<StoredResult, ApiError> {
    let mut selections = form.selections;
    selections.styles = prompt::clamp_styles(&selections.styles);

    let photo = form.photo.map(|upload| {
        info!("📸 Encoding {} upload ({} bytes)", upload.media_type.as_str(), upload.bytes.len());
        EncodedImage::new(&upload.bytes, upload.media_type)
    });
    let session = store.record_input(id, selections.clone(), photo).ok_or(ApiError::NotFound)?;

    let Some(image) = session.photo else {
        warn!("⚠️ Session {} asked for looks without a photo", id);
        return Err(GenerationError::InputMissing.into());
    };

    let request = prompt::build(CollectedInput { image, selections: selections.clone() });
    info!(
        "🎯 Generating looks for session {}: {} / {} / {} / {} (notes: {}, requests: {})",
        id,
        request.style_tags.join(", "),
        request.occasion,
        request.season,
        request.budget,
        request.body_notes.is_some(),
        request.special_requests.is_some(),
    );

    let raw = model.generate(&request).await.map_err(|e| {
        error!("❌ Generation failed for session {}: {}", id, e);
        GenerationError::from(e)
    })?;

    let result = response::parse(&response::normalize(&raw)).map_err(|e| {
        error!("❌ Model output for session {} is not valid JSON at line {} column {}: {}", id, e.line, e.column, e.message);
        GenerationError::from(e)
    })?;

    let stored = StoredResult { result, selections, generated_at: Utc::now() };
    if !store.store_result(id, stored.clone()) {
        return Err(ApiError::NotFound);
    }
    info!("✅ Stored {} looks for session {}", stored.result.outfits.len(), id);
    Ok(stored)
}
