use axum::extract::Multipart;
use bytes::Bytes;

use crate::application::http::server::api_entities::api_error::ApiError;

pub const IMAGE_FIELD: &str = "image";

/// Multipart body carrying one food photo.
#[derive(utoipa::ToSchema)]
pub struct ImageUpload {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Reads the `image` field, ignoring any other field.
pub async fn read_image_field(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<Bytes, ApiError> {
    let mut image: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;

        if data.len() > max_upload_bytes {
            return Err(ApiError::BadRequest(format!(
                "Image too large. Max size is {} bytes",
                max_upload_bytes
            )));
        }

        image = Some(data);
    }

    image.ok_or_else(|| ApiError::BadRequest("Missing image field".to_string()))
}
