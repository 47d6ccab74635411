use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;

use crate::app_state::AppState;
use crate::error::AppError;
use crate::middleware::jwt_auth::UserId;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepts a multipart form with a single `file` field and relays it to the
/// media host, answering with the hosted URL.
pub async fn upload(
    state: web::Data<AppState>,
    _user_id: UserId,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != "file" {
            continue;
        }
        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::BadRequest(format!("upload stream failed: {e}")))?
        {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::BadRequest(
                    "upload exceeds the 10 MiB limit".to_string(),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("uploaded file is empty".to_string()));
        }

        let url = state.media.upload(bytes, &filename).await?;
        return Ok(HttpResponse::Ok().json(url));
    }
    Err(AppError::BadRequest(
        "multipart body must contain a `file` field".to_string(),
    ))
}
