use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;

/// Pull the contents of one named field out of a multipart/form-data body.
/// Returns `Ok(None)` when the body has no such field.
pub async fn read_field(
    headers: &HeaderMap,
    body: Bytes,
    field_name: &str,
) -> Result<Option<Bytes>, String> {
    let boundary = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Expected a multipart/form-data body".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        return Ok(Some(data));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const BOUNDARY: &str = "X-RECIPES-BOUNDARY";

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        headers
    }

    fn body(name: &str, content: &str) -> Bytes {
        Bytes::from(format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{name}\"; filename=\"file.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        ))
    }

    #[tokio::test]
    async fn reads_named_field() {
        let data = read_field(&headers(), body("image", "payload"), "image")
            .await
            .unwrap();
        assert_eq!(data.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn missing_field_is_none() {
        let data = read_field(&headers(), body("other", "payload"), "image")
            .await
            .unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn rejects_non_multipart_request() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(read_field(&headers, Bytes::from_static(b"{}"), "image").await.is_err());
    }
}
