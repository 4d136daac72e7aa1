use image::ImageFormat;

/// Confirm `data` is a decodable image and return the file extension for its format.
pub fn validate_image(data: &[u8]) -> Result<&'static str, String> {
    let format = image::guess_format(data)
        .map_err(|_| "Upload a valid image. The file is not an image or is corrupted.".to_string())?;

    image::load_from_memory_with_format(data, format)
        .map_err(|e| format!("Upload a valid image. The file could not be decoded: {e}"))?;

    Ok(extension(format))
}

fn extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}
