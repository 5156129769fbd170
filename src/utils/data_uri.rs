use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Picks the image MIME type from a file name's extension, defaulting to JPEG.
pub fn image_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => DEFAULT_IMAGE_MIME,
    }
}

/// Encodes image bytes as an inline `data:` URI.
pub fn to_data_uri(file_name: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        image_mime_type(file_name),
        BASE64.encode(bytes)
    )
}
