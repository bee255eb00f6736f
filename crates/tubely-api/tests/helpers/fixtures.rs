use axum_test::multipart::{MultipartForm, Part};

/// Bytes standing in for an MP4; the scripted tools never parse them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len.max(data.len()), 0xAB);
    data
}

/// PNG signature followed by filler.
pub fn fake_png(len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(len.max(data.len()), 0x42);
    data
}

/// Single-part form with `field` carrying `data` as `mime_type`.
pub fn form(field: &str, file_name: &str, mime_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}
