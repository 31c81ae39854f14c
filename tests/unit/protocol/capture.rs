use super::*;
use std::io::Cursor;

fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn data_url_round_trips_and_decodes() {
    let shot = CapturedImage {
        format: ImageFormat::Png,
        bytes: tiny_png(),
    };
    let url = shot.to_data_url();
    assert!(url.starts_with("data:image/png;base64,"));

    let parsed = CapturedImage::from_data_url(&url).unwrap();
    assert_eq!(parsed, shot);

    let pixels = parsed.decode().unwrap();
    assert_eq!((pixels.width(), pixels.height()), (2, 1));
}

#[test]
fn rejects_malformed_data_urls() {
    for bad in [
        "https://example.com/x.png",
        "data:image/png;base64",
        "data:image/png,plain",
        "data:image/gif;base64,R0lGOD",
        "data:image/png;base64,***",
    ] {
        let err = CapturedImage::from_data_url(bad).unwrap_err();
        assert!(matches!(err, PreviewError::Protocol(_)), "{bad}: {err}");
    }
}

#[test]
fn mime_mapping_is_symmetric() {
    for f in [ImageFormat::Jpeg, ImageFormat::Png] {
        assert_eq!(ImageFormat::from_mime(f.mime()), Some(f));
    }
    assert_eq!(ImageFormat::from_mime("image/webp"), None);
}
