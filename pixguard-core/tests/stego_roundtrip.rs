//! End-to-end watermark tests through real PNG encode/decode.

use image::{DynamicImage, ImageBuffer, Rgba};
use pixguard_core::container::{decode_image, encode_png, from_dynamic};
use pixguard_core::{
    CapacityPolicy, EngineConfig, LsbCodec, PayloadFormat, PixelBuffer, PixguardError, Protector,
};

fn solid_gray_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&PixelBuffer::filled(width, height, [128, 128, 128])).expect("PNG encoding failed")
}

#[test]
fn test_owner123_in_solid_gray_png() {
    for format in [PayloadFormat::Sentinel, PayloadFormat::LengthPrefixed] {
        let codec = LsbCodec::new(format, CapacityPolicy::Strict);
        let mut buffer = decode_image(&solid_gray_png(100, 100)).unwrap();

        codec.embed(&mut buffer, "OWNER123", 20).unwrap();
        let png = encode_png(&buffer).unwrap();

        let reloaded = decode_image(&png).unwrap();
        assert_eq!(
            codec.extract(&reloaded, 20).unwrap(),
            "OWNER123",
            "format {format:?}"
        );
    }
}

#[test]
fn test_rgba_png_keeps_alpha_and_payload() {
    let img = ImageBuffer::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 100, 200]));
    let mut buffer = from_dynamic(DynamicImage::ImageRgba8(img)).unwrap();
    assert_eq!(buffer.channels(), 4);

    let codec = LsbCodec::default();
    codec.embed(&mut buffer, "alpha-owner", 20).unwrap();

    let reloaded = decode_image(&encode_png(&buffer).unwrap()).unwrap();
    assert_eq!(reloaded.channels(), 4);
    assert!(reloaded.pixels().all(|p| p[3] == 200));
    assert_eq!(codec.extract(&reloaded, 20).unwrap(), "alpha-owner");
}

#[test]
fn test_protector_from_jpeg_upload() {
    let rgb = ImageBuffer::from_fn(80, 60, |x, y| {
        image::Rgb([(x * 3) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
    });
    let mut jpeg = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut jpeg, image::ImageFormat::Jpeg)
        .unwrap();

    let protector = Protector::new(EngineConfig::default()).unwrap();
    let protected = protector
        .protect(jpeg.get_ref(), "TIMES_PROJECT_SECRET")
        .unwrap();

    assert_eq!(pixguard_core::inspect(&protected.png_bytes).unwrap().format, "png");
    assert_eq!(
        protector.reveal(&protected.png_bytes).unwrap(),
        "TIMES_PROJECT_SECRET"
    );
}

#[test]
fn test_secret_is_configuration_not_constant() {
    let protector = Protector::new(EngineConfig::default()).unwrap();
    let png = solid_gray_png(40, 40);

    let a = protector.protect(&png, "tenant-a").unwrap();
    let b = protector.protect(&png, "tenant-b").unwrap();

    assert_ne!(a.content_digest, b.content_digest);
    assert!(protector.verify_owner(&a.png_bytes, "tenant-a").unwrap());
    assert!(!protector.verify_owner(&a.png_bytes, "tenant-b").unwrap());
    assert!(protector.verify_owner(&b.png_bytes, "tenant-b").unwrap());
}

#[test]
fn test_longer_fixed_length() {
    let config = EngineConfig {
        fixed_length: 64,
        ..Default::default()
    };
    let protector = Protector::new(config).unwrap();
    let secret = "owner:8f14e45f-ceea-467f-a0e6-3c2b8b6b5d11";

    let protected = protector.protect(&solid_gray_png(50, 50), secret).unwrap();
    assert_eq!(protector.reveal(&protected.png_bytes).unwrap(), secret);
}

#[test]
fn test_payload_too_long_for_fixed_length() {
    let protector = Protector::new(EngineConfig::default()).unwrap();
    let err = protector
        .protect(&solid_gray_png(50, 50), "a secret that is longer than twenty bytes")
        .unwrap_err();
    assert!(matches!(err, PixguardError::PayloadTooLong { max: 20, .. }));
}

#[test]
fn test_sentinel_legacy_image_readable() {
    // Images watermarked by older deployments use the '#'-padded layout.
    let legacy = LsbCodec::new(PayloadFormat::Sentinel, CapacityPolicy::Truncate);
    let mut buffer = decode_image(&solid_gray_png(30, 30)).unwrap();
    legacy.embed(&mut buffer, "TIMES_PROJECT_SECRET", 20).unwrap();
    let png = encode_png(&buffer).unwrap();

    let protector = Protector::new(EngineConfig {
        payload_format: PayloadFormat::Sentinel,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(protector.reveal(&png).unwrap(), "TIMES_PROJECT_SECRET");
}
