//! Example demonstrating the engine's tracing instrumentation.
//!
//! Protects a synthetic image, then detects a truncating embed and a copy.
//! Run with: cargo run -p pixguard-core --example protect_tracing

use pixguard_core::{encode_png, CapacityPolicy, EngineConfig, PixelBuffer, Protector};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::new("pixguard_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Pixguard Tracing Demo ===\n");

    let config = EngineConfig::from_env().unwrap_or_default();
    println!("Config: {:?}\n", config);

    let protector = match Protector::new(config.clone()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create protector: {}", e);
            return;
        }
    };

    let image = PixelBuffer::from_fn(96, 64, |x, y| {
        [(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8]
    });
    let upload = match encode_png(&image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to encode demo image: {}", e);
            return;
        }
    };

    println!("\nProtecting...\n");
    let protected = match protector.protect(&upload, "OWNER123") {
        Ok(p) => p,
        Err(e) => {
            println!("\n❌ Failed: {}", e);
            return;
        }
    };
    println!("\n✅ Protected");
    println!("   Fingerprint: {}", protected.fingerprint.to_hex());
    println!("   SHA3-256:    {}", protected.content_digest);

    println!("\nDetecting...\n");
    let stored = vec![("demo".to_string(), protected.fingerprint.clone())];
    match protector.fingerprint(&protected.png_bytes) {
        Ok(candidate) => {
            let report = protector.detector().detect(&candidate, &stored);
            println!("\n   Verdict: {}", report.verdict);
        }
        Err(e) => println!("\n❌ Failed: {}", e),
    }

    // A 3x3 image holds 27 bits; truncation logs a warning instead of failing
    println!("\nTruncating embed...\n");
    let truncating = Protector::new(EngineConfig {
        capacity_policy: CapacityPolicy::Truncate,
        ..config
    });
    if let (Ok(truncating), Ok(tiny)) = (
        truncating,
        encode_png(&PixelBuffer::filled(3, 3, [200, 200, 200])),
    ) {
        if let Ok(result) = truncating.protect(&tiny, "OWNER123") {
            println!("   Wrote {} payload bits", result.payload_bits);
        }
    }
}
