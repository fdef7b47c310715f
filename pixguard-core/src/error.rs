use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PixguardError {
    #[error("Payload too long: {len} bytes exceeds fixed length of {max}")]
    PayloadTooLong { len: usize, max: usize },

    #[error("Malformed bitstring: {0}")]
    MalformedBitstring(String),

    #[error("Fingerprint length mismatch: {left} vs {right} bits")]
    LengthMismatch { left: usize, right: usize },

    #[error("Insufficient capacity: payload needs {required} bits, image holds {available}")]
    InsufficientCapacity { required: usize, available: usize },

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Image encode error: {0}")]
    ImageEncode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PixguardError {
    /// Whether the error stems from caller-supplied input rather than a bug.
    ///
    /// `MalformedBitstring` is the one kind that only arises from a broken
    /// call site; everything else maps to a validation failure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PixguardError::MalformedBitstring(_))
    }
}

pub type Result<T> = std::result::Result<T, PixguardError>;
