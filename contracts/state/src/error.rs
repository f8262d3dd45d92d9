use thiserror::Error;

/// Anchor assigns user error codes starting at 6000.
pub const ANCHOR_ERROR_CODE_OFFSET: u32 = 6000;

/// Custom error codes raised by the HiddenPay program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum HiddenPayProgramError {
    /// Name is too long
    NameTooLong = ANCHOR_ERROR_CODE_OFFSET,
    /// Description is too long
    DescriptionTooLong,
    /// Invalid price
    InvalidPrice,
    /// Invalid duration
    InvalidDuration,
    /// Product is inactive
    ProductInactive,
}

impl HiddenPayProgramError {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            6000 => Some(Self::NameTooLong),
            6001 => Some(Self::DescriptionTooLong),
            6002 => Some(Self::InvalidPrice),
            6003 => Some(Self::InvalidDuration),
            6004 => Some(Self::ProductInactive),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NameTooLong => "Name is too long",
            Self::DescriptionTooLong => "Description is too long",
            Self::InvalidPrice => "Invalid price",
            Self::InvalidDuration => "Invalid duration",
            Self::ProductInactive => "Product is inactive",
        }
    }
}

/// Errors decoding HiddenPay account data.
#[derive(Debug, Error)]
pub enum HiddenPayStateError {
    #[error("account data too small: {0} bytes")]
    DataTooSmall(usize),

    #[error("discriminator mismatch for {0}")]
    DiscriminatorMismatch(&'static str),

    #[error("failed to decode {0}: {1}")]
    Decode(&'static str, std::io::Error),
}
