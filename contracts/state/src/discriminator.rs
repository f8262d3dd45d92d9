use sha2::{Digest, Sha256};

pub const DISCRIMINATOR_LEN: usize = 8;

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}

/// Anchor instruction discriminator: `sha256("global:<ix_name>")[..8]`
pub fn instruction_discriminator(ix_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", ix_name)
}

/// Anchor account discriminator: `sha256("account:<TypeName>")[..8]`
pub fn account_discriminator(type_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", type_name)
}
