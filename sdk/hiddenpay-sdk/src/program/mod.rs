pub mod instructions;
pub mod pda;

pub use pda::{
    derive, derive_merchant_pda, derive_platform_pda, derive_product_pda,
    derive_subscription_pda, AccountRole,
};
