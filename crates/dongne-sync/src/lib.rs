//! Registry layer: MOLIT apartment trade XML schema, month-window pagination, retry.

mod error;
pub mod fetch;
pub mod retry;
pub mod xml;

pub use error::RegistryError;
pub use fetch::{FetchOutcome, PAGE_SIZE, PageQuery, TransactionSource, fetch_raw_records};
pub use retry::RetryPolicy;
pub use xml::{RegistryPage, parse_page};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{MOLIT_APT_TRADE_URL, RegistryClient};
