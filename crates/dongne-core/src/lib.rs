pub mod aggregate;
pub mod clock;
pub mod deal;
pub mod detect;
pub mod normalize;
pub mod price;

pub use aggregate::{Aggregation, dedupe_and_aggregate};
pub use clock::{Clock, FixedClock, SystemClock, recent_year_months};
pub use deal::{ApartmentAggregate, Deal, FlaggedDeal, MarketSummary, RawRegistryRecord};
pub use detect::{Detection, detect_new};
pub use normalize::{DEFAULT_NEIGHBORHOOD, normalize};
pub use price::{NOT_COMPUTABLE, format_price, price_per_pyeong};
