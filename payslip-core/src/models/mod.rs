mod asset;
mod dynamic_row;
mod form_state;
mod pay_period;
mod totals;

pub use asset::{AssetFile, AssetSlot, ImageAsset};
pub use dynamic_row::{DynamicRow, RowId, RowList};
pub use form_state::{
    DEFAULT_BRAND_COLOR, PayBasis, PayFrequency, PaymentMethod, PayslipFormState,
};
pub use pay_period::PayPeriod;
pub use totals::CalculationTotals;
