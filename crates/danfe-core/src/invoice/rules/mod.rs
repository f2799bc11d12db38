//! Rule-based extractors for DANFE text.

pub mod header;
pub mod items;
pub mod numbers;
pub mod patterns;

pub use header::extract_header;
pub use items::{
    extract_items, BlockParser, DenylistNoiseFilter, DroppedBlock, ItemScan, NoiseFilter,
    DEFAULT_LOOKAHEAD_WINDOW,
};
pub use numbers::{format_localized_amount, parse_localized_decimal};
