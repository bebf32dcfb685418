//! Models Module
//!
//! Read options, read results and the champion statistics DTO.

pub mod champion;
pub mod requests;
pub mod responses;

pub use champion::{filter_rows, ChampionStats, CHAMPION_STATS_PATH};
pub use requests::{ReadOptions, Validator};
pub use responses::{Fetched, Origin};
