//! Rotation logic: dealing, finishing, swapping and roster transfer.

mod deal;
mod finish;
mod roster;
mod swap;

pub use deal::{deal, DealMode};
pub use finish::finish_game;
pub use roster::{export_csv, import_csv, CSV_HEADER};
pub use swap::swap_player;
