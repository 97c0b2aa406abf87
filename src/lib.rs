pub mod codec;
pub mod config;
pub mod discord;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod logging;
pub mod sticker;
pub mod store;

pub mod prelude {
    pub use crate::{
        config::Config,
        discord,
        error::*,
        gate::StickerGate,
        ingest::*,
        sticker::*,
        store::*,
    };
}
