mod ranking;
mod session;

pub use {
    self::ranking::{
        best_active,
        rank,
    },
    self::session::{
        mask_display_name,
        Item,
        Session,
    },
};
