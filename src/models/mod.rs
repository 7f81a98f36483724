pub mod card_info;
pub mod player;
