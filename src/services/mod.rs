// Services module - Business logic

pub mod analytics;
pub mod card_registry;
pub mod card_token;
pub mod check_in;
pub mod devices;
pub mod passwords;
pub mod periods;
pub mod qr;
pub mod roll_call;
pub mod transfers;
