pub mod config_manager;
pub mod draw_manager;
pub mod prize_manager;
pub mod registration_manager;

pub use config_manager::{create_shared_config_manager, SharedConfigManager};
pub use draw_manager::{create_shared_draw_manager, SharedDrawManager};
pub use prize_manager::{create_shared_prize_manager, SharedPrizeManager};
pub use registration_manager::{create_shared_registration_manager, SharedRegistrationManager};
