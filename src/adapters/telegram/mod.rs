pub mod message;
pub mod notifier;

pub use notifier::{parse_recipients, DeliveryOutcome, TelegramNotifier, DEFAULT_TELEGRAM_API_URL};
