pub mod card_service;
pub mod chart_service;

pub use card_service::ChartCard;
