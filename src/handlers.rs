pub mod cache;
pub mod dashboard;
pub mod event_window;
pub mod forecast;
pub mod health;
pub mod prices;
pub mod tickers;
