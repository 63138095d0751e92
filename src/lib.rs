pub mod api;
pub mod compile;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use compile::{DerivedViews, ViewVersion};
pub use config::Config;
pub use datasource::{GatewaySettlement, MockSettlement, SettlementSource, SourceError};
pub use domain::{
    Address, BaseUnits, Command, EventKind, EventLog, Order, OrderId, OrderType, Price, RawEvent,
    TimeSec,
};
pub use error::AppError;
pub use store::{ExchangeState, SharedState};
