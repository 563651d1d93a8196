pub mod anomaly_service;
pub mod forecasting_service;
pub mod notification_service;
pub mod tracker_service;
