//! 业务逻辑层（Service）

pub mod alert_evaluator;
mod alert_service;
mod notification_service;
mod reading_service;
pub mod report_formatter;
mod report_service;
pub mod statistics;
mod threshold_service;

pub use alert_service::{AlertCheckOutcome, AlertService, NotificationSender, SkipReason};
pub use notification_service::LogNotificationService;
pub use reading_service::{ReadingService, MAX_READINGS_PER_QUERY};
pub use report_service::{ReportService, MAX_REPORTS_PER_QUERY};
pub use threshold_service::ThresholdService;
