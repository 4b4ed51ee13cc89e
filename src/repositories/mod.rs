//! 数据访问层（Repository）

mod alert_repo;
mod preference_repo;
mod reading_repo;
mod report_repo;
mod sensor_repo;
mod stores;

pub use alert_repo::AlertRepository;
pub use preference_repo::PreferenceRepository;
pub use reading_repo::ReadingRepository;
pub use report_repo::ReportRepository;
pub use sensor_repo::SensorRepository;
pub use stores::{AlertStore, PreferenceStore, ReadingStore, ReportStore, SensorStore};
