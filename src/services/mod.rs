// Business logic services

pub mod backup_service;
pub mod bmi_service;
pub mod csv_export_service;
pub mod member_service;
pub mod prediction_service;
pub mod timeline_service;

pub use backup_service::{
    decode_backup, encode_backup, validate_backup, BackupService, RestoreOutcome, RestoreReport,
};
pub use bmi_service::{calculate_bmi, classify_bmi, BmiBand};
pub use csv_export_service::{to_csv, CSV_HEADER};
pub use member_service::MemberService;
pub use prediction_service::{predict, PREDICTION_HORIZONS};
pub use timeline_service::build_timeline;
