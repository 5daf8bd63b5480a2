//! History exports: spreadsheet-friendly CSV and full JSON backups.

pub mod backup;
pub mod csv;

pub use backup::{Backup, BackupMetadata, BACKUP_VERSION};
pub use self::csv::{csv_string, write_csv};
