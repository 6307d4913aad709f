pub mod snapshot_date;
