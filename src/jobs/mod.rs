pub mod snapshot_sync;
