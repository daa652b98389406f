pub use super::snapshot::Entity as Snapshot;
