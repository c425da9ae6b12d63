pub mod models;
pub mod wire;

pub use models::{Group, GroupRecord, Permission, PermissionRecord, User, UserRecord};
pub use wire::{GroupWire, PermissionWire, UserWire};
