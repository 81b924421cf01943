pub mod dash;
pub mod events;
pub mod fix;
pub mod status;
