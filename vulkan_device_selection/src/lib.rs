pub mod capability;
pub mod device;
pub mod device_selection;
pub mod driver;
pub mod enumerate;
pub mod prelude;
pub mod queue_family;
