pub mod common;
pub mod gimbal;
pub mod sensor;
pub mod servo;
pub mod spotlight;
