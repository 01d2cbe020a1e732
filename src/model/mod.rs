pub mod holiday;
pub mod kra;
pub mod leave_request;
pub mod permission;
pub mod role;
