pub mod accounts;
pub mod booking;
pub mod dashboard;
pub mod directory;
pub mod seed;
pub mod session;
pub mod slots;
