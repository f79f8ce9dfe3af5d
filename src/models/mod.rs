pub mod account;
pub mod appointment;
pub mod availability;
pub mod specialty;
pub mod time;

pub use account::{Doctor, DoctorProfile, Patient, Role};
pub use appointment::{Appointment, AppointmentStatus};
pub use availability::AvailabilityWindow;
