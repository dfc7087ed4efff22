pub mod availability;
pub mod bookings;
pub mod durations;
pub mod exceptions;
pub mod schedule;
pub mod slots;

pub use availability::AvailabilityService;
pub use bookings::BookingLookupService;
pub use durations::DurationService;
pub use exceptions::ExceptionService;
pub use schedule::ScheduleService;
