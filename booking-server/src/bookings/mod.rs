//! Booking domain logic: transactional creation

pub mod writer;

pub use writer::create_booking_with_services;
