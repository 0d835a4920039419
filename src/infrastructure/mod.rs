pub mod clock;
pub mod memory_store;
pub mod file_store;
pub mod sqlite_store;
pub mod emailjs_relay;
pub mod simulated_relay;
pub mod console_notifier;
