//! Domain model module declarations.

pub mod reminder;

pub use reminder::{
    parse_timestamp, CreateReminder, Reminder, ReminderState, ReminderStats, UpdateReminder,
};
