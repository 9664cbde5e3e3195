//! Profile Bot — a turn-based bot that learns a user's name and age.

pub mod activity;
pub mod adapter;
pub mod bot;
pub mod channels;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod runner;
pub mod state;
pub mod store;
pub mod turn;
