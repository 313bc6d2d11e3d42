#![cfg_attr(not(test), no_std)]

pub mod application;
pub mod arith;
pub mod calculator;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod keypad;
pub mod power;
pub mod runtime;
pub mod touch;
pub mod ui;
