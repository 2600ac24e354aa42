// src/os/mod.rs

pub mod winsize;
