pub mod commands;
mod events;
mod print;
mod render;
mod setup;
mod styles;
