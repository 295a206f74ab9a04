//! Citizen flow: upload a picture, confirm what it shows, submit it

pub mod dtos;
pub mod models;
pub mod services;
pub mod views;
