pub mod records;
pub mod tags;
pub mod web;
