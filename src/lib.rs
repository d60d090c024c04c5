#![doc = "The `taskpad` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, credential and session logic,"]
#![doc = "the bearer-token auth gate, routing configuration, and error handling"]
#![doc = "for the taskpad API. It is used by the main binary (`main.rs`) to"]
#![doc = "construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
