pub mod client;

pub use client::FlightServiceClient;
