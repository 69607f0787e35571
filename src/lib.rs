// Wire timestamp encoding
pub mod time;

// API key + timestamp request guard
pub mod auth;

// Module record, request payload and wire representation
pub mod module;

// Persistence seam and adapters
pub mod repository;

// Module lifecycle operations
pub mod service;

// Startup configuration
pub mod config;

// HTTP routes
pub mod api;
