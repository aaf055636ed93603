pub mod blog_controller;
pub mod blog_error;
pub mod blog_index;
pub mod blog_model;
pub mod blog_query;
pub mod blog_service;
pub mod blog_store;
pub mod reading_time;
