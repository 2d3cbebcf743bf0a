pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod events;
pub mod fifa_data;
pub mod filters;
pub mod http_client;
pub mod injuries;
pub mod result_cache;
pub mod team_colors;
