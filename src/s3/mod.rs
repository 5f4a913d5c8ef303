pub mod s3_client;
pub mod s3_client_config;
