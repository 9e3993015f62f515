pub mod geocoding_service;
pub mod legacy_cleanup_service;
pub mod point_pipeline;
