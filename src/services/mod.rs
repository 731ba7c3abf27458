pub mod geocoding_services;
pub mod media;
pub mod policy;
pub mod validation;
