pub mod expiry_service;
pub mod identity_service;
pub mod lookup_service;
pub mod scheduler;
pub mod vacancy_service;
