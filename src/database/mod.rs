pub mod pagination;
pub mod pool;
pub mod vacancy_repository;
