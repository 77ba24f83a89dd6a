pub mod api_response;
pub mod lookup_dto;
pub mod vacancy_dto;
