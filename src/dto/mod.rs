pub mod point_dto;
