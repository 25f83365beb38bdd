mod board_dto;

pub use board_dto::{
    BoardViewDto, ChangePageDto, CreateSessionDto, IssueCardDto, MapSettingsDto, MapViewDto,
    SelectPostalCodeDto, SetViewDto, UpdateFiltersDto,
};
