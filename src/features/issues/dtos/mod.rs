mod issue_dto;

pub use issue_dto::{
    CreateIssueDto, DeletePhotoDto, IssueDetailDto, PhotoUploadForm, PhotoUploadResponseDto,
    SpamReportDto, SpamReportResponseDto, UpdateIssueDto,
};
