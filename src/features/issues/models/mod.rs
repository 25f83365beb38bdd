mod issue;
mod spam_report;

pub use issue::{
    CreateIssue, IssueActivity, IssueCategory, IssuePhoto, IssueRecord, IssueRow, IssueStatus,
};
pub use spam_report::{should_hide, SpamReportRow};
