#![forbid(unsafe_code)]

pub mod access;
pub mod controller;
pub mod error;
pub mod mobile;
pub mod pagination;
pub mod render;
pub mod view;

pub use questionnaire_core::Clock;

pub use access::{AccessPolicy, RoleAccessPolicy, UserIdentity};
pub use controller::ActivityPageController;
pub use error::{AccessDenied, PageError, RenderError};
pub use mobile::{MobileArgs, MobileContent, MobileOutputService};
pub use render::{HtmlRenderer, Renderer};
pub use view::{
    IndexView, PageBody, PageData, PageView, SideData, SubmissionItem, TemplateContext,
    TemplateId, ViewModel,
};
