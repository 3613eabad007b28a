pub mod api_response;
pub mod github_user;
