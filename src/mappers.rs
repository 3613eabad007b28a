pub mod github_user_mapper;
