pub mod github_user_repository;
