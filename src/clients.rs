pub mod github_api_client;
