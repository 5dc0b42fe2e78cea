use super::RequestsLoggingLevel;

/// A client allowed to call the API, checked with HTTP Basic auth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiUser {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    pub users: Vec<ApiUser>,
}

impl ServerConfig {
    pub fn find_user(&self, username: &str, password: &str) -> Option<&ApiUser> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3050,
            metrics_port: 9092,
            max_upload_bytes: 1024 * 1024 * 1024,
            users: Vec::new(),
        }
    }
}
