use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Named deployments of the CloudOps API.
#[derive(Clone, Default, Copy, PartialEq, Eq)]
pub enum Environment {
    /// API running on the developer machine.
    #[default]
    Local,
    /// Pre-production deployment.
    Staging,
    /// Public deployment.
    Production,
}

impl Environment {
    /// Returns the API base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Local => "http://localhost:8000/api/v1".to_string(),
            Environment::Staging => "https://staging.api.cloudopspro.com/api/v1".to_string(),
            Environment::Production => "https://api.cloudopspro.com/api/v1".to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Local => write!(f, "Local"),
            Environment::Staging => write!(f, "Staging"),
            Environment::Production => write!(f, "Production"),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("STAGING".parse::<Environment>(), Ok(Environment::Staging));
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_local_is_default() {
        assert_eq!(
            Environment::default().api_url(),
            "http://localhost:8000/api/v1"
        );
    }
}
