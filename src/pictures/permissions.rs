use std::{fmt, str::FromStr};

/// Who may write to the picture store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    Anyone,
    Authenticated,
    /// Only the uploader. Uploading itself then needs a logged-in caller.
    Owner,
}

impl WritePolicy {
    pub fn allows(&self, caller: Option<&str>, owner: Option<&str>) -> bool {
        use WritePolicy::*;
        match self {
            Anyone => true,
            Authenticated => caller.is_some(),
            Owner => caller.is_some() && caller == owner,
        }
    }
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anyone" => Ok(WritePolicy::Anyone),
            "authenticated" => Ok(WritePolicy::Authenticated),
            "owner" => Ok(WritePolicy::Owner),
            other => Err(format!("expected anyone, authenticated or owner, got {other:?}")),
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StorePermissions {
    pub insert: WritePolicy,
    pub update: WritePolicy,
    pub remove: WritePolicy,
}

impl StorePermissions {
    pub fn uniform(policy: WritePolicy) -> Self {
        Self {
            insert: policy,
            update: policy,
            remove: policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyone_allows_everything() {
        assert!(WritePolicy::Anyone.allows(None, None));
        assert!(WritePolicy::Anyone.allows(None, Some("u1")));
        assert!(WritePolicy::Anyone.allows(Some("u2"), Some("u1")));
    }

    #[test]
    fn authenticated_needs_caller() {
        assert!(!WritePolicy::Authenticated.allows(None, Some("u1")));
        assert!(WritePolicy::Authenticated.allows(Some("u2"), Some("u1")));
    }

    #[test]
    fn owner_needs_matching_caller() {
        assert!(WritePolicy::Owner.allows(Some("u1"), Some("u1")));
        assert!(!WritePolicy::Owner.allows(Some("u2"), Some("u1")));
        assert!(!WritePolicy::Owner.allows(None, None));
        assert!(!WritePolicy::Owner.allows(Some("u1"), None));
    }

    #[test]
    fn parses() {
        assert_eq!("Owner".parse(), Ok(WritePolicy::Owner));
        assert_eq!("authenticated".parse(), Ok(WritePolicy::Authenticated));
        assert!("nobody".parse::<WritePolicy>().is_err());
    }
}
