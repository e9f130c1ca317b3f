use std::fmt;

/// Represents a user account on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_bot: bool,
    /// Account no longer exists on the platform; only a placeholder remains.
    pub deleted: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            first_name: None,
            last_name: None,
            is_bot: false,
            deleted: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: Option<impl Into<String>>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = last.map(|l| l.into());
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    pub fn display_name(&self) -> String {
        if let Some(ref username) = self.username {
            username.clone()
        } else if let Some(ref first) = self.first_name {
            if let Some(ref last) = self.last_name {
                format!("{} {}", first, last)
            } else {
                first.clone()
            }
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A user's current standing within one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl ParticipantStatus {
    /// Maps a platform status string; unknown strings degrade to `Member`.
    pub fn parse(status: &str) -> Self {
        match status {
            "creator" => ParticipantStatus::Creator,
            "administrator" => ParticipantStatus::Administrator,
            "restricted" => ParticipantStatus::Restricted,
            "left" => ParticipantStatus::Left,
            "kicked" => ParticipantStatus::Kicked,
            _ => ParticipantStatus::Member,
        }
    }

    /// Whether this status carries admin rights in the chat.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            ParticipantStatus::Creator | ParticipantStatus::Administrator
        )
    }
}

/// A user together with their status in a particular chat
#[derive(Debug, Clone)]
pub struct Participant {
    pub user: User,
    pub status: ParticipantStatus,
}

impl Participant {
    pub fn new(user: User, status: ParticipantStatus) -> Self {
        Self { user, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_username() {
        let user = User::new("42")
            .with_username("alice")
            .with_name("Alice", Some("Smith"));
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(User::new("42").display_name(), "42");
    }

    #[test]
    fn admin_rights_by_status() {
        assert!(ParticipantStatus::Creator.is_admin());
        assert!(ParticipantStatus::Administrator.is_admin());
        assert!(!ParticipantStatus::Member.is_admin());
        assert!(!ParticipantStatus::parse("left").is_admin());
        assert!(!ParticipantStatus::parse("something-new").is_admin());
    }
}
