//! Directory lookups — user mail addresses and group storage directories.
//!
//! The surrounding deployment resolves these from its identity and group
//! services; the relay only sees this trait.

/// Directory metadata for a managed group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDirectoryInfo {
    /// Filesystem path of the group's shared directory.
    pub directory: String,
}

/// A failed lookup.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Directory lookup failed for {subject}: {reason}")]
pub struct DirectoryError {
    pub subject: String,
    pub reason: String,
}

/// Lookup seam injected into the model builder and orchestrator.
pub trait Directory: Send + Sync {
    /// Resolve a username to its mail address.
    fn user_email(&self, user: &str) -> Result<String, DirectoryError>;

    /// Resolve a group name to its directory metadata.
    fn group_directory(&self, group: &str) -> Result<GroupDirectoryInfo, DirectoryError>;
}

/// Host-convention resolver for deployments without a directory service:
/// `user@{mail_domain}` addresses and `{group_base}/{group}` directories.
#[derive(Debug, Clone)]
pub struct HostConventionDirectory {
    mail_domain: String,
    group_base: String,
}

impl HostConventionDirectory {
    pub fn new(mail_domain: impl Into<String>, group_base: impl Into<String>) -> Self {
        Self {
            mail_domain: mail_domain.into(),
            group_base: group_base.into(),
        }
    }
}

impl Directory for HostConventionDirectory {
    fn user_email(&self, user: &str) -> Result<String, DirectoryError> {
        if user.is_empty() {
            return Err(DirectoryError {
                subject: "(empty user)".into(),
                reason: "no username given".into(),
            });
        }
        Ok(format!("{user}@{}", self.mail_domain))
    }

    fn group_directory(&self, group: &str) -> Result<GroupDirectoryInfo, DirectoryError> {
        if group.is_empty() {
            return Err(DirectoryError {
                subject: "(empty group)".into(),
                reason: "no group name given".into(),
            });
        }
        Ok(GroupDirectoryInfo {
            directory: format!("{}/{group}", self.group_base),
        })
    }
}
