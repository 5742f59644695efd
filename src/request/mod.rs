//! Request model — normalization of per-type form data into the two
//! canonical delivery payloads.

pub mod form;
pub mod message;
pub mod normalize;
pub mod params;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use form::{FormData, FormValue};
pub use message::OperatorMessage;
pub use params::BotParams;

use crate::config::RelayConfig;
use crate::directory::Directory;
use crate::error::BuildError;

/// The closed set of request types the relay understands.
///
/// Parsing from the inbound type tag is the single enumeration check;
/// everything downstream dispatches on the variant exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    Quota,
    Software,
    Group,
    Help,
    Purchase,
    Acknowledgement,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quota => "Quota",
            Self::Software => "Software",
            Self::Group => "Group",
            Self::Help => "Help",
            Self::Purchase => "Purchase",
            Self::Acknowledgement => "Acknowledgement",
        }
    }

    /// Lowercase label for user-facing messages ("your quota request ...").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::Software => "software",
            Self::Group => "group",
            Self::Help => "help",
            Self::Purchase => "purchase",
            Self::Acknowledgement => "acknowledgement",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Quota" => Ok(Self::Quota),
            "Software" => Ok(Self::Software),
            "Group" => Ok(Self::Group),
            "Help" => Ok(Self::Help),
            "Purchase" => Ok(Self::Purchase),
            "Acknowledgement" => Ok(Self::Acknowledgement),
            other => Err(BuildError::UnknownRequestType(other.to_string())),
        }
    }
}

/// Builds the two independent delivery payloads for a request.
///
/// Pure given its injected lookups: no I/O, no retries, deterministic.
pub struct ModelBuilder {
    config: Arc<RelayConfig>,
    directory: Arc<dyn Directory>,
}

impl ModelBuilder {
    pub fn new(config: Arc<RelayConfig>, directory: Arc<dyn Directory>) -> Self {
        Self { config, directory }
    }

    /// Build the bot parameter set and the operator message for one request.
    ///
    /// Both derive from the form data directly; neither is derived from the
    /// other. Malformed-but-recognized shapes degrade to empty-string
    /// substitution rather than failing — the web layer already validated
    /// the form.
    pub fn build(
        &self,
        request_type: RequestType,
        form: &FormData,
        user: &str,
    ) -> Result<(BotParams, OperatorMessage), BuildError> {
        let cluster = self.config.cluster_name.as_str();
        let email = self.directory.user_email(user)?;

        let params = match request_type {
            RequestType::Quota => params::quota(form, user, &email, cluster),
            RequestType::Software => params::software(form, user, &email, cluster),
            RequestType::Group => {
                params::group(form, user, &email, cluster, self.directory.as_ref())?
            }
            RequestType::Help => params::help(form, user, &email, cluster),
            RequestType::Purchase => params::purchase(form, user, &email, cluster),
            RequestType::Acknowledgement => {
                params::acknowledgement(form, user, &email, cluster)
            }
        };

        let message = message::compose(request_type, form, user, cluster);
        Ok((params, message))
    }
}
