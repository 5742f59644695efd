//! Bot parameter construction — the machine payload for the bot channel.
//!
//! Every builder produces the full key set the bot expects for its type,
//! empty-valued where the form left a field out. The bot consumes the
//! payload keyed, not schema-validated, so a missing key is worse than an
//! empty one.

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::directory::{Directory, DirectoryError};
use crate::request::form::FormData;
use crate::request::normalize::{normalize_integer, normalize_quantity};

/// Canonical structured payload sent to the bot channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BotParams(Map<String, Value>);

impl BotParams {
    fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a key, if it is present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// Common envelope every payload starts from.
fn envelope(request_type: &str, user: &str, email: &str, cluster: &str) -> BotParams {
    let mut params = BotParams::new();
    params.set("request_type", json!(request_type));
    params.set("user", json!(user));
    params.set("email", json!(email));
    params.set("cluster_name", json!(cluster));
    params
}

// ── Quota ───────────────────────────────────────────────────────────

/// Typed values of the four numeric quota fields. Absent or empty fields
/// convert to `None` (JSON null on the wire).
struct QuotaNumbers {
    current_quota: Option<f64>,
    current_file_limit: Option<i64>,
    new_quota: Option<f64>,
    new_file_limit: Option<i64>,
}

/// Strict conversion of the four numeric fields.
///
/// Returns `None` when any field is present but unparseable — the caller
/// then passes all four raw strings through unmodified. The degradation is
/// deliberately all-or-nothing: the bot must never see a payload mixing
/// parsed numbers with raw strings.
fn quota_numbers(form: &FormData) -> Option<QuotaNumbers> {
    fn quantity(form: &FormData, key: &str) -> Result<Option<f64>, ()> {
        match form.get(key) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => normalize_quantity(Some(raw)).map(Some).ok_or(()),
        }
    }

    fn integer(form: &FormData, key: &str) -> Result<Option<i64>, ()> {
        match form.get(key) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => normalize_integer(Some(raw)).map(Some).ok_or(()),
        }
    }

    let numbers = QuotaNumbers {
        current_quota: quantity(form, "current_quota").ok()?,
        current_file_limit: integer(form, "current_file_limit").ok()?,
        new_quota: quantity(form, "new_quota").ok()?,
        new_file_limit: integer(form, "new_file_limit").ok()?,
    };
    Some(numbers)
}

pub(crate) fn quota(form: &FormData, user: &str, email: &str, cluster: &str) -> BotParams {
    let mut params = envelope("Quota", user, email, cluster);

    match quota_numbers(form) {
        Some(numbers) => {
            params.set("current_quota", json!(numbers.current_quota));
            params.set("current_file_limit", json!(numbers.current_file_limit));
            params.set("desired_disk", json!(numbers.new_quota));
            params.set("total_file_limit", json!(numbers.new_file_limit));
        }
        None => {
            warn!(user, "Failed to convert quota fields, passing raw values through");
            params.set("current_quota", json!(form.text("current_quota")));
            params.set("current_file_limit", json!(form.text("current_file_limit")));
            params.set("desired_disk", json!(form.text("new_quota")));
            params.set("total_file_limit", json!(form.text("new_file_limit")));
        }
    }

    let buyin_confirmed = form.text("is_buy_request") == "Yes";
    let account_number = if buyin_confirmed {
        form.text("account_number")
    } else {
        // Outside a buy-in there is no billing context; never forward one.
        ""
    };

    params.set("directory", json!(form.text("directory")));
    params.set("request_justification", json!(quota_justification(form)));
    params.set("comment", json!(form.text("comment")));
    params.set(
        "confirmBuyin",
        json!(if buyin_confirmed { "yes" } else { "no" }),
    );
    params.set(
        "has_previous",
        json!(form.text("request_type_detail") == "Extension"),
    );
    params.set("request_until", json!(form.text("expiration_date")));
    params.set("account_number", json!(account_number));
    params
}

/// The combined justification the storage team reads, assembled from the
/// five form sub-answers under their question headings.
fn quota_justification(form: &FormData) -> String {
    format!(
        "\nIs the PI aware of this request?\n{}\n\n\
         What data is stored with the requested quota?\n{}\n\n\
         Briefly describe the research project that will be supported by the requested storage?\n{}\n\n\
         What is the input/output size of the job?\n{}\n\n\
         What is your long-term storage plan for your data after the quota increase expires?\n{}\n",
        form.text("pi_awareness"),
        form.text("stored_data"),
        form.text("research_description"),
        form.text("job_size"),
        form.text("storage_plan"),
    )
}

// ── Software ────────────────────────────────────────────────────────

pub(crate) fn software(form: &FormData, user: &str, email: &str, cluster: &str) -> BotParams {
    let mut params = envelope("Software", user, email, cluster);
    params.set("software_name", json!(form.text("software_name")));
    params.set("software_version", json!(form.text("software_version")));
    params.set("software_link", json!(form.text("software_link")));
    params.set("toolchains", json!(form.text("software_toolchain")));
    params.set(
        "request_justification",
        json!(format!(
            "Category: {}\n{}",
            form.text("software_category"),
            form.text("software_info")
        )),
    );
    params.set("additional_notes", json!(""));
    params
}

// ── Group ───────────────────────────────────────────────────────────

/// Bot action for a group management sub-type. Unrecognized sub-types map
/// to no action at all, never a default.
fn group_action(sub_type: &str) -> Option<&'static str> {
    match sub_type {
        "cgroup" => Some("createGroup"),
        "madd" => Some("addMembers"),
        "mremove" => Some("deleteMembers"),
        "rgroup" => Some("requestAccess"),
        _ => None,
    }
}

pub(crate) fn group(
    form: &FormData,
    user: &str,
    email: &str,
    cluster: &str,
    directory: &dyn Directory,
) -> Result<BotParams, DirectoryError> {
    let mut params = envelope("Group", user, email, cluster);
    let sub_type = form.text("group_request_type");

    params.set("comments", json!(form.text("comments")));
    params.set("new_group", json!(sub_type == "cgroup"));

    if let Some(group_name) = form.get("group_name").filter(|name| !name.is_empty()) {
        let info = directory.group_directory(group_name)?;
        params.set("group_name", json!(group_name));
        params.set("directory", json!(info.directory));
    }

    if let Some(action) = group_action(sub_type) {
        params.set("action", json!(action));
        params.set("Add", json!(action));
        // Access requests name no members; the other three carry the roster.
        if sub_type != "rgroup" {
            params.set("target_users", json!(form.list("target_users")));
        }
    }

    Ok(params)
}

// ── Help ────────────────────────────────────────────────────────────

/// Detail fields attached only when the form submitted them. The bot keys
/// its follow-up questions on presence, so these are never defaulted.
const HELP_DETAIL_FIELDS: [&str; 6] = [
    "issue_description",
    "program_file_path",
    "additional_information",
    "job_id",
    "job_file_path",
    "error_message",
];

pub(crate) fn help(form: &FormData, user: &str, email: &str, cluster: &str) -> BotParams {
    let mut params = envelope("Help", user, email, cluster);

    let category = form
        .get("help_request_type")
        .or_else(|| form.get("direct_help_topic"))
        .unwrap_or("");
    params.set("help_category", json!(category));

    for field in HELP_DETAIL_FIELDS {
        if let Some(value) = form.get(field) {
            params.set(field, json!(value));
        }
    }
    params
}

// ── Purchase ────────────────────────────────────────────────────────

pub(crate) fn purchase(form: &FormData, user: &str, email: &str, cluster: &str) -> BotParams {
    let mut params = envelope("Purchase", user, email, cluster);
    params.set("what", json!(form.text("what")));
    params.set("who", json!(form.text("who")));
    params.set("due", json!(form.text("due")));
    params.set("accounts", json!(form.list("accounts")));
    params.set("additional_notes", json!(form.text("additional_notes")));
    params
}

// ── Acknowledgement ─────────────────────────────────────────────────

pub(crate) fn acknowledgement(
    form: &FormData,
    user: &str,
    email: &str,
    cluster: &str,
) -> BotParams {
    let mut params = envelope("Acknowledgement", user, email, cluster);
    params.set("doi", json!(form.text("doi")));
    params.set("additional_info", json!(form.text("additional_info")));
    params.set("timestamp", json!(form.text("timestamp")));
    params
}
