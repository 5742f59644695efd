//! Operator message composition — the human-readable fallback payload.
//!
//! Built from the raw form data alone, never from the bot parameter set:
//! either channel may reject a request the other can still service, so the
//! two representations must not share a derived intermediate.

use crate::request::RequestType;
use crate::request::form::FormData;

/// Subject and plain-text body for the email fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMessage {
    pub subject: String,
    pub body: String,
}

/// Compose the per-type operator message.
pub(crate) fn compose(
    request_type: RequestType,
    form: &FormData,
    user: &str,
    cluster: &str,
) -> OperatorMessage {
    let subject = format!("[{cluster}] {request_type} Request: {user}");
    let body = match request_type {
        RequestType::Quota => quota_body(form, user, cluster),
        RequestType::Software => software_body(form, user, cluster),
        RequestType::Group => group_body(form, user, cluster),
        RequestType::Help => help_body(form, user, cluster),
        RequestType::Purchase => purchase_body(form, user, cluster),
        RequestType::Acknowledgement => acknowledgement_body(form, user, cluster),
    };
    OperatorMessage { subject, body }
}

fn quota_body(form: &FormData, user: &str, cluster: &str) -> String {
    if form.text("is_buy_request") == "Yes" {
        format!(
            "\nCluster: {cluster}\n\
             User: {user}\n\
             DiskName: {}\n\
             Request Type: Buy-in Quota Request\n\
             Expiration Date: {}\n\
             Account Number: {}\n\
             \n\
             --- CURRENT QUOTA ---\n\
             Current disk space: {}\n\
             Current file limit: {}\n\
             \n\
             --- REQUESTING QUOTA ---\n\
             Requesting disk space: {}TB\n\
             Requesting file limit: {}\n\
             Comment: {}\n",
            form.text("directory"),
            form.text("expiration_date"),
            form.text("account_number"),
            form.text("current_quota"),
            form.text("current_file_limit"),
            form.text("new_quota"),
            form.text("new_file_limit"),
            form.text("comment"),
        )
    } else {
        format!(
            "\nCluster: {cluster}\n\
             User: {user}\n\
             DiskName: {}\n\
             Request Type: {}\n\
             --- CURRENT QUOTA ---\n\
             Current disk space: {}\n\
             Current file limit: {}\n\
             --- REQUESTING QUOTA ---\n\
             Requesting disk space: {}TB\n\
             Requesting file limit: {}\n\
             --- Justification ---\n\
             Is the PI aware of this request?\n{}\n\
             What data is stored with the requested quota?\n{}\n\
             Briefly describe the research project that will be supported by the requested storage?\n{}\n\
             What is the input/output size of the job?\n{}\n\
             What is your long-term storage plan for your data after the quota increase expires?\n{}\n\
             Comment: {}\n",
            form.text("directory"),
            form.text("request_type_detail"),
            form.text("current_quota"),
            form.text("current_file_limit"),
            form.text("new_quota"),
            form.text("new_file_limit"),
            form.text("pi_awareness"),
            form.text("stored_data"),
            form.text("research_description"),
            form.text("job_size"),
            form.text("storage_plan"),
            form.text("comment"),
        )
    }
}

fn software_body(form: &FormData, user: &str, cluster: &str) -> String {
    format!(
        "\nCluster: {cluster}\n\
         User: {user}\n\
         Request Type: Software Installation\n\
         Software Name: {}\n\
         Version: {}\n\
         Download Link: {}\n\
         Toolchain: {}\n\
         Category: {}\n\
         Additional Information:\n{}\n",
        form.text("software_name"),
        form.text("software_version"),
        form.text("software_link"),
        form.text("software_toolchain"),
        form.text("software_category"),
        form.text("software_info"),
    )
}

fn group_body(form: &FormData, user: &str, cluster: &str) -> String {
    format!(
        "\nCluster: {cluster}\n\
         User: {user}\n\
         Request Type: Group Management\n\
         Action: {}\n\
         Group Name: {}\n\
         Members: {}\n\
         Comments: {}\n",
        form.text("action"),
        form.text("group_name"),
        form.list("target_users").join(", "),
        form.text("comments"),
    )
}

fn help_body(form: &FormData, user: &str, cluster: &str) -> String {
    let topic = form
        .get("help_request_type")
        .or_else(|| form.get("direct_help_topic"))
        .unwrap_or("General");
    format!(
        "\nCluster: {cluster}\n\
         User: {user}\n\
         Request Type: Help Request\n\
         Topic: {topic}\n\
         Issue Description: {}\n",
        form.text("issue_description"),
    )
}

fn purchase_body(form: &FormData, user: &str, cluster: &str) -> String {
    format!(
        "\nCluster: {cluster}\n\
         User: {user}\n\
         Request Type: Account Purchase\n\
         What: {}\n\
         Who: {}\n\
         Due Date: {}\n\
         Accounts: {}\n\
         Notes: {}\n",
        form.text("what"),
        form.text("who"),
        form.text("due"),
        form.list("accounts").join(", "),
        form.text("additional_notes"),
    )
}

fn acknowledgement_body(form: &FormData, user: &str, cluster: &str) -> String {
    format!(
        "\nCluster: {cluster}\n\
         User: {user}\n\
         Request Type: Publication Acknowledgement\n\
         DOI: {}\n\
         Additional Info: {}\n\
         Timestamp: {}\n",
        form.text("doi"),
        form.text("additional_info"),
        form.text("timestamp"),
    )
}
