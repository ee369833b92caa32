//! Line-oriented commands typed at the dashboard prompt.
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use rfq_core::{Channel, Msg, ProjectMode};
use rfq_engine::{DocumentRef, FetchRequest};

pub const HELP: &str = "\
Wizard:    new | id <RFQ_n> | desc <text> | deadline <YYYY-MM-DD|none>
           project <id> | newproject <name> [: description]
           vendor add | vendor rm <n> | vendor <n> <vendor_id> | doc <n> <type>
           next | back | submit | cancel
Real-time: subscribe <rfq_id> | unsubscribe | send <dashboard|documents|rfq> <text>
Lookups:   projects | vendors [page] | doctypes | analysis <rfq_id> | report <rfq_id>
Files:     download <document_id> | download blob:<name> | pdf <rfq_id>
Other:     status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Msgs(Vec<Msg>),
    Fetch(FetchRequest),
    Status,
    Help,
    Quit,
}

impl From<Msg> for Command {
    fn from(msg: Msg) -> Self {
        Command::Msgs(vec![msg])
    }
}

/// Parses one prompt line. Requirement rows are numbered from 1.
pub fn parse_command(line: &str, now: DateTime<Utc>, download_dir: &Path) -> anyhow::Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,

        "new" => Msg::WizardOpened.into(),
        "cancel" => Msg::WizardClosed { now }.into(),
        "id" => Msg::RfqIdChanged(rest.to_string()).into(),
        "desc" => Msg::DescriptionChanged(rest.to_string()).into(),
        "deadline" => {
            let deadline = match rest {
                "" | "none" => None,
                raw => Some(
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))?,
                ),
            };
            Msg::DeadlineChanged(deadline).into()
        }
        "project" => Command::Msgs(vec![
            Msg::ProjectModeChanged(ProjectMode::Existing),
            Msg::ProjectSelected(Some(rest.to_string()).filter(|id| !id.is_empty())),
        ]),
        "newproject" => {
            let (name, description) = match rest.split_once(':') {
                Some((name, description)) => (name.trim(), description.trim()),
                None => (rest, ""),
            };
            Command::Msgs(vec![
                Msg::ProjectModeChanged(ProjectMode::New),
                Msg::NewProjectNameChanged(name.to_string()),
                Msg::NewProjectDescriptionChanged(description.to_string()),
            ])
        }
        "vendor" => parse_vendor(rest)?,
        "doc" => {
            let (row, document_type) = split_row(rest)?;
            Msg::RequirementDocumentToggled {
                index: row,
                document_type: required(document_type, "document type")?,
            }
            .into()
        }
        "next" => Msg::NextClicked {
            today: now.date_naive(),
        }
        .into(),
        "back" => Msg::BackClicked.into(),
        "submit" => Msg::SubmitClicked { now }.into(),

        "subscribe" => Msg::SubscribeToRfq(required(rest, "RFQ id")?).into(),
        "unsubscribe" => Msg::UnsubscribeFromRfq.into(),
        "send" => {
            let (channel, message) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: send <channel> <text>"))?;
            Msg::SendRequested {
                channel: parse_channel(channel)?,
                message: message.trim().to_string(),
            }
            .into()
        }

        "projects" => Command::Fetch(FetchRequest::Projects),
        "vendors" => {
            let page = if rest.is_empty() {
                1
            } else {
                rest.parse().with_context(|| format!("invalid page {rest:?}"))?
            };
            Command::Fetch(FetchRequest::Vendors { page, per_page: 20 })
        }
        "doctypes" => Command::Fetch(FetchRequest::DocumentTypes),
        "analysis" => Command::Fetch(FetchRequest::AnalysisAvailability {
            rfq_id: required(rest, "RFQ id")?,
        }),
        "report" => Command::Fetch(FetchRequest::AnalysisReport {
            rfq_id: required(rest, "RFQ id")?,
        }),
        "pdf" => Command::Fetch(FetchRequest::AnalysisPdf {
            rfq_id: required(rest, "RFQ id")?,
            dir: download_dir.to_path_buf(),
        }),
        "download" => {
            let target = required(rest, "document id")?;
            let document = match target.strip_prefix("blob:") {
                Some(blob_name) => DocumentRef {
                    blob_name: Some(blob_name.to_string()),
                    ..DocumentRef::default()
                },
                None => DocumentRef {
                    document_id: Some(target),
                    ..DocumentRef::default()
                },
            };
            Command::Fetch(FetchRequest::Document {
                document,
                dir: download_dir.to_path_buf(),
            })
        }

        "" => bail!("type `help` for a list of commands"),
        other => bail!("unknown command {other:?}; type `help`"),
    };
    Ok(command)
}

fn parse_vendor(rest: &str) -> anyhow::Result<Command> {
    if rest == "add" {
        return Ok(Msg::VendorRequirementAdded.into());
    }
    if let Some(row) = rest.strip_prefix("rm") {
        let (index, _) = split_row(row.trim())?;
        return Ok(Msg::VendorRequirementRemoved { index }.into());
    }
    let (index, vendor_id) = split_row(rest)?;
    Ok(Msg::RequirementVendorSelected {
        index,
        vendor_id: required(vendor_id, "vendor id")?,
    }
    .into())
}

// "<n> rest" -> (n - 1, rest)
fn split_row(input: &str) -> anyhow::Result<(usize, &str)> {
    let (row, rest) = match input.split_once(char::is_whitespace) {
        Some((row, rest)) => (row, rest.trim()),
        None => (input, ""),
    };
    let row: usize = row
        .parse()
        .with_context(|| format!("expected a row number, got {row:?}"))?;
    match row.checked_sub(1) {
        Some(index) => Ok((index, rest)),
        None => bail!("rows are numbered from 1"),
    }
}

fn required(value: &str, what: &str) -> anyhow::Result<String> {
    if value.is_empty() {
        bail!("missing {what}");
    }
    Ok(value.to_string())
}

fn parse_channel(raw: &str) -> anyhow::Result<Channel> {
    Channel::ALL
        .into_iter()
        .find(|channel| channel.label() == raw.to_ascii_lowercase())
        .ok_or_else(|| anyhow!("unknown channel {raw:?}"))
}
