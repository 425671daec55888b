//! Telegram bot client for the shared item list.
//!
//! Long-polls the Bot API with `getUpdates` and answers a fixed command
//! grammar (`/list`, `/add`, `/edit`, `/delete`). Runs as its own process
//! (`chore bot`), sharing only the database with the web server.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::db::Database;

/// Long-poll timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: i64 = 30;
/// Pause before retrying after a failed poll.
const RETRY_DELAY: Duration = Duration::from_secs(5);

const USAGE: &str = "Commands:\n\
    /list - show all items\n\
    /add <text> - add an item\n\
    /edit <id> <text> - replace an item's text\n\
    /delete <id> - remove an item";

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

pub struct TelegramBot {
    api_base: String,
    client: reqwest::Client,
    db: Database,
}

impl TelegramBot {
    pub fn new(token: &str, db: Database) -> Self {
        Self {
            api_base: format!("https://api.telegram.org/bot{token}"),
            client: reqwest::Client::new(),
            db,
        }
    }

    /// Poll for updates until the process is stopped.
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Telegram bot polling for updates");
        let mut offset: i64 = 0;

        loop {
            let updates = match self.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("getUpdates failed: {e:#}");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else { continue };
                let Some(text) = message.text else { continue };

                let reply = match handle_command(&self.db, &text) {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::error!("Command failed: {e:#}");
                        "Something went wrong.".to_string()
                    }
                };

                if let Err(e) = self.send_message(message.chat.id, &reply).await {
                    tracing::warn!("sendMessage failed: {e:#}");
                }
            }
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let response: UpdatesResponse = self
            .client
            .get(format!("{}/getUpdates", self.api_base))
            .query(&[("timeout", POLL_TIMEOUT_SECS), ("offset", offset)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Malformed getUpdates response")?;

        if !response.ok {
            anyhow::bail!("Telegram API returned ok=false");
        }
        Ok(response.result)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.client
            .post(format!("{}/sendMessage", self.api_base))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Map one incoming message to a store operation and a reply.
///
/// The grammar is fixed; anything unrecognized gets the usage text. Store
/// errors bubble up and the caller answers generically.
fn handle_command(db: &Database, input: &str) -> Result<String> {
    let input = input.trim();
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };
    // In group chats Telegram suffixes commands with "@BotName"
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "/start" | "/help" => Ok(USAGE.to_string()),
        "/list" => {
            let items = db.list_items()?;
            if items.is_empty() {
                return Ok("No items yet.".to_string());
            }
            Ok(items
                .iter()
                .map(|item| format!("#{}: {}", item.id, item.text))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        "/add" => {
            if rest.is_empty() {
                return Ok("Usage: /add <text>".to_string());
            }
            let id = db.add_item(rest)?;
            Ok(format!("Added #{id}."))
        }
        "/edit" => {
            let (id, text) = match rest.split_once(char::is_whitespace) {
                Some((id, text)) => (id, text.trim()),
                None => ("", ""),
            };
            let Ok(id) = id.parse::<i64>() else {
                return Ok("Usage: /edit <id> <text>".to_string());
            };
            if text.is_empty() {
                return Ok("Usage: /edit <id> <text>".to_string());
            }
            if db.update_item(id, text)? {
                Ok(format!("Updated #{id}."))
            } else {
                Ok(format!("Item {id} not found."))
            }
        }
        "/delete" => {
            let Ok(id) = rest.parse::<i64>() else {
                return Ok("Usage: /delete <id>".to_string());
            };
            db.delete_item(id)?;
            Ok(format!("Deleted #{id}."))
        }
        _ => Ok(format!("Unknown command.\n{USAGE}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        db
    }

    #[test]
    fn add_then_list_round_trips() {
        let db = test_db();

        let reply = handle_command(&db, "/add buy milk").unwrap();
        assert_eq!(reply, "Added #1.");

        let reply = handle_command(&db, "/list").unwrap();
        assert_eq!(reply, "#1: buy milk");
    }

    #[test]
    fn list_on_empty_store() {
        let db = test_db();
        assert_eq!(handle_command(&db, "/list").unwrap(), "No items yet.");
    }

    #[test]
    fn edit_replaces_text_and_reports_missing_ids() {
        let db = test_db();
        handle_command(&db, "/add buy milk").unwrap();

        let reply = handle_command(&db, "/edit 1 buy milk and eggs").unwrap();
        assert_eq!(reply, "Updated #1.");
        assert_eq!(handle_command(&db, "/list").unwrap(), "#1: buy milk and eggs");

        let reply = handle_command(&db, "/edit 99 nope").unwrap();
        assert_eq!(reply, "Item 99 not found.");
    }

    #[test]
    fn delete_is_idempotent_from_the_users_view() {
        let db = test_db();
        handle_command(&db, "/add buy milk").unwrap();

        assert_eq!(handle_command(&db, "/delete 1").unwrap(), "Deleted #1.");
        assert_eq!(handle_command(&db, "/delete 1").unwrap(), "Deleted #1.");
        assert_eq!(handle_command(&db, "/list").unwrap(), "No items yet.");
    }

    #[test]
    fn commands_tolerate_bot_name_suffix() {
        let db = test_db();
        handle_command(&db, "/add@choreboard_bot buy milk").unwrap();
        assert_eq!(handle_command(&db, "/list@choreboard_bot").unwrap(), "#1: buy milk");
    }

    #[test]
    fn malformed_commands_get_usage_help() {
        let db = test_db();

        assert_eq!(handle_command(&db, "/add").unwrap(), "Usage: /add <text>");
        assert_eq!(
            handle_command(&db, "/edit nonsense").unwrap(),
            "Usage: /edit <id> <text>"
        );
        assert_eq!(
            handle_command(&db, "/delete one").unwrap(),
            "Usage: /delete <id>"
        );
        assert!(handle_command(&db, "hello there").unwrap().starts_with("Unknown command."));
        assert_eq!(handle_command(&db, "/help").unwrap(), USAGE);
    }
}
