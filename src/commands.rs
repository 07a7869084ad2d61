//! Command execution.

use crate::{Commands, ConsumerCommand, StreamCommand};
use bytes::Bytes;
use colored::Colorize;
use durastream_client::{Client, Publisher, StreamManager, Transport};
use durastream_protocol::{ConsumerConfig, Headers, Message, PublishOptions, StreamConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Executes a command and returns the formatted output.
pub async fn execute<T: Transport>(client: &Client<T>, cmd: Commands) -> CommandResult {
    match cmd {
        Commands::Check => {
            client.check_available().await?;
            Ok("Available".green().to_string())
        }

        Commands::AccountInfo => {
            let info = client.account_info().await?;
            Ok(format_json(&info))
        }

        Commands::Publish {
            subject,
            payload,
            headers,
            expected_last_msg_id,
            expected_last_seq,
            expected_stream,
            msg_id,
        } => {
            let mut message = Message::new(subject, read_payload(&payload)?);
            if !headers.is_empty() {
                message = message.with_headers(parse_headers(&headers)?);
            }

            let options = PublishOptions {
                expected_last_msg_id,
                expected_last_seq,
                expected_stream,
                msg_id,
            };
            let ack = client.publish_message(message, Some(&options)).await?;

            let mut output = format!(
                "{} to stream {} (seq: {})",
                "Published".green(),
                ack.stream.cyan(),
                ack.seq
            );
            if ack.duplicate {
                output.push_str(&format!(" {}", "[duplicate]".yellow()));
            }
            Ok(output)
        }

        Commands::Stream { action } => execute_stream(client, action).await,
        Commands::Consumer { action } => execute_consumer(client, action).await,
    }
}

async fn execute_stream<T: Transport>(client: &Client<T>, cmd: StreamCommand) -> CommandResult {
    match cmd {
        StreamCommand::Add {
            name,
            subjects,
            config,
        } => {
            let config = stream_config(name, subjects, config.as_deref())?;
            let info = client.add_stream(&config).await?;
            Ok(format!(
                "{} stream {}\n{}",
                "Created".green(),
                info.config.name.cyan(),
                format_json(&info)
            ))
        }

        StreamCommand::Update {
            name,
            subjects,
            config,
        } => {
            let config = stream_config(name, subjects, config.as_deref())?;
            let info = client.update_stream(&config).await?;
            Ok(format!(
                "{} stream {}\n{}",
                "Updated".green(),
                info.config.name.cyan(),
                format_json(&info)
            ))
        }

        StreamCommand::Delete { name } => {
            if client.delete_stream(&name).await? {
                Ok(format!("{} stream {}", "Deleted".green(), name.cyan()))
            } else {
                Ok(format!(
                    "{}: stream {} was not deleted",
                    "Warning".yellow(),
                    name
                ))
            }
        }

        StreamCommand::Info { name } => {
            let info = client.stream_info(&name).await?;
            Ok(format!(
                "{}\n  Messages: {}\n  Bytes: {}\n  Sequence: {}..{}\n  Consumers: {}",
                format!("Stream {}", name.cyan()).bold(),
                info.state.messages,
                info.state.bytes,
                info.state.first_seq,
                info.state.last_seq,
                info.state.consumer_count
            ))
        }

        StreamCommand::Purge { name } => {
            let result = client.purge_stream(&name).await?;
            Ok(format!(
                "{} stream {} ({} messages removed)",
                "Purged".green(),
                name.cyan(),
                result.purged
            ))
        }
    }
}

async fn execute_consumer<T: Transport>(
    client: &Client<T>,
    cmd: ConsumerCommand,
) -> CommandResult {
    match cmd {
        ConsumerCommand::Add {
            stream,
            durable,
            deliver_subject,
            filter_subject,
            config,
        } => {
            let mut consumer: ConsumerConfig = match config {
                Some(arg) => parse_json_arg(&arg)?,
                None => ConsumerConfig::ephemeral(),
            };
            if durable.is_some() {
                consumer.durable_name = durable;
            }
            if deliver_subject.is_some() {
                consumer.deliver_subject = deliver_subject;
            }
            if filter_subject.is_some() {
                consumer.filter_subject = filter_subject;
            }

            let info = client.add_consumer(&stream, &consumer).await?;
            Ok(format!(
                "{} consumer {} on {}",
                "Created".green(),
                info.name.cyan(),
                info.stream_name
            ))
        }

        ConsumerCommand::Delete { stream, name } => {
            if client.delete_consumer(&stream, &name).await? {
                Ok(format!("{} consumer {}", "Deleted".green(), name.cyan()))
            } else {
                Ok(format!(
                    "{}: consumer {} was not deleted",
                    "Warning".yellow(),
                    name
                ))
            }
        }

        ConsumerCommand::Info { stream, name } => {
            let info = client.consumer_info(&stream, &name).await?;
            Ok(format_json(&info))
        }
    }
}

/// Builds a stream configuration from a JSON argument and flag overrides.
fn stream_config(
    name: Option<String>,
    subjects: Vec<String>,
    config: Option<&str>,
) -> Result<StreamConfig, Box<dyn std::error::Error>> {
    let mut stream: StreamConfig = match config {
        Some(arg) => parse_json_arg(arg)?,
        None => StreamConfig::default(),
    };
    if let Some(name) = name {
        stream.name = name;
    }
    if !subjects.is_empty() {
        stream.subjects = subjects;
    }
    Ok(stream)
}

/// Parses `Name=value` header arguments.
fn parse_headers(args: &[String]) -> Result<Headers, Box<dyn std::error::Error>> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => Err(format!("invalid header '{}', expected Name=value", arg).into()),
        })
        .collect()
}

/// Reads a payload argument (either inline text or @file).
fn read_payload(arg: &str) -> Result<Bytes, Box<dyn std::error::Error>> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(Bytes::from(std::fs::read(path)?)),
        None => Ok(Bytes::copy_from_slice(arg.as_bytes())),
    }
}

/// Parses a JSON argument (either inline JSON or @file.json).
fn parse_json_arg<T: DeserializeOwned>(arg: &str) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(arg)?)
    }
}

/// Formats a value as JSON for display.
fn format_json<V: Serialize>(value: &V) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}
