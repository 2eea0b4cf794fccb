// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use workrobot::{
    Client, FailurePolicy, Image, Markdown, Media, Mention, Message, MessageError, RobotConfig,
    Text,
};

/// Send messages through a group-chat robot.
///
/// The robot is selected with WORKROBOT_KEY or WORKROBOT_WEBHOOK.
#[derive(Debug, Parser)]
#[command(name = "workrobot-send", version)]
struct Cli {
    /// Send the messages concurrently instead of one after another.
    #[arg(long, global = true)]
    concurrent: bool,

    /// With --concurrent, stop at the first failure instead of reporting all of them.
    #[arg(long, global = true, requires = "concurrent")]
    fail_fast: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// One text message per argument.
    Text {
        #[arg(required = true)]
        contents: Vec<String>,

        /// Member id to mention; repeatable.
        #[arg(long = "mention")]
        members: Vec<String>,

        /// Mobile number to mention; repeatable.
        #[arg(long = "mobile")]
        mobiles: Vec<String>,

        /// Mention everyone in the group.
        #[arg(long)]
        all: bool,
    },
    /// A single markdown message made of the given lines.
    Markdown {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// One image message per file.
    Image {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Upload each file and send it as a file message.
    File {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RobotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid robot configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", config.log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let client = match Client::from_robot_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Error creating robot client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let messages = match build_messages(&client, cli.command).await {
        Ok(messages) => messages,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling delivery");
            shutdown.cancel();
        }
    });

    let result = if cli.concurrent {
        let policy = if cli.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::Aggregate
        };
        client
            .send_concurrent_with_cancel(&messages, policy, &cancel)
            .await
    } else {
        client.send_with_cancel(&messages, &cancel).await
    };

    match result {
        Ok(()) => {
            info!("Sent {} messages", messages.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            for failure in e.errors() {
                error!("Delivery failed: {failure}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn build_messages(client: &Client, command: Command) -> Result<Vec<Message>, String> {
    match command {
        Command::Text {
            contents,
            members,
            mobiles,
            all,
        } => {
            let mention = Mention::new(members, mobiles, all);
            contents
                .into_iter()
                .map(|content| {
                    let mut text = Text::from(mention.clone());
                    text.set_content(content).map_err(invalid)?;
                    Ok(Message::from(text))
                })
                .collect()
        }
        Command::Markdown { lines } => {
            let markdown = Markdown::from_lines(lines).map_err(invalid)?;
            Ok(vec![Message::from(markdown)])
        }
        Command::Image { paths } => {
            let mut messages = Vec::with_capacity(paths.len());
            for path in paths {
                let image = Image::from_file(&path)
                    .await
                    .map_err(|e| format!("Cannot use {} as image: {e}", path.display()))?;
                messages.push(Message::from(image));
            }
            Ok(messages)
        }
        Command::File { paths } => {
            let mut messages = Vec::with_capacity(paths.len());
            for path in paths {
                let uploaded = client
                    .uploader()
                    .upload_file(&path)
                    .await
                    .map_err(|e| format!("Failed to upload {}: {e}", path.display()))?;
                debug!("Uploaded {} as {}", path.display(), uploaded.media_id);
                messages.push(Message::from(Media::from(uploaded)));
            }
            Ok(messages)
        }
    }
}

fn invalid(e: MessageError) -> String {
    format!("Invalid message: {e}")
}
