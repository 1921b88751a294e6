use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use url::Url;

use client::{BuildError, RequestBody, StoreClient};

use crate::args::Command;

/// Resolve the remote URL for the store client.
///
/// Priority: explicit `--remote` flag > `SILO_REMOTE` env var >
/// hardcoded 8080. A `SILO_REMOTE` value that does not parse is an
/// error, not a fall-through to the default.
pub fn resolve_remote(explicit: Option<Url>) -> anyhow::Result<Url> {
    if let Some(url) = explicit {
        return Ok(url);
    }
    match std::env::var("SILO_REMOTE") {
        Ok(value) => {
            Url::parse(&value).with_context(|| format!("SILO_REMOTE is not a valid url: {value}"))
        }
        Err(_) => Ok(Url::parse("http://localhost:8080").expect("hardcoded URL must parse")),
    }
}

pub struct OpContext {
    pub client: StoreClient,
}

impl OpContext {
    pub fn new(remote: Url, store_id: Option<String>) -> Result<Self, BuildError> {
        let mut builder = StoreClient::builder(remote);
        if let Some(id) = store_id {
            builder = builder.store_id(id);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Command {
    pub async fn execute(&self, ctx: &OpContext) -> anyhow::Result<String> {
        match self {
            Command::Space(cmd) => cmd.execute(ctx).await,
            Command::Content(cmd) => cmd.execute(ctx).await,
            Command::Task(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SpaceCmd {
    /// List all spaces in the store
    List,
    /// Create a space
    Create { space_id: String },
    /// Delete a space and everything in it
    Delete { space_id: String },
    /// Show a space's properties
    Props { space_id: String },
    /// Show a space's access controls
    Acls { space_id: String },
}

impl SpaceCmd {
    async fn execute(&self, ctx: &OpContext) -> anyhow::Result<String> {
        match self {
            SpaceCmd::List => {
                let spaces = ctx.client.list_spaces().await?;
                Ok(spaces.join("\n"))
            }
            SpaceCmd::Create { space_id } => {
                ctx.client.create_space(space_id).await?;
                Ok(format!("created space {space_id}"))
            }
            SpaceCmd::Delete { space_id } => {
                ctx.client.delete_space(space_id).await?;
                Ok(format!("deleted space {space_id}"))
            }
            SpaceCmd::Props { space_id } => {
                let properties = ctx.client.get_space_properties(space_id).await?;
                Ok(properties
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            SpaceCmd::Acls { space_id } => {
                let acls = ctx.client.get_space_acls(space_id).await?;
                Ok(acls
                    .iter()
                    .map(|(principal, level)| format!("{principal}: {level}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ContentCmd {
    /// List content ids in a space
    List {
        space_id: String,
        /// Only ids starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Download a content item
    Get {
        space_id: String,
        content_id: String,
        /// Destination file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Upload a file as a content item
    Put {
        space_id: String,
        content_id: String,
        file: PathBuf,
        /// Mimetype (guessed from the file extension when omitted)
        #[arg(long)]
        mimetype: Option<String>,
        /// Expected hex MD5 checksum; the upload fails on a mismatch
        #[arg(long)]
        checksum: Option<String>,
    },
    /// Delete a content item
    Delete {
        space_id: String,
        content_id: String,
    },
    /// Show a content item's properties
    Props {
        space_id: String,
        content_id: String,
    },
    /// Copy a content item server-side
    Copy {
        src_space_id: String,
        src_content_id: String,
        dest_space_id: String,
        dest_content_id: String,
        /// Store id of the source, when it differs from the target
        #[arg(long)]
        src_store_id: Option<String>,
    },
}

impl ContentCmd {
    async fn execute(&self, ctx: &OpContext) -> anyhow::Result<String> {
        match self {
            ContentCmd::List { space_id, prefix } => {
                let mut contents = ctx.client.get_space_contents(space_id, prefix.clone());
                let mut lines = Vec::new();
                while let Some(id) = contents.try_next().await? {
                    lines.push(id);
                }
                Ok(lines.join("\n"))
            }
            ContentCmd::Get {
                space_id,
                content_id,
                output,
            } => {
                let (stream, _properties) =
                    ctx.client.get_content(space_id, content_id, 0, None).await?;
                let bytes = stream.read_to_end().await?;
                match output {
                    Some(path) => {
                        tokio::fs::write(path, &bytes).await?;
                        Ok(format!("wrote {} bytes to {}", bytes.len(), path.display()))
                    }
                    None => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                }
            }
            ContentCmd::Put {
                space_id,
                content_id,
                file,
                mimetype,
                checksum,
            } => {
                let bytes = tokio::fs::read(file).await?;
                let mimetype = match mimetype {
                    Some(m) => m.clone(),
                    None => mime_guess::from_path(file)
                        .first_or_octet_stream()
                        .to_string(),
                };
                let echoed = ctx
                    .client
                    .add_content(
                        space_id,
                        content_id,
                        RequestBody::from_bytes(bytes),
                        &mimetype,
                        checksum.as_deref(),
                        None,
                    )
                    .await?;
                Ok(format!("stored {content_id} (checksum {echoed})"))
            }
            ContentCmd::Delete {
                space_id,
                content_id,
            } => {
                ctx.client.delete_content(space_id, content_id).await?;
                Ok(format!("deleted {content_id}"))
            }
            ContentCmd::Props {
                space_id,
                content_id,
            } => {
                let properties = ctx
                    .client
                    .get_content_properties(space_id, content_id)
                    .await?;
                Ok(properties
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            ContentCmd::Copy {
                src_space_id,
                src_content_id,
                dest_space_id,
                dest_content_id,
                src_store_id,
            } => {
                let checksum = ctx
                    .client
                    .copy_content(
                        src_store_id.as_deref(),
                        src_space_id,
                        src_content_id,
                        dest_space_id,
                        dest_content_id,
                    )
                    .await?;
                Ok(format!("copied to {dest_content_id} (checksum {checksum})"))
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TaskCmd {
    /// List the tasks the provider supports
    List,
    /// Run a named task
    Run {
        name: String,
        /// Raw parameter body passed to the task
        #[arg(long)]
        params: Option<String>,
    },
}

impl TaskCmd {
    async fn execute(&self, ctx: &OpContext) -> anyhow::Result<String> {
        match self {
            TaskCmd::List => {
                let tasks = ctx.client.list_supported_tasks().await?;
                Ok(tasks.join("\n"))
            }
            TaskCmd::Run { name, params } => {
                Ok(ctx.client.perform_task(name, params.as_deref()).await?)
            }
        }
    }
}
