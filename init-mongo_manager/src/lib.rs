pub mod admin;
pub mod bootstrap;
pub mod console;
#[cfg(test)]
mod fake;
pub mod plan;
pub mod verify;

use anyhow::anyhow;
use init_commons::{APP_NAME, CONNECT_TIMEOUT};
use init_errors::MongoErr;
use mongodb::Client;
use mongodb::error::{Error, ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use tracing::{debug, error, info, instrument};

/// Build a client for `url`
///
/// The driver connects lazily, so an unreachable server only shows up on the first command
#[instrument(skip_all)]
pub async fn connect(url: &str) -> Result<Client, MongoErr> {
    debug!("Creating mongo client"); // URL not shown because of credentials

    let mut opts = ClientOptions::parse(url).await.map_err(|e| {
        error!(%e, "Unable to parse mongo url");
        MongoErr::InvalidUrl(e.to_string())
    })?;

    opts.connect_timeout = Some(CONNECT_TIMEOUT);
    opts.app_name = Some(APP_NAME.to_string());

    let client = Client::with_options(opts).map_err(classify)?;

    info!("Mongo client ready");

    Ok(client)
}

/// Sort a driver error into the variants the report cares about
///
/// Authentication failures come back from the driver without the server code, so they land in `Other`
pub(crate) fn classify(e: Error) -> MongoErr {
    if matches!(
        *e.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    ) {
        return MongoErr::Unreachable(anyhow!(e));
    }

    match e.kind.as_ref() {
        ErrorKind::Command(cmd) => MongoErr::Command {
            code: cmd.code,
            code_name: cmd.code_name.clone(),
            message: cmd.message.clone(),
        },
        ErrorKind::Write(WriteFailure::WriteError(we)) => MongoErr::Write {
            code: we.code,
            message: we.message.clone(),
        },
        ErrorKind::Write(WriteFailure::WriteConcernError(wce)) => MongoErr::Write {
            code: wce.code,
            message: wce.message.clone(),
        },
        _ => MongoErr::Other(e.to_string()),
    }
}
