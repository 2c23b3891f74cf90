use super::{open_store, Output};
use crate::{
    api::RowStore,
    libs::{error::Error, messages::Message},
    msg_error, msg_success,
};
use anyhow::Result;

/// Runs the connectivity check. A failure is reported, not propagated.
pub async fn cmd(output: &Output) -> Result<()> {
    let store = open_store()?;
    let location = store.location();
    let result = store.ping().await.map(|_| location.clone()).map_err(Error::from);

    if output.json {
        return output.emit(result, |_| Ok(()));
    }
    match result {
        Ok(location) => msg_success!(Message::StoreReachable(location)),
        Err(error) => msg_error!(Message::StoreUnreachable(error.to_string())),
    }
    Ok(())
}
