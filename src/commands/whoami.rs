use super::Output;
use crate::{
    libs::{messages::Message, session::Session},
    msg_print,
};
use anyhow::Result;

pub fn cmd(output: &Output) -> Result<()> {
    output.emit(Session::current(), |user| {
        msg_print!(Message::SessionUser {
            username: user.username.clone(),
            role: user.role.to_string(),
        });
        Ok(())
    })
}
