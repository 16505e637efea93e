use poise::{command, CreateReply};

use crate::{discord, Context, Result};

const DIRECTORY: &str = "\
- !quiz [topic] - Provides a three choice Python quiz, answered by reacting
- !explain <concept> - Provides an explanation and example for the specified Python concept
- !answer <question> - Answers an open Python question
- !challenge - Provides a moderately hard Python coding challenge
- !pythonbot - Checks that the bot is awake";

/// Lists the available commands.
#[command(prefix_command)]
pub async fn directory(ctx: Context<'_>) -> Result<()> {
    let embed = discord::info_embed(
        "How to use PythonBot:",
        DIRECTORY,
        concat!("pythonbot v", env!("CARGO_PKG_VERSION")),
    );
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[command(prefix_command)]
pub async fn pythonbot(ctx: Context<'_>) -> Result<()> {
    ctx.say("Beep boop. Ready for action!\nType !directory for help.")
        .await?;
    Ok(())
}
