use poise::{command, CreateReply};

use super::{report_failure, rest_text, POWERED_BY};
use crate::{discord, tutor, Context, Result};

/// Sends the generated text as an embed, or reports why there is none.
async fn reply_with<E: std::fmt::Display>(
    ctx: Context<'_>,
    what: &str,
    title: &str,
    generated: std::result::Result<String, E>,
) -> Result<()> {
    match generated {
        Ok(text) => {
            ctx.send(CreateReply::default().embed(discord::info_embed(title, &text, POWERED_BY)))
                .await?;
            Ok(())
        }
        Err(e) => report_failure(ctx, what, e).await,
    }
}

/// Provides a moderately hard Python coding challenge.
#[command(prefix_command)]
pub async fn challenge(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let topic = data.with_rng(|rng| tutor::random_topic(rng));

    let generated = {
        let _typing = discord::typing(ctx);
        tutor::challenge(&data.completion, topic).await
    };

    reply_with(ctx, "a challenge", "Python challenge!", generated).await
}

/// Explains a Python concept with a short example.
#[command(prefix_command)]
pub async fn explain(
    ctx: Context<'_>,
    #[rest]
    #[description = "Concept"]
    concept: Option<String>,
) -> Result<()> {
    let Some(concept) = rest_text(concept) else {
        ctx.say("Please specify a Python concept to explain. For example: `!explain decorators`")
            .await?;
        return Ok(());
    };

    let generated = {
        let _typing = discord::typing(ctx);
        tutor::explain(&ctx.data().completion, &concept).await
    };

    let title = format!("Python Concept: {}", concept);
    reply_with(ctx, "an explanation", &title, generated).await
}

/// Answers an open Python question.
#[command(prefix_command)]
pub async fn answer(
    ctx: Context<'_>,
    #[rest]
    #[description = "Question"]
    question: Option<String>,
) -> Result<()> {
    let Some(question) = rest_text(question) else {
        ctx.say("Please ask a question. For example: `!answer what does the walrus operator do?`")
            .await?;
        return Ok(());
    };

    let generated = {
        let _typing = discord::typing(ctx);
        tutor::answer(&ctx.data().completion, &question).await
    };

    let title = format!("Q: {}", question);
    reply_with(ctx, "an answer", &title, generated).await
}
