use poise::{command, CreateReply};

use super::{report_failure, rest_text};
use crate::{
    discord,
    quiz::{
        session::QuizSession,
        synthesizer::{self, SynthesisError},
    },
    Context, Result,
};

const MALFORMED_REPLY: &str =
    "Sorry, I couldn't come up with a proper question this time. Please try `!quiz` again!";

/// Starts a three choice Python quiz, answered by reacting.
#[command(prefix_command)]
pub async fn quiz(
    ctx: Context<'_>,
    #[rest]
    #[description = "Topic"]
    topic: Option<String>,
) -> Result<()> {
    let data = ctx.data();
    let topic = rest_text(topic);

    let generated = {
        let _typing = discord::typing(ctx);
        synthesizer::generate(&data.completion, &data.rng, topic.as_deref()).await
    };

    let question = match generated {
        Ok(question) => question,
        Err(e @ SynthesisError::MalformedUpstreamResponse { .. }) => {
            log::warn!("Discarding quiz question: {}", e);
            ctx.say(MALFORMED_REPLY).await?;
            return Ok(());
        }
        Err(SynthesisError::Upstream(e)) => return report_failure(ctx, "a quiz", e).await,
    };

    let reply = ctx
        .send(CreateReply::default().embed(discord::quiz_embed(&question, data.quiz_window)))
        .await?;
    let message = reply.into_message().await?;

    let session = QuizSession::open(question, data.quiz_window);
    let mut ballot = discord::ReactionBallot::new(ctx, message);
    let session = session.run(&mut ballot).await?;
    let verdict = session.verdict()?;
    log::info!(
        "Quiz `{}` is {} with {:?}, answer {}: {:?}",
        session.question().prompt(),
        session.state(),
        session.vote_counts().counts(),
        session.question().correct_option(),
        verdict
    );

    ctx.say(verdict.to_string()).await?;
    Ok(())
}
